use super::access::require_access;
use super::links::{dashboard_url, server_side_token_url};
use super::snippets::example_usage;
use super::templates::{
    render, render_error, AdminTemplate, ErrorTemplate, FeedbackTemplate, IndexTemplate,
    IssueTemplate, LoginServiceCard, SetupItem, SetupTemplate,
};
use crate::auth::{decode_claims, Credential, ADMIN_ROLE, AUTH_GUARDIAN_COOKIE};
use crate::gateway::{Issue, SupportedServices};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

const ADMIN_REQUIRED_ROLES: &[&str] = &[ADMIN_ROLE];
const SERVER_SIDE_ISSUES_BASE: &str = "/server-side-auth-data-fetch";
const LOGGED_IN_ISSUES_BASE: &str = "/logged-in-user-data-fetch";
const MORE_ISSUES_COUNT: u32 = 10;

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Playground: preview of the caller's own token and the login providers
///
/// The preview uses the unverified decode; nothing here is access-controlled.
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    credential: Credential,
) -> Response {
    if !state.config.setup_wizard_completed {
        return setup_page(&state);
    }

    let claims_preview = credential
        .token()
        .and_then(decode_claims)
        .map(|claims| claims.to_pretty_json());

    let supported = match state.gateway.supported_services().await {
        Ok(supported) => supported,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load supported login services");
            SupportedServices::default()
        }
    };

    let app_id = state.gateway.app_id();
    let services = supported
        .services
        .iter()
        .map(|service| LoginServiceCard {
            slug: service.slug.clone(),
            friendly_name: service.friendly_service_name.clone(),
            snippet: example_usage(app_id, service),
        })
        .collect();

    let template = IndexTemplate {
        claims_preview,
        raw_token: credential.token().map(str::to_string),
        services,
        missing_app_id: supported.missing_app_id,
        dashboard_url: dashboard_url(app_id),
        cookie_name: AUTH_GUARDIAN_COOKIE,
    };
    render(&template, StatusCode::OK)
}

fn setup_page(state: &AppState) -> Response {
    let config = &state.config;
    tracing::info!("Setup not completed, rendering setup checklist");

    let template = SetupTemplate {
        app_id: config.app_id.clone(),
        items: vec![
            SetupItem {
                name: "GATEWAY_APP_ID",
                description: "the gateway app this deployment authenticates against",
                configured: true,
            },
            SetupItem {
                name: "GATEWAY_SERVER_SIDE_ACCESS_TOKEN",
                description: "token used for server-side reads and for filing feedback",
                configured: config.has_server_side_access_token(),
            },
            SetupItem {
                name: "GATEWAY_JWT_SHARED_SECRET",
                description: "HMAC secret for HS256 session tokens (RS256 works without it)",
                configured: config.jwt_shared_secret.is_some(),
            },
            SetupItem {
                name: "FEEDBACK_REPO_ID",
                description: "GitHub repository id that receives feedback issues",
                configured: config.feedback_repo_id.is_some(),
            },
        ],
        dashboard_url: dashboard_url(&config.app_id),
    };
    render(&template, StatusCode::OK)
}

/// Admin-only page
pub async fn admin_handler(
    State(state): State<Arc<AppState>>,
    credential: Credential,
) -> Response {
    let access = match require_access(&state, &credential, ADMIN_REQUIRED_ROLES, None).await {
        Ok(access) => access,
        Err(denied) => return denied,
    };

    // Anything admin-only can be loaded here
    let template = AdminTemplate {
        user_id: access.user_id,
        admin_only_data: "If you can see this, you're logged in as an admin!".to_string(),
    };
    render(&template, StatusCode::OK)
}

pub async fn feedback_page_handler(State(state): State<Arc<AppState>>) -> Response {
    let template = FeedbackTemplate {
        server_token_configured: state.config.has_server_side_access_token(),
        server_side_token_url: server_side_token_url(state.gateway.app_id()),
    };
    render(&template, StatusCode::OK)
}

/// Issue page readable by anyone, fetched with the server-side token
pub async fn server_side_issue_handler(
    State(state): State<Arc<AppState>>,
    Path(issue_number): Path<u64>,
) -> Response {
    if !state.config.has_server_side_access_token() {
        tracing::warn!("Server-side access token not configured");
        return render_error(
            ErrorTemplate::new(
                StatusCode::NETWORK_AUTHENTICATION_REQUIRED,
                "Server-side access token missing",
                "Set GATEWAY_SERVER_SIDE_ACCESS_TOKEN with GitHub access for this application.",
            )
            .with_link(
                server_side_token_url(state.gateway.app_id()),
                "Create one on your app dashboard",
            ),
        );
    }

    let repo = &state.config.issues_repo;
    let issue = match state
        .gateway
        .issue_with_server_side_token(issue_number, repo)
        .await
    {
        Ok(issue) => issue,
        Err(e) => {
            tracing::error!(error = %e, issue_number, "Failed to fetch issue");
            return gateway_unavailable();
        }
    };

    let Some(issue) = issue else {
        return issue_not_found(issue_number);
    };

    let more_issues = match state.gateway.all_issues(MORE_ISSUES_COUNT, repo).await {
        Ok(issues) => issues.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch more issues");
            Vec::new()
        }
    };

    let more_issues = other_issues(more_issues, issue.number);
    let template = IssueTemplate::new(issue, None, more_issues, SERVER_SIDE_ISSUES_BASE);
    render(&template, StatusCode::OK)
}

/// Issue page for logged-in users, fetched with their own token when it can
/// see GitHub, otherwise with the server-side token
pub async fn logged_in_issue_handler(
    State(state): State<Arc<AppState>>,
    Path(issue_number): Path<u64>,
    credential: Credential,
) -> Response {
    if let Err(denied) = require_access(&state, &credential, &[], Some("GitHub")).await {
        return denied;
    }
    let token = credential.token();
    let repo = &state.config.issues_repo;

    let mut issue = match state.gateway.issue(token, issue_number, repo).await {
        Ok(issue) => issue,
        Err(e) => {
            tracing::warn!(error = %e, issue_number, "Issue fetch with user token failed");
            None
        }
    };

    // Logged in, but not to GitHub
    if issue.is_none() {
        issue = match state
            .gateway
            .issue_with_server_side_token(issue_number, repo)
            .await
        {
            Ok(issue) => issue,
            Err(e) => {
                tracing::error!(error = %e, issue_number, "Issue fetch with server token failed");
                return gateway_unavailable();
            }
        };
    }

    let Some(issue) = issue else {
        return issue_not_found(issue_number);
    };

    let me = match token {
        Some(token) => state
            .gateway
            .find_me_on_github(token)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "GitHub viewer lookup failed");
                None
            }),
        None => None,
    };

    let fetched_note = match me {
        Some(me) => format!(
            "I fetched this GitHub issue on your behalf, {}",
            me.display_name()
        ),
        None => "I fetched this using the server-side auth token since you're logged into \
                 services other than GitHub"
            .to_string(),
    };

    let template = IssueTemplate::new(
        issue,
        Some(fetched_note),
        Vec::new(),
        LOGGED_IN_ISSUES_BASE,
    );
    render(&template, StatusCode::OK)
}

fn other_issues(issues: Vec<Issue>, current: u64) -> Vec<Issue> {
    issues.into_iter().filter(|i| i.number != current).collect()
}

fn issue_not_found(issue_number: u64) -> Response {
    render_error(ErrorTemplate::new(
        StatusCode::NOT_FOUND,
        "Issue not found",
        &format!("There is no issue #{} in the configured repository.", issue_number),
    ))
}

fn gateway_unavailable() -> Response {
    render_error(ErrorTemplate::new(
        StatusCode::BAD_GATEWAY,
        "Gateway unavailable",
        "The GraphQL gateway could not be reached. Try again shortly.",
    ))
}
