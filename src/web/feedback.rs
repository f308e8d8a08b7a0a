//! `/api/feedback`: files playground feedback as a GitHub issue through the
//! gateway, using the server-side token

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth::Credential;
use crate::gateway::{CreateIssueInput, GitHubUser};
use crate::AppState;

/// Stands in for a missing emotion
pub const DEFAULT_EMOTION: &str = "还不错";
const DEFAULT_TITLE: &str = "[No title]";
/// Info string of the fenced block carrying submission metadata
const METADATA_FENCE: &str = "next-js-metadata";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackSubmission {
    pub title: Option<String>,
    pub body: Option<String>,
    pub emotion: Option<String>,
}

impl FeedbackSubmission {
    /// Issue input for `repository_id`; `user` is embedded in the metadata block
    pub fn into_issue(self, repository_id: &str, user: Option<&GitHubUser>) -> CreateIssueInput {
        let emotion = self
            .emotion
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMOTION.to_string());
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let metadata = json!({ "emotion": emotion, "user": user }).to_string();

        CreateIssueInput {
            repository_id: repository_id.to_string(),
            title,
            body: format!(
                "{}\n\n```{}\n{}\n```",
                self.body.unwrap_or_default(),
                METADATA_FENCE,
                metadata
            ),
        }
    }
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert("access-control-allow-methods", HeaderValue::from_static("POST"));
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Authorization"),
    );
    headers
}

fn error_body(code: &str, message: String) -> serde_json::Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Method dispatch for `/api/feedback`; every response carries the CORS headers
pub async fn feedback_api_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    credential: Credential,
    body: Bytes,
) -> Response {
    let (status, payload) = match method {
        Method::OPTIONS => (StatusCode::OK, json!({ "ok": true })),
        Method::POST => submit_feedback(&state, &credential, &body).await,
        other => {
            tracing::info!(method = %other, "Unsupported method on feedback endpoint");
            (
                StatusCode::NOT_IMPLEMENTED,
                error_body(
                    "method_unknown",
                    format!("Method {} is not supported on this endpoint", other),
                ),
            )
        }
    };

    (status, cors_headers(), Json(payload)).into_response()
}

async fn submit_feedback(
    state: &AppState,
    credential: &Credential,
    body: &[u8],
) -> (StatusCode, serde_json::Value) {
    let submission: FeedbackSubmission = match serde_json::from_slice(body) {
        Ok(submission) => submission,
        Err(e) => {
            tracing::info!(error = %e, "Unparseable feedback body");
            return (
                StatusCode::BAD_REQUEST,
                error_body("invalid_body", format!("Invalid feedback body: {}", e)),
            );
        }
    };

    let Some(repository_id) = state.config.feedback_repo_id.as_deref() else {
        tracing::warn!("FEEDBACK_REPO_ID not configured, dropping feedback");
        return (StatusCode::OK, json!({ "success": false }));
    };
    if !state.config.has_server_side_access_token() {
        tracing::warn!("Server-side access token not configured, dropping feedback");
        return (StatusCode::OK, json!({ "success": false }));
    }

    let user = match credential.token() {
        Some(token) => state
            .gateway
            .find_me_on_github(token)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not look up feedback author");
                None
            }),
        None => None,
    };

    let input = submission.into_issue(repository_id, user.as_ref());
    match state
        .gateway
        .create_issue_with_server_side_token(&input)
        .await
    {
        Ok(Some(created)) => {
            tracing::info!(
                event = "feedback_filed",
                issue_number = created.number,
                issue_url = %created.url,
                "Feedback filed"
            );
            (StatusCode::OK, json!({ "success": true }))
        }
        Ok(None) => {
            tracing::warn!("Gateway returned no issue for feedback mutation");
            (StatusCode::OK, json!({ "success": false }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to file feedback");
            (StatusCode::OK, json!({ "success": false }))
        }
    }
}
