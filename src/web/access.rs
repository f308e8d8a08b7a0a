//! Page-level access control
//!
//! One pass per request: credential -> verified claims -> gate decision ->
//! either the caller renders its content or gets back a 401/403 page.

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use super::templates::{render, ForbiddenTemplate, UnauthorizedTemplate};
use crate::auth::{evaluate, AccessDecision, Claims, Credential, AUTH_GUARDIAN_COOKIE};
use crate::AppState;

/// A request that passed the gate
#[derive(Debug)]
pub struct GrantedAccess {
    pub user_id: String,
    pub claims: Claims,
}

/// Verify the credential's token; any failure means "no claims"
pub async fn resolve_claims(state: &AppState, credential: &Credential) -> Option<Claims> {
    let token = credential.token()?;
    match state.verifier.verify(token).await {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Session token rejected, treating request as anonymous"
            );
            None
        }
    }
}

/// Gate a page on login plus `required_roles`
///
/// `service` names the provider the page expects the user to be logged in
/// to, and only affects the 401 wording.
pub async fn require_access(
    state: &AppState,
    credential: &Credential,
    required_roles: &[&str],
    service: Option<&str>,
) -> Result<GrantedAccess, Response> {
    let claims = resolve_claims(state, credential).await;

    match evaluate(claims.as_ref(), required_roles) {
        AccessDecision::Granted { user_id } => {
            tracing::debug!(
                user_id = %user_id,
                required_roles = ?required_roles,
                "Access granted"
            );
            Ok(GrantedAccess {
                user_id,
                claims: claims.unwrap_or_default(),
            })
        }
        decision => Err(denied_response(&decision, service)),
    }
}

/// Render the 401/403 page for a non-granted decision
pub fn denied_response(decision: &AccessDecision, service: Option<&str>) -> Response {
    match decision {
        AccessDecision::Forbidden {
            held,
            required,
            missing,
        } => {
            tracing::info!(
                held = ?held,
                missing = ?missing,
                "Access denied: missing roles"
            );
            let template = ForbiddenTemplate {
                cookie_name: AUTH_GUARDIAN_COOKIE,
                held_json: roles_json(held),
                required_json: roles_json(required),
                missing_json: roles_json(missing),
            };
            render(&template, StatusCode::FORBIDDEN)
        }
        AccessDecision::Unauthenticated | AccessDecision::Granted { .. } => {
            tracing::info!(service = ?service, "Access denied: not logged in");
            let template = UnauthorizedTemplate {
                cookie_name: AUTH_GUARDIAN_COOKIE,
                service: service.map(str::to_string),
            };
            render(&template, StatusCode::UNAUTHORIZED)
        }
    }
}

/// `{"user":{"roles":[...]}}`, the minimal claims shape that would satisfy
/// (or describe) a role list
fn roles_json(roles: &[String]) -> String {
    json!({ "user": { "roles": roles } }).to_string()
}
