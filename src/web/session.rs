//! Storing and clearing the `authGuardian` session cookie
//!
//! The browser-side login flow hands the gateway-issued token to
//! `POST /auth/session`; from then on every page reads it from the cookie.

use axum::{
    extract::State,
    http::{header::InvalidHeaderValue, header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::codec::try_decode_claims;
use crate::auth::helpers::{clear_session_cookie, session_cookie};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub token: String,
}

/// Create a HeaderValue from a string, returning an error response if invalid
fn header_value(s: &str) -> Result<HeaderValue, Box<Response>> {
    HeaderValue::from_str(s).map_err(|e: InvalidHeaderValue| {
        tracing::error!(
            error = %e,
            value_len = s.len(),
            "Failed to create header value - possible malformed token"
        );
        Box::new(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Internal error setting response headers"})),
            )
                .into_response(),
        )
    })
}

/// Persist a session token in the cookie
///
/// Only the token's shape is checked here. Signatures are verified by the
/// pages that gate on it.
pub async fn save_session_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveSessionRequest>,
) -> Response {
    let token = request.token.trim();

    if let Err(e) = try_decode_claims(token) {
        tracing::info!(error = %e, "Refusing to store malformed session token");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": { "code": "invalid_token", "message": e.to_string() }
            })),
        )
            .into_response();
    }

    let cookie = session_cookie(token, state.config.cookie_secure_flag());
    let cookie = match header_value(&cookie) {
        Ok(h) => h,
        Err(response) => return *response,
    };

    tracing::info!(event = "session_saved", "Session cookie set");
    let mut response = Json(serde_json::json!({ "success": true })).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    response
}

/// Clear the session cookie and return to the playground
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!(event = "logout", "Clearing session cookie");

    let mut response = Redirect::to("/").into_response();
    if let Ok(h) = header_value(&clear_session_cookie(state.config.cookie_secure_flag())) {
        response.headers_mut().insert(SET_COOKIE, h);
    }
    response
}
