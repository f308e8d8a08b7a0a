use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use super::helpers::extract_cookie;
use super::AUTH_GUARDIAN_COOKIE;

/// Raw `authGuardian` bearer token of the current request, if any
///
/// Extraction never fails: an absent or empty cookie is an anonymous
/// request. Handlers pass this value on explicitly; nothing reads the cookie
/// from ambient request context.
///
/// Usage:
/// ```rust,ignore
/// async fn handler(State(state): State<Arc<AppState>>, credential: Credential) {
///     let claims = access::resolve_claims(&state, &credential).await;
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credential {
    token: Option<String>,
}

impl Credential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = Credential::new(extract_cookie(&parts.headers, AUTH_GUARDIAN_COOKIE));

        tracing::debug!(
            has_credential = credential.is_present(),
            "Session credential extracted"
        );

        Ok(credential)
    }
}
