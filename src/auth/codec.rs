//! Unverified decode of the session token
//!
//! Used only to preview the claims of the caller's own token. Access
//! decisions go through [`super::jwt::JwtVerifier`] instead.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::claims::Claims;

#[derive(Debug, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a JSON claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of `<header>.<payload>.<signature>`
///
/// Failures are logged and reported as "no claims".
pub fn decode_claims(token: &str) -> Option<Claims> {
    match try_decode_claims(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::warn!(
                error = %e,
                token_len = token.len(),
                "Failed to decode session token payload"
            );
            None
        }
    }
}

pub fn try_decode_claims(token: &str) -> Result<Claims, TokenDecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenDecodeError::Segments(segments.len()));
    }

    // Some issuers keep the padding; the no-pad engine rejects it
    let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    Ok(serde_json::from_slice(&payload)?)
}
