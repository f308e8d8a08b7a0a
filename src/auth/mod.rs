//! Session authentication
//!
//! The gateway issues the session token and the browser keeps it in the
//! `authGuardian` cookie. This module turns that cookie into claims and
//! decides what the claims allow.
//!
//! ## Structure
//!
//! - `claims`: explicit claims structure (gateway namespace never deserialized)
//! - `codec`: unverified payload decode, used for the token preview
//! - `jwt`: signature verification (HMAC shared secret or RS256 via JWKS)
//! - `gate`: pure `logged_in` / `authorized` predicates and access decisions
//! - `extractors`: the `Credential` extractor
//! - `helpers`: cookie parsing and `Set-Cookie` builders

pub mod claims;
pub mod codec;
pub mod extractors;
pub mod gate;
pub mod helpers;
pub mod jwt;

/// Cookie carrying the gateway-issued bearer token
pub const AUTH_GUARDIAN_COOKIE: &str = "authGuardian";

pub use claims::{Claims, UserClaims, VENDOR_CLAIMS_KEY};
pub use codec::decode_claims;
pub use extractors::Credential;
pub use gate::{authorized, evaluate, logged_in, missing_roles, AccessDecision, ADMIN_ROLE};
pub use jwt::JwtVerifier;
