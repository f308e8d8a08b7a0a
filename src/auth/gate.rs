//! Authorization gate
//!
//! Pure predicates over [`Claims`]. A page declares the roles it needs as a
//! static slice and asks [`evaluate`] for a decision.

use std::collections::HashSet;

use super::claims::Claims;

/// Role required by the admin page
pub const ADMIN_ROLE: &str = "admin";

/// Outcome of checking a request's claims against a page's requirements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted {
        user_id: String,
    },
    /// No identity in the claims (or no claims at all)
    Unauthenticated,
    /// Logged in, but some required roles are missing
    Forbidden {
        held: Vec<String>,
        required: Vec<String>,
        missing: Vec<String>,
    },
}

/// Identity of the logged-in user, if any
///
/// `user.id` wins over `user.username`, which wins over `user.email`. Empty
/// strings do not count.
pub fn logged_in(claims: Option<&Claims>) -> Option<&str> {
    let user = claims?.user.as_ref()?;
    [&user.id, &user.username, &user.email]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .find(|value| !value.is_empty())
}

/// True iff every required role is held
pub fn authorized(claims: Option<&Claims>, required: &[&str]) -> bool {
    let held = held_role_set(claims);
    required.iter().all(|role| held.contains(role))
}

/// Required roles that are not held, in declaration order, without repeats
pub fn missing_roles(claims: Option<&Claims>, required: &[&str]) -> Vec<String> {
    let held = held_role_set(claims);
    let mut seen = HashSet::new();
    required
        .iter()
        .filter(|role| !held.contains(*role))
        .filter(|role| seen.insert(**role))
        .map(|role| role.to_string())
        .collect()
}

/// Decide access: identity first, then roles
pub fn evaluate(claims: Option<&Claims>, required: &[&str]) -> AccessDecision {
    let Some(user_id) = logged_in(claims) else {
        return AccessDecision::Unauthenticated;
    };

    if authorized(claims, required) {
        return AccessDecision::Granted {
            user_id: user_id.to_string(),
        };
    }

    AccessDecision::Forbidden {
        held: claims.map(|c| c.roles().to_vec()).unwrap_or_default(),
        required: required.iter().map(|r| r.to_string()).collect(),
        missing: missing_roles(claims, required),
    }
}

fn held_role_set(claims: Option<&Claims>) -> HashSet<&str> {
    claims
        .map(|c| c.roles().iter().map(|s| s.as_str()).collect())
        .unwrap_or_default()
}
