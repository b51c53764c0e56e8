//! Route guard decision.
//!
//! SYSTEM CONTEXT
//! ==============
//! Evaluated by the edge router for every page request, before any client
//! code runs, from the session snapshot carried in the `auth-storage`
//! cookie. `decide` is pure: the same inputs always give the same answer.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use serde::Deserialize;

use crate::encoding::encode_query_value;
use crate::model::Role;

/// Path prefixes that require an authenticated session.
pub const PROTECTED_PREFIXES: &[&str] = &["/app"];

/// Path prefixes only meaningful to signed-out visitors.
pub const AUTH_ONLY_PREFIXES: &[&str] = &["/login", "/register", "/forgot-password"];

pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Auth facts the guard needs, as read from the cookie mirror.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuardSnapshot {
    pub is_authenticated: bool,
    pub current_role: Option<Role>,
}

// Loose view of the persisted envelope: only the fields the guard reads, and
// tolerant of anything else being malformed.
#[derive(Deserialize)]
struct CookieEnvelope {
    state: Option<CookieState>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CookieState {
    access_token: Option<String>,
    user: Option<CookieUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CookieUser {
    current_type: Option<String>,
}

impl GuardSnapshot {
    /// Decode the (already percent-decoded) cookie value. Absent or
    /// unparseable values mean "not authenticated".
    #[must_use]
    pub fn from_cookie_value(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };
        let Ok(envelope) = serde_json::from_str::<CookieEnvelope>(raw) else {
            return Self::default();
        };
        let Some(state) = envelope.state else {
            return Self::default();
        };
        Self {
            is_authenticated: state.access_token.is_some_and(|t| !t.is_empty()),
            current_role: state
                .user
                .and_then(|u| u.current_type)
                .and_then(|t| t.parse().ok()),
        }
    }
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    matches_any(path, PROTECTED_PREFIXES)
}

#[must_use]
pub fn is_auth_only(path: &str) -> bool {
    matches_any(path, AUTH_ONLY_PREFIXES)
}

/// Home route for a possibly-unknown role. Anything but a freelancer lands
/// on the client home.
#[must_use]
pub fn home_route(role: Option<Role>) -> &'static str {
    role.unwrap_or(Role::Client).home_route()
}

/// Login URL that returns the visitor to `path` afterwards.
#[must_use]
pub fn login_redirect(path: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", encode_query_value(path))
}

/// Where to send a visitor right after signing in: the `redirect` parameter
/// when it names a local path, otherwise the role's home.
#[must_use]
pub fn post_login_target(redirect: Option<&str>, role: Option<Role>) -> String {
    match redirect {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => home_route(role).to_owned(),
    }
}

/// Decide whether a request for `path` proceeds or is redirected.
#[must_use]
pub fn decide(path: &str, is_authenticated: bool, current_role: Option<Role>) -> GuardDecision {
    if is_protected(path) && !is_authenticated {
        return GuardDecision::Redirect(login_redirect(path));
    }
    if is_auth_only(path) && is_authenticated {
        return GuardDecision::Redirect(home_route(current_role).to_owned());
    }
    GuardDecision::Allow
}
