//! Route-guard middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before any page is served. It reads the `auth-storage` cookie that
//! the client's cookie mirror keeps in sync with durable storage, and applies
//! [`session::decide`]. Asset and API paths bypass the guard entirely.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use session::{AUTH_STORAGE_KEY, GuardDecision, GuardSnapshot, decide};

const BYPASS_PREFIXES: &[&str] = &["/api", "/_next"];

/// Whether `path` is a page request the guard should evaluate.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    if BYPASS_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }
    // Anything with a dot is a static file (favicon.ico included).
    !path.contains('.')
}

pub async fn route_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let snapshot = GuardSnapshot::from_cookie_value(jar.get(AUTH_STORAGE_KEY).map(Cookie::value));
    match decide(&path, snapshot.is_authenticated, snapshot.current_role) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(%path, %target, authenticated = snapshot.is_authenticated, "guard redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
