//! Sign-in, identity verification, role switching and sign-out.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends call these instead of the raw endpoints so the session store
//! always reflects the server's view: tokens land in the store on sign-in,
//! the cached user is replaced from `GET /me`, and a rejected identity check
//! clears the session.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use session::{Role, SessionError, SessionStore, UserRecord};

use crate::api;
use crate::net::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::types::{LoginCredentials, RegisterData};

#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of checking the stored session against the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionValidity {
    /// The store has not loaded persisted state yet; nothing was checked.
    Pending,
    Valid(UserRecord),
    Invalid,
}

/// Log in and store the issued tokens.
///
/// # Errors
///
/// Returns the gateway failure; the session is left untouched.
pub async fn sign_in(gateway: &ApiGateway, credentials: &LoginCredentials) -> Result<(), ApiError> {
    let response = api::auth::login(gateway, credentials).await?;
    gateway
        .session()
        .set_tokens(response.data.access_token, response.data.refresh_token);
    tracing::info!(username = %credentials.username, "signed in");
    Ok(())
}

/// Register an account and store the issued tokens.
///
/// # Errors
///
/// Field-level rejections come back as [`ApiError::Validation`].
pub async fn sign_up(gateway: &ApiGateway, data: &RegisterData) -> Result<(), ApiError> {
    let response = api::auth::register(gateway, data).await?;
    gateway
        .session()
        .set_tokens(response.data.access_token, response.data.refresh_token);
    tracing::info!(email = %data.email, role = %data.user_type, "registered");
    Ok(())
}

/// Confirm the stored access token with `GET /me` and cache the user.
///
/// Any failure, including one the refresh path could not recover, clears
/// the session.
pub async fn validate_session(gateway: &ApiGateway) -> SessionValidity {
    let session = gateway.session();
    if !session.has_hydrated() {
        return SessionValidity::Pending;
    }
    if session.access_token().is_none() {
        return SessionValidity::Invalid;
    }

    match api::auth::verify_token(gateway).await {
        Ok(response) => {
            session.set_user(response.data.clone());
            SessionValidity::Valid(response.data)
        }
        Err(e) => {
            tracing::warn!(error = %e, "session rejected by server");
            session.clear_tokens();
            SessionValidity::Invalid
        }
    }
}

/// Switch the account's active role and return the new role's home route.
///
/// # Errors
///
/// Returns [`SwitchError::Session`] without calling the server when no user
/// is cached or the account is not enabled for `role`.
pub async fn switch_account(gateway: &ApiGateway, role: Role) -> Result<&'static str, SwitchError> {
    let session = gateway.session();
    let user = session.user().ok_or(SessionError::NoUser)?;
    if !user.allows(role) {
        return Err(SessionError::RoleNotPermitted(role).into());
    }

    api::auth::switch_account(gateway, role).await?;
    session.switch_role(role)?;
    tracing::info!(%role, "switched account role");
    Ok(role.home_route())
}

/// Drop tokens and the cached user.
pub fn sign_out(session: &SessionStore) {
    session.clear_tokens();
    tracing::info!("signed out");
}
