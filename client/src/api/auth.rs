//! Authentication and identity endpoints.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use session::{Role, UserRecord};

use crate::net::error::ApiError;
use crate::net::gateway::{ApiGateway, REFRESH_PATH, RequestOptions};
use crate::net::types::{
    AccountInfo, ApiResponse, AuthenticationResponse, LoginCredentials, RegisterData, SwitchAccountRequest,
};

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

/// `POST /auth/login`.
///
/// # Errors
///
/// Propagates gateway failures; bad credentials arrive as [`ApiError::Request`].
pub async fn login(
    gateway: &ApiGateway,
    credentials: &LoginCredentials,
) -> Result<ApiResponse<AuthenticationResponse>, ApiError> {
    gateway.post("/auth/login", credentials, &RequestOptions::public()).await
}

/// `POST /auth/register`.
///
/// # Errors
///
/// Field-level rejections arrive as [`ApiError::Validation`].
pub async fn register(
    gateway: &ApiGateway,
    data: &RegisterData,
) -> Result<ApiResponse<AuthenticationResponse>, ApiError> {
    gateway.post("/auth/register", data, &RequestOptions::public()).await
}

/// Explicit refresh call. The gateway refreshes on its own after a 401; this
/// is for hosts that want to rotate tokens proactively.
///
/// # Errors
///
/// Propagates gateway failures. A 401 here never triggers refresh logic.
pub async fn refresh_token(
    gateway: &ApiGateway,
    refresh_token: &str,
) -> Result<ApiResponse<AuthenticationResponse>, ApiError> {
    gateway
        .post(REFRESH_PATH, &RefreshTokenRequest { refresh_token }, &RequestOptions::public())
        .await
}

/// `GET /me`: the authenticated user's identity.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn verify_token(gateway: &ApiGateway) -> Result<ApiResponse<UserRecord>, ApiError> {
    gateway.get("/me", &RequestOptions::authed()).await
}

/// `GET /me/info`: contact and verification details.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn account_info(gateway: &ApiGateway) -> Result<ApiResponse<AccountInfo>, ApiError> {
    gateway.get("/me/info", &RequestOptions::authed()).await
}

/// `PATCH /me/switch`: make `role` the account's active role.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn switch_account(gateway: &ApiGateway, role: Role) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    gateway
        .patch("/me/switch", &SwitchAccountRequest { user_type: role }, &RequestOptions::authed())
        .await
}
