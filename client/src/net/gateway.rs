//! Request pipeline in front of the remote REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every API module and session flow goes through [`ApiGateway::request`].
//! The gateway reads the access token from the shared [`SessionStore`] per
//! attempt and never caches it.
//!
//! DESIGN
//! ======
//! Each logical request moves through a fixed sequence of states:
//!
//! ```text
//! Sending ─┬─ Success
//!          └─ NeedsRefresh ─ RefreshPending ─┬─ Replay ─┬─ Success
//!                                            │          └─ Failure (no second refresh)
//!                                            └─ RefreshFailed (session cleared, login redirect)
//! ```
//!
//! `RefreshPending` is coalesced across concurrent requests by
//! [`RefreshCoordinator`].
//!
//! ERROR HANDLING
//! ==============
//! A 401 on an authenticated request is recovered locally. Everything else
//! surfaces as an [`ApiError`]; transport failures are never retried.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use session::{LOGIN_PATH, SessionStore};

use super::error::{ApiError, error_from_response};
use super::refresh::{RefreshCoordinator, RefreshFailure, RefreshOutcome};
use super::transport::{Method, OutgoingRequest, RawResponse, ReqwestTransport, Transport};
use super::types::AuthenticationResponse;
use crate::config::{ConfigError, GatewayConfig};

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

const CONTENT_TYPE_JSON: &str = "application/json";

// =============================================================================
// NAVIGATION PORT
// =============================================================================

/// Sink for navigation side effects the gateway triggers.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for headless hosts: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(%path, "navigation requested");
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Per-call options. The default is an unauthenticated call.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub requires_auth: bool,
    /// Extra headers, sent after the defaults.
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn authed() -> Self {
        Self { requires_auth: true, ..Self::default() }
    }

    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

enum Attempt {
    Success(RawResponse),
    Unauthorized,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RefreshResponse {
    Enveloped { data: AuthenticationResponse },
    Bare(AuthenticationResponse),
}

impl RefreshResponse {
    fn into_tokens(self) -> AuthenticationResponse {
        match self {
            Self::Enveloped { data } | Self::Bare(data) => data,
        }
    }
}

/// Cheaply cloneable handle; clones share the session and refresh state.
#[derive(Clone)]
pub struct ApiGateway {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    refresh: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .field("is_refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    /// Gateway over the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, session: Arc<SessionStore>) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::with_transport(config.base_url.as_str(), session, Arc::new(transport)))
    }

    pub fn with_transport(base_url: &str, session: Arc<SessionStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            transport,
            session,
            navigator: Arc::new(LoggingNavigator),
            refresh: Arc::new(RefreshCoordinator::new()),
        }
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Send one logical request, refreshing and replaying once on a 401.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] or [`ApiError::Request`] for non-success
    /// responses, [`ApiError::Network`] for transport failures, and
    /// [`ApiError::Encode`]/[`ApiError::Decode`] for local serde failures.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Encode(e.to_string()))?;

        // Sending
        let sent_token = self.token_for(options);
        let raw = match self
            .attempt(&method, path, body.as_deref(), options, sent_token.as_deref())
            .await?
        {
            Attempt::Success(raw) => raw,
            Attempt::Unauthorized => {
                // NeedsRefresh -> RefreshPending
                self.await_refresh(sent_token.as_deref()).await?;

                // Replay, exactly once.
                let token = self.token_for(options);
                match self
                    .attempt(&method, path, body.as_deref(), options, token.as_deref())
                    .await?
                {
                    Attempt::Success(raw) => raw,
                    Attempt::Unauthorized => {
                        tracing::warn!(%path, "request still unauthorized after token refresh");
                        return Err(ApiError::unauthorized());
                    }
                }
            }
        };

        decode_body(&raw.body)
    }

    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: &RequestOptions) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, options).await
    }

    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B, options: &RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), options).await
    }

    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn put<T, B>(&self, path: &str, body: &B, options: &RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), options).await
    }

    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn patch<T, B>(&self, path: &str, body: &B, options: &RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), options).await
    }

    /// `DELETE`, optionally with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn delete<T, B>(&self, path: &str, body: Option<&B>, options: &RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::DELETE, path, body, options).await
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn token_for(&self, options: &RequestOptions) -> Option<String> {
        if options.requires_auth { self.session.access_token() } else { None }
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        body: Option<&str>,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Attempt, ApiError> {
        let mut headers = vec![("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned())];
        if let Some(token) = token {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        headers.extend(options.headers.iter().cloned());

        let request = OutgoingRequest {
            method: method.clone(),
            url: self.url(path),
            headers,
            body: body.map(str::to_owned),
            timeout: options.timeout,
        };

        let raw = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request failed in transport");
            ApiError::Network(e.to_string())
        })?;

        if raw.is_success() {
            return Ok(Attempt::Success(raw));
        }
        if raw.status == 401 && options.requires_auth && !is_refresh_endpoint(path) {
            return Ok(Attempt::Unauthorized);
        }
        tracing::debug!(%method, %path, status = raw.status, "request rejected");
        Err(error_from_response(raw.status, &raw.body))
    }

    async fn await_refresh(&self, sent_token: Option<&str>) -> Result<(), ApiError> {
        match self.session.access_token() {
            // Tokens already rotated since this attempt went out; replay with them.
            Some(current) if Some(current.as_str()) != sent_token => {
                tracing::debug!("access token rotated during request; replaying without refresh");
                return Ok(());
            }
            // Session ended while this attempt was in flight.
            None if sent_token.is_some() => {
                tracing::debug!("session ended during request; not refreshing");
                return Err(RefreshFailure::session_ended().into());
            }
            _ => {}
        }

        let gateway = self.clone();
        let handle = self.refresh.join_or_start(move || async move { gateway.run_refresh().await });
        handle.await.map_err(ApiError::from)
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let outcome = self.exchange_refresh_token().await;
        match &outcome {
            Ok(()) => tracing::info!("access token refreshed"),
            Err(failure) => {
                tracing::warn!(error = %failure, "token refresh failed; ending session");
                self.session.clear_tokens();
                self.navigator.navigate(LOGIN_PATH);
            }
        }
        outcome
    }

    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let refresh_token = self.session.refresh_token().ok_or_else(RefreshFailure::missing_token)?;
        tracing::info!("refreshing access token");

        let body = serde_json::to_string(&RefreshRequest { refresh_token: &refresh_token })
            .map_err(|e| RefreshFailure::other(e.to_string()))?;
        let request = OutgoingRequest {
            method: Method::POST,
            url: self.url(REFRESH_PATH),
            headers: vec![("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned())],
            body: Some(body),
            timeout: None,
        };

        let raw = self
            .transport
            .send(request)
            .await
            .map_err(|e| RefreshFailure::other(e.to_string()))?;
        if !raw.is_success() {
            return Err(RefreshFailure::rejected(raw.status));
        }

        let tokens = serde_json::from_str::<RefreshResponse>(&raw.body)
            .map_err(|e| RefreshFailure::other(format!("invalid refresh response: {e}")))?
            .into_tokens();
        self.session.set_tokens(tokens.access_token, tokens.refresh_token);
        Ok(())
    }
}

/// Whether `path` targets the refresh endpoint, ignoring any query or suffix.
fn is_refresh_endpoint(path: &str) -> bool {
    path.contains(REFRESH_PATH)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
