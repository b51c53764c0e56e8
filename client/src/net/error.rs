//! Failure taxonomy surfaced to gateway callers.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures are field-addressable so a form can re-render them in
//! place. Request failures carry the server's message verbatim. Network
//! failures are never retried. A 401 on an authenticated call never escapes
//! as its own variant: it is either resolved by refresh-and-replay or
//! surfaces as a `Request` failure.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use super::refresh::RefreshFailure;

/// Message shown for transport failures regardless of the underlying cause.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// One field-level validation error as returned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<FieldError> },
    #[error("{message}")]
    Request { status: Option<u16>, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status behind the failure, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Field errors for a validation failure; empty otherwise.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Message suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_FAILURE_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self::Request { status: Some(401), message: "Unauthorized".to_owned() }
    }
}

impl From<RefreshFailure> for ApiError {
    fn from(failure: RefreshFailure) -> Self {
        Self::Request { status: failure.status, message: failure.message }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    validation_errors: Option<Vec<FieldError>>,
}

/// Generic message for a failed status with no usable body.
#[must_use]
pub fn status_failed_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// Normalize a non-success response into an [`ApiError`].
pub(crate) fn error_from_response(status: u16, body: &str) -> ApiError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return ApiError::Request { status: Some(status), message: status_failed_message(status) };
    };

    if let Some(errors) = parsed.validation_errors.filter(|e| !e.is_empty()) {
        return ApiError::Validation {
            message: parsed.error.unwrap_or_else(|| "Validation failed".to_owned()),
            errors,
        };
    }

    let message = parsed
        .error
        .or(parsed.message)
        .unwrap_or_else(|| status_failed_message(status));
    ApiError::Request { status: Some(status), message }
}
