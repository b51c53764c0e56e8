//! Typed calls against the marketplace REST API.
//!
//! Each function is a thin wrapper over [`crate::ApiGateway`]: it picks the
//! method, path and auth requirement and leaves payload semantics to the
//! server. Responses are returned in their [`crate::ApiResponse`] envelope.

pub mod auth;
pub mod country;
pub mod jobs;
pub mod profile;
pub mod proposals;

/// Server-issued identifier echoed back by mutation endpoints.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRef {
    pub profile_id: String,
}
