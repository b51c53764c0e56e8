//! Freelancer proposals against posted jobs.

#[cfg(test)]
#[path = "proposals_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use crate::net::encode_component;
use crate::net::error::ApiError;
use crate::net::gateway::{ApiGateway, RequestOptions};
use crate::net::types::ApiResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub job_id: String,
    pub freelancer_profile_id: String,
    pub content: String,
    pub total_time_hours: u32,
    pub total_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: String,
    pub job_id: String,
    pub freelancer_profile_id: String,
    pub content: String,
    pub total_time_hours: u32,
    pub total_price: f64,
    pub status: ProposalStatus,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProposalRequest {
    pub content: String,
    pub total_time_hours: u32,
    pub total_price: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRef {
    pub proposal_id: String,
}

fn proposal_path(id: &str) -> String {
    format!("/proposals/{}", encode_component(id))
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn create_proposal(
    gateway: &ApiGateway,
    proposal: &CreateProposalRequest,
) -> Result<ApiResponse<ProposalRef>, ApiError> {
    gateway.post("/proposals", proposal, &RequestOptions::authed()).await
}

/// Proposals submitted by the current freelancer.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn my_proposals(gateway: &ApiGateway) -> Result<ApiResponse<Vec<ProposalResponse>>, ApiError> {
    gateway.get("/proposals/my", &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn proposal_by_id(gateway: &ApiGateway, id: &str) -> Result<ApiResponse<ProposalResponse>, ApiError> {
    gateway.get(&proposal_path(id), &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_proposal(
    gateway: &ApiGateway,
    id: &str,
    edit: &EditProposalRequest,
) -> Result<ApiResponse<ProposalRef>, ApiError> {
    gateway.patch(&proposal_path(id), edit, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn delete_proposal(gateway: &ApiGateway, id: &str) -> Result<ApiResponse<Option<serde_json::Value>>, ApiError> {
    gateway
        .delete::<_, ()>(&proposal_path(id), None, &RequestOptions::authed())
        .await
}
