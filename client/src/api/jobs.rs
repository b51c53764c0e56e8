//! Job postings.

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use crate::net::encode_component;
use crate::net::error::ApiError;
use crate::net::gateway::{ApiGateway, RequestOptions};
use crate::net::types::ApiResponse;

/// Page size for the public job board.
pub const PUBLIC_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Junior,
    MidLevel,
    Senior,
    Expert,
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Mentorship,
    Job,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRequest {
    pub title: String,
    pub content: String,
    pub job_price: f64,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub job_price: f64,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub created_at: String,
    pub job_status: JobStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub id: String,
    pub job_price: f64,
    pub experience_level: ExperienceLevel,
}

fn client_jobs_path(client_id: &str) -> String {
    format!("/jobs/client?id={}", encode_component(client_id))
}

fn public_jobs_path(page: u32) -> String {
    format!("/jobs/public?page={page}&size={PUBLIC_PAGE_SIZE}")
}

fn job_path(id: &str) -> String {
    format!("/jobs/public/{}", encode_component(id))
}

/// `POST /jobs`; `data` is the new job's id.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn create_job(gateway: &ApiGateway, job: &NewJobRequest) -> Result<ApiResponse<String>, ApiError> {
    gateway.post("/jobs", job, &RequestOptions::authed()).await
}

/// Jobs posted by `client_id`.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn client_jobs(gateway: &ApiGateway, client_id: &str) -> Result<ApiResponse<Vec<JobResponse>>, ApiError> {
    gateway.get(&client_jobs_path(client_id), &RequestOptions::authed()).await
}

/// `PATCH /jobs`.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn update_job(gateway: &ApiGateway, update: &UpdateJobRequest) -> Result<ApiResponse<String>, ApiError> {
    gateway.patch("/jobs", update, &RequestOptions::authed()).await
}

/// One page of the public job board (zero-based).
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn public_jobs(gateway: &ApiGateway, page: u32) -> Result<ApiResponse<Vec<JobResponse>>, ApiError> {
    gateway.get(&public_jobs_path(page), &RequestOptions::public()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn job_by_id(gateway: &ApiGateway, id: &str) -> Result<ApiResponse<JobResponse>, ApiError> {
    gateway.get(&job_path(id), &RequestOptions::public()).await
}
