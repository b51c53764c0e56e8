//! Client and freelancer profiles, and the freelancer portfolio sections
//! (skills, work experience, projects, certificates).
//!
//! Portfolio entries are addressed by profile id plus a natural key (the
//! employer name, project title or certificate name); both segments are
//! percent-encoded into the path.

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use super::ProfileRef;
use crate::net::encode_component;
use crate::net::error::ApiError;
use crate::net::gateway::{ApiGateway, RequestOptions};
use crate::net::types::ApiResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    Freelancer,
    Client,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecializationStatus {
    Active,
    Inactive,
}

/// Profile summary from `GET /profile`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub bio: String,
    pub average_ratings: f64,
    pub number_of_ratings: u32,
    pub visible: bool,
    pub created_at: String,
    pub profile_type: ProfileType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientProfileRequest {
    pub bio: String,
    pub company_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFreelancerProfileRequest {
    pub title: String,
    pub bio: String,
    pub specialization_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditClientProfileRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditFreelancerProfileRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationOption {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub specialization_status: SpecializationStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub profile_id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceDetail {
    pub profile_id: String,
    pub worked_at: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetail {
    pub profile_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerProfileDetails {
    pub id: String,
    pub title: String,
    pub bio: String,
    pub average_ratings: f64,
    pub number_of_ratings: u32,
    pub created_at: String,
    pub specialization: Specialization,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<ProjectDetail>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperienceDetail>,
    #[serde(default)]
    pub certificates: Vec<CertificateDetail>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileDetails {
    pub id: String,
    pub bio: String,
    pub average_ratings: f64,
    pub number_of_ratings: u32,
    pub created_at: String,
    pub company_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsRequest {
    pub profile_id: String,
    pub skills_id: Vec<String>,
}

/// Add or edit a work-experience entry. The server keys it on `work_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceRequest {
    pub profile_id: String,
    pub work_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub profile_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub profile_id: String,
    pub certificate_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceRef {
    pub profile_id: String,
    pub worked_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub profile_id: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRef {
    pub certificate_id: String,
    pub name: String,
}

// =============================================================================
// PATHS
// =============================================================================

const FREELANCER_BASE: &str = "/profile/freelancer";
const SKILLS_PATH: &str = "/profile/freelancer/skills";
const WORK_EXPERIENCE_PATH: &str = "/profile/freelancer/work-experience";
const PROJECTS_PATH: &str = "/profile/freelancer/projects";
const CERTIFICATES_PATH: &str = "/profile/freelancer/certificates";

fn keyed_path(base: &str, profile_id: &str, key: &str) -> String {
    format!("{base}/{}/{}", encode_component(profile_id), encode_component(key))
}

fn freelancer_details_path(profile_id: &str) -> String {
    format!("{FREELANCER_BASE}/{}", encode_component(profile_id))
}

fn client_details_path(profile_id: &str) -> String {
    format!("/profile/client/{}", encode_component(profile_id))
}

// =============================================================================
// PROFILES
// =============================================================================

/// Profiles owned by the current account, one per enabled role at most.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn profiles(gateway: &ApiGateway) -> Result<ApiResponse<Vec<ProfileSummary>>, ApiError> {
    gateway.get("/profile", &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn create_client_profile(
    gateway: &ApiGateway,
    profile: &CreateClientProfileRequest,
) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.post("/profile/client", profile, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn create_freelancer_profile(
    gateway: &ApiGateway,
    profile: &CreateFreelancerProfileRequest,
) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.post(FREELANCER_BASE, profile, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_client_profile(
    gateway: &ApiGateway,
    edit: &EditClientProfileRequest,
) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.patch("/profile/client", edit, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_freelancer_profile(
    gateway: &ApiGateway,
    edit: &EditFreelancerProfileRequest,
) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.patch(FREELANCER_BASE, edit, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn freelancer_profile_details(
    gateway: &ApiGateway,
    profile_id: &str,
) -> Result<ApiResponse<FreelancerProfileDetails>, ApiError> {
    gateway.get(&freelancer_details_path(profile_id), &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn client_profile_details(
    gateway: &ApiGateway,
    profile_id: &str,
) -> Result<ApiResponse<ClientProfileDetails>, ApiError> {
    gateway.get(&client_details_path(profile_id), &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn specializations(gateway: &ApiGateway) -> Result<ApiResponse<Vec<SpecializationOption>>, ApiError> {
    gateway.get("/profile/freelancer/specialization", &RequestOptions::authed()).await
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// Skill catalog.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn skills(gateway: &ApiGateway) -> Result<ApiResponse<Vec<Skill>>, ApiError> {
    gateway.get(SKILLS_PATH, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn add_skills(gateway: &ApiGateway, request: &SkillsRequest) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.post(SKILLS_PATH, request, &RequestOptions::authed()).await
}

/// `DELETE` with the skill ids in the body.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn delete_skills(gateway: &ApiGateway, request: &SkillsRequest) -> Result<ApiResponse<ProfileRef>, ApiError> {
    gateway.delete(SKILLS_PATH, Some(request), &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn add_work_experience(
    gateway: &ApiGateway,
    request: &WorkExperienceRequest,
) -> Result<ApiResponse<WorkExperienceRef>, ApiError> {
    gateway.post(WORK_EXPERIENCE_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_work_experience(
    gateway: &ApiGateway,
    request: &WorkExperienceRequest,
) -> Result<ApiResponse<WorkExperienceRef>, ApiError> {
    gateway.patch(WORK_EXPERIENCE_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn delete_work_experience(
    gateway: &ApiGateway,
    profile_id: &str,
    worked_at: &str,
) -> Result<ApiResponse<WorkExperienceRef>, ApiError> {
    gateway
        .delete::<_, ()>(&keyed_path(WORK_EXPERIENCE_PATH, profile_id, worked_at), None, &RequestOptions::authed())
        .await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn add_project(gateway: &ApiGateway, request: &ProjectRequest) -> Result<ApiResponse<ProjectRef>, ApiError> {
    gateway.post(PROJECTS_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_project(gateway: &ApiGateway, request: &ProjectRequest) -> Result<ApiResponse<ProjectRef>, ApiError> {
    gateway.patch(PROJECTS_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn delete_project(
    gateway: &ApiGateway,
    profile_id: &str,
    title: &str,
) -> Result<ApiResponse<ProjectRef>, ApiError> {
    gateway
        .delete::<_, ()>(&keyed_path(PROJECTS_PATH, profile_id, title), None, &RequestOptions::authed())
        .await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn add_certificate(
    gateway: &ApiGateway,
    request: &CertificateRequest,
) -> Result<ApiResponse<CertificateRef>, ApiError> {
    gateway.post(CERTIFICATES_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn edit_certificate(
    gateway: &ApiGateway,
    request: &CertificateRequest,
) -> Result<ApiResponse<CertificateRef>, ApiError> {
    gateway.patch(CERTIFICATES_PATH, request, &RequestOptions::authed()).await
}

/// # Errors
///
/// Propagates gateway failures.
pub async fn delete_certificate(
    gateway: &ApiGateway,
    profile_id: &str,
    name: &str,
) -> Result<ApiResponse<CertificateRef>, ApiError> {
    gateway
        .delete::<_, ()>(&keyed_path(CERTIFICATES_PATH, profile_id, name), None, &RequestOptions::authed())
        .await
}
