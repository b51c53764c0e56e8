//! Onboarding check: does the account still need a profile for one of its
//! enabled roles?

#[cfg(test)]
#[path = "profile_check_test.rs"]
mod tests;

use session::{Role, UserRecord};

use crate::api;
use crate::api::profile::{ProfileSummary, ProfileType};
use crate::net::error::ApiError;
use crate::net::gateway::ApiGateway;

/// Routes under this prefix are the profile-creation pages themselves.
pub const PROFILE_CREATE_PREFIX: &str = "/app/profile/create";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProfileCheck {
    pub has_profile: bool,
    pub has_client_profile: bool,
    pub has_freelancer_profile: bool,
    pub needs_client_profile: bool,
    pub needs_freelancer_profile: bool,
}

impl ProfileCheck {
    #[must_use]
    pub fn evaluate(profiles: &[ProfileSummary], user: Option<&UserRecord>) -> Self {
        let has_client_profile = profiles.iter().any(|p| p.profile_type == ProfileType::Client);
        let has_freelancer_profile = profiles.iter().any(|p| p.profile_type == ProfileType::Freelancer);
        let is_client = user.is_some_and(|u| u.client);
        let is_freelancer = user.is_some_and(|u| u.freelancer);

        Self {
            has_profile: !profiles.is_empty(),
            has_client_profile,
            has_freelancer_profile,
            needs_client_profile: is_client && !has_client_profile,
            needs_freelancer_profile: is_freelancer && !has_freelancer_profile,
        }
    }

    /// Profile-creation route to send a visitor on `path` to, if any. The
    /// client profile is asked for first.
    #[must_use]
    pub fn redirect_for(&self, path: &str) -> Option<&'static str> {
        if path.starts_with(PROFILE_CREATE_PREFIX) {
            return None;
        }
        if self.needs_client_profile {
            Some(Role::Client.profile_create_route())
        } else if self.needs_freelancer_profile {
            Some(Role::Freelancer.profile_create_route())
        } else {
            None
        }
    }
}

/// Fetch the account's profiles and evaluate them against the cached user.
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn check_profiles(gateway: &ApiGateway) -> Result<ProfileCheck, ApiError> {
    let response = api::profile::profiles(gateway).await?;
    let user = gateway.session().user();
    let check = ProfileCheck::evaluate(&response.data, user.as_ref());
    tracing::debug!(
        needs_client = check.needs_client_profile,
        needs_freelancer = check.needs_freelancer_profile,
        "profile check evaluated"
    );
    Ok(check)
}
