//! Session data model and its persisted envelope.
//!
//! DESIGN
//! ======
//! Field names follow the camelCase layout already written to durable storage
//! by earlier front-end builds, so a session saved by either side hydrates in
//! the other.

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version stamped into the persisted envelope.
pub const PERSIST_VERSION: u32 = 0;

// =============================================================================
// ROLE
// =============================================================================

/// Capability tag on an account: which side of the marketplace it acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Freelancer,
}

impl Role {
    /// Wire form (`"CLIENT"` / `"FREELANCER"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Freelancer => "FREELANCER",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Freelancer => "Freelancer",
        }
    }

    /// Home route for this role.
    #[must_use]
    pub fn home_route(self) -> &'static str {
        match self {
            Self::Client => "/app/hire-talent",
            Self::Freelancer => "/app/find-work",
        }
    }

    /// Route of the profile-creation flow for this role.
    #[must_use]
    pub fn profile_create_route(self) -> &'static str {
        match self {
            Self::Client => "/app/profile/create/client",
            Self::Freelancer => "/app/profile/create/freelancer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Role`] from text.
#[derive(Debug, thiserror::Error)]
#[error("unknown role `{0}` (expected CLIENT or FREELANCER)")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Ok(Self::Client),
            "FREELANCER" => Ok(Self::Freelancer),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

// =============================================================================
// USER RECORD
// =============================================================================

/// Identity of the signed-in account, as returned by `GET /me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Role the account is currently acting as.
    pub current_type: Role,
    /// Whether the account may act as a client.
    pub client: bool,
    /// Whether the account may act as a freelancer.
    pub freelancer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_photo: Option<String>,
}

impl UserRecord {
    /// Whether the account's flags permit acting as `role`.
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        match role {
            Role::Client => self.client,
            Role::Freelancer => self.freelancer,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// In-memory session. `is_authenticated` always equals `access_token.is_some()`
/// once it has passed through [`crate::SessionStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
}

impl SessionState {
    /// Role of the cached user, if any.
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.current_type)
    }
}

/// Durable-storage envelope: `{ "state": {...}, "version": N }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: SessionState,
    #[serde(default)]
    pub version: u32,
}

impl PersistedSession {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self { state, version: PERSIST_VERSION }
    }

    /// Serialize to the JSON text written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the JSON text read from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a valid envelope.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
