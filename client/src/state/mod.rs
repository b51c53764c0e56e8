//! Session flows: endpoint calls paired with session-store mutations.

pub mod auth;
pub mod profile_check;

pub use auth::{SessionValidity, SwitchError, sign_in, sign_out, sign_up, switch_account, validate_session};
pub use profile_check::{PROFILE_CREATE_PREFIX, ProfileCheck, check_profiles};
