//! Process-wide authentication session.
//!
//! DESIGN
//! ======
//! `SessionStore` is the single owner of the access/refresh tokens and the
//! cached user record. It is shared behind an `Arc` by the gateway, the
//! session flows and whatever front end hosts them. Every mutation is
//! mirrored synchronously into the injected [`SessionStorage`].
//!
//! ERROR HANDLING
//! ==============
//! Storage is best-effort. A failed write is logged and swallowed; the
//! in-memory state stays authoritative for the lifetime of the process.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::AUTH_STORAGE_KEY;
use crate::model::{PersistedSession, Role, SessionState, UserRecord};
use crate::storage::SessionStorage;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no user is loaded in the session")]
    NoUser,
    #[error("account is not enabled for the {0} role")]
    RoleNotPermitted(Role),
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    has_hydrated: AtomicBool,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("is_authenticated", &self.is_authenticated())
            .field("has_hydrated", &self.has_hydrated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Empty, not-yet-hydrated store.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            has_hydrated: AtomicBool::new(false),
            storage,
        }
    }

    /// Build a store and load the persisted session from `storage`.
    pub fn hydrate(storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::new(storage);
        store.rehydrate();
        store
    }

    /// Load the persisted session, replacing in-memory state, then mark the
    /// store hydrated. Missing or unreadable data yields an empty session.
    pub fn rehydrate(&self) {
        let loaded = match self.storage.get_item(AUTH_STORAGE_KEY) {
            Ok(Some(raw)) => match PersistedSession::from_json(&raw) {
                Ok(persisted) => persisted.state,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unparseable persisted session");
                    SessionState::default()
                }
            },
            Ok(None) => SessionState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "session storage unavailable during hydration");
                SessionState::default()
            }
        };

        {
            let mut state = self.write();
            *state = loaded;
            state.is_authenticated = state.access_token.is_some();
            tracing::debug!(is_authenticated = state.is_authenticated, "session hydrated");
        }
        self.set_has_hydrated(true);
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Replace both tokens and mark the session authenticated.
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let mut state = self.write();
        state.access_token = Some(access_token.into());
        state.refresh_token = Some(refresh_token.into());
        state.is_authenticated = true;
        self.persist(&state);
    }

    /// Replace the cached user record. Tokens are untouched.
    pub fn set_user(&self, user: UserRecord) {
        let mut state = self.write();
        state.user = Some(user);
        self.persist(&state);
    }

    /// Drop tokens and user, and remove the persisted entry.
    pub fn clear_tokens(&self) {
        let mut state = self.write();
        *state = SessionState::default();
        if let Err(e) = self.storage.remove_item(AUTH_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted session");
        }
    }

    /// Switch the cached user's active role.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoUser`] when no user is cached, or
    /// [`SessionError::RoleNotPermitted`] when the account flags do not allow `role`.
    pub fn switch_role(&self, role: Role) -> Result<UserRecord, SessionError> {
        let mut state = self.write();
        let user = state.user.as_mut().ok_or(SessionError::NoUser)?;
        if !user.allows(role) {
            return Err(SessionError::RoleNotPermitted(role));
        }
        user.current_type = role;
        let updated = user.clone();
        self.persist(&state);
        Ok(updated)
    }

    pub fn set_has_hydrated(&self, hydrated: bool) {
        self.has_hydrated.store(hydrated, Ordering::Release);
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        self.has_hydrated.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        self.read().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.read().current_role()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Callers hold the write lock so persisted writes keep mutation order.
    fn persist(&self, state: &SessionState) {
        let raw = match PersistedSession::new(state.clone()).to_json() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(AUTH_STORAGE_KEY, &raw) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
