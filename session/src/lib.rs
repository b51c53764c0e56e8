//! Authentication session core shared by the API gateway, the edge router
//! and the CLI.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store` owns the tokens and the cached user record, `storage` is the
//! injectable persistence port, `cookie_mirror` duplicates every persisted
//! write into a cookie so the edge router can read auth state without the
//! client runtime, and `guard` is the pure navigation decision evaluated
//! against that cookie. `encoding` holds the URL escaping shared with the
//! API client.
//!
//! This crate performs no network I/O.

pub mod cookie_mirror;
pub mod encoding;
pub mod guard;
pub mod model;
pub mod storage;
pub mod store;

pub use cookie_mirror::CookieMirror;
pub use encoding::{encode_component, encode_query_value};
pub use guard::{GuardDecision, GuardSnapshot, LOGIN_PATH, decide, home_route, post_login_target};
pub use model::{PersistedSession, Role, SessionState, UserRecord};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{SessionError, SessionStore};

/// Durable storage key (and cookie name) holding the persisted session.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
