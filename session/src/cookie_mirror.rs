//! Cookie mirror over any [`SessionStorage`].
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge router decides redirects before any client code runs, so it can
//! only see what arrives in the `Cookie` header. Every write to the wrapped
//! storage is therefore duplicated into a cookie carrying the same JSON,
//! percent-encoded, with a 30-day lifetime. Removal emits an already-expired
//! cookie so the browser (or any cookie jar) drops it.

#[cfg(test)]
#[path = "cookie_mirror_test.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::Mutex;

use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use crate::storage::{SessionStorage, StorageError};

/// Lifetime of the mirrored cookie (30 days).
pub const COOKIE_MAX_AGE_SECS: i64 = 2_592_000;

/// Storage wrapper that mirrors each key into a cookie.
#[derive(Debug)]
pub struct CookieMirror<S> {
    inner: S,
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
}

impl<S: SessionStorage> CookieMirror<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, cookies: Mutex::new(HashMap::new()) }
    }

    /// The wrapped storage.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Latest cookie emitted for `key`, live or expired.
    pub fn cookie(&self, key: &str) -> Option<Cookie<'static>> {
        self.cookies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Full `Set-Cookie` header value for `key`.
    pub fn set_cookie_header(&self, key: &str) -> Option<String> {
        self.cookie(key).map(|c| c.encoded().to_string())
    }

    /// `name=value` pair suitable for a request `Cookie` header.
    /// `None` once the cookie has been expired.
    pub fn request_cookie(&self, key: &str) -> Option<String> {
        self.cookie(key)
            .filter(|c| !is_expired(c))
            .map(|c| c.encoded().stripped().to_string())
    }

    fn store(&self, cookie: Cookie<'static>) {
        let mut cookies = self
            .cookies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cookies.insert(cookie.name().to_owned(), cookie);
    }
}

impl<S: SessionStorage> SessionStorage for CookieMirror<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let item = self.inner.get_item(key)?;
        if let Some(raw) = &item {
            self.store(live_cookie(key, raw));
        }
        Ok(item)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value)?;
        self.store(live_cookie(key, value));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)?;
        self.store(expired_cookie(key));
        Ok(())
    }
}

fn live_cookie(name: &str, value: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value.to_owned()))
        .path("/")
        .max_age(Duration::seconds(COOKIE_MAX_AGE_SECS))
        .same_site(SameSite::Lax)
        .build()
}

fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), String::new()))
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .build()
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    cookie.max_age().is_some_and(|age| age <= Duration::ZERO)
}
