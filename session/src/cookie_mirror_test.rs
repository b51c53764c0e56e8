use super::*;
use crate::storage::MemoryStorage;

#[test]
fn set_item_writes_both_storage_and_cookie() {
    let mirror = CookieMirror::new(MemoryStorage::new());
    mirror.set_item("auth-storage", r#"{"state":{"accessToken":"a b"}}"#).unwrap();

    assert_eq!(
        mirror.inner().get_item("auth-storage").unwrap().as_deref(),
        Some(r#"{"state":{"accessToken":"a b"}}"#)
    );
    let cookie = mirror.cookie("auth-storage").unwrap();
    assert_eq!(cookie.value(), r#"{"state":{"accessToken":"a b"}}"#);
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(Duration::seconds(COOKIE_MAX_AGE_SECS)));
}

#[test]
fn set_cookie_header_is_percent_encoded() {
    let mirror = CookieMirror::new(MemoryStorage::new());
    mirror.set_item("auth-storage", r#"{"a":"b c"}"#).unwrap();
    let header = mirror.set_cookie_header("auth-storage").unwrap();
    let pair = header.split(';').next().unwrap();
    assert!(pair.starts_with("auth-storage="), "{header}");
    assert!(!pair.contains(' '), "{header}");
    assert!(header.contains("Path=/"));
    assert!(header.contains("Max-Age=2592000"));
    assert!(header.contains("SameSite=Lax"));

    let parsed = Cookie::parse_encoded(header).unwrap();
    assert_eq!(parsed.value(), r#"{"a":"b c"}"#);
}

#[test]
fn remove_item_expires_cookie() {
    let mirror = CookieMirror::new(MemoryStorage::new());
    mirror.set_item("auth-storage", "{}").unwrap();
    mirror.remove_item("auth-storage").unwrap();

    let cookie = mirror.cookie("auth-storage").unwrap();
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert!(mirror.request_cookie("auth-storage").is_none());
    assert_eq!(mirror.inner().get_item("auth-storage").unwrap(), None);
}

#[test]
fn get_item_refreshes_cookie_from_storage() {
    let inner = MemoryStorage::new();
    inner.set_item("auth-storage", "{\"v\":1}").unwrap();
    let mirror = CookieMirror::new(inner);
    assert!(mirror.cookie("auth-storage").is_none());

    mirror.get_item("auth-storage").unwrap();
    assert_eq!(mirror.cookie("auth-storage").unwrap().value(), "{\"v\":1}");
}

#[test]
fn request_cookie_is_name_value_only() {
    let mirror = CookieMirror::new(MemoryStorage::new());
    mirror.set_item("auth-storage", "x").unwrap();
    assert_eq!(mirror.request_cookie("auth-storage").as_deref(), Some("auth-storage=x"));
}
