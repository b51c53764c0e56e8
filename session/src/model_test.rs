use super::*;

fn alice() -> UserRecord {
    UserRecord {
        id: "u1".to_owned(),
        email: "alice@example.com".to_owned(),
        first_name: "Alice".to_owned(),
        last_name: "Smith".to_owned(),
        current_type: Role::Freelancer,
        client: false,
        freelancer: true,
        personal_photo: None,
    }
}

#[test]
fn role_serializes_as_screaming_case() {
    assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"CLIENT\"");
    assert_eq!(serde_json::to_string(&Role::Freelancer).unwrap(), "\"FREELANCER\"");
}

#[test]
fn role_parses_case_insensitively() {
    assert_eq!("freelancer".parse::<Role>().unwrap(), Role::Freelancer);
    assert_eq!(" CLIENT ".parse::<Role>().unwrap(), Role::Client);
    assert!("admin".parse::<Role>().is_err());
}

#[test]
fn role_routes() {
    assert_eq!(Role::Freelancer.home_route(), "/app/find-work");
    assert_eq!(Role::Client.home_route(), "/app/hire-talent");
    assert_eq!(Role::Client.profile_create_route(), "/app/profile/create/client");
}

#[test]
fn user_allows_follows_flags() {
    let user = alice();
    assert!(user.allows(Role::Freelancer));
    assert!(!user.allows(Role::Client));
}

#[test]
fn user_record_uses_camel_case_fields() {
    let json = serde_json::to_value(alice()).unwrap();
    assert_eq!(json["firstName"], "Alice");
    assert_eq!(json["currentType"], "FREELANCER");
    assert!(json.get("personalPhoto").is_none());
}

#[test]
fn persisted_layout_matches_storage_contract() {
    let state = SessionState {
        access_token: Some("a".to_owned()),
        refresh_token: Some("r".to_owned()),
        user: None,
        is_authenticated: true,
    };
    let json: serde_json::Value = serde_json::from_str(&PersistedSession::new(state).to_json().unwrap()).unwrap();
    assert_eq!(json["state"]["accessToken"], "a");
    assert_eq!(json["state"]["refreshToken"], "r");
    assert_eq!(json["state"]["isAuthenticated"], true);
    assert!(json["state"]["user"].is_null());
    assert_eq!(json["version"], 0);
}

#[test]
fn partial_envelope_fills_defaults() {
    let parsed = PersistedSession::from_json(r#"{"state":{"accessToken":"tok"}}"#).unwrap();
    assert_eq!(parsed.state.access_token.as_deref(), Some("tok"));
    assert_eq!(parsed.state.refresh_token, None);
    assert_eq!(parsed.version, 0);
}
