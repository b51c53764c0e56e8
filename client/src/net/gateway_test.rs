use super::*;
use crate::net::error::FieldError;
use crate::net::test_helpers::*;
use crate::net::transport::TransportError;
use crate::net::types::ApiResponse;
use serde_json::{Value, json};

// =============================================================
// Helpers
// =============================================================

/// Protected resource that accepts only `valid`; refresh issues `valid`/`r2`.
fn rotating_backend(valid: &'static str) -> MockTransport {
    MockTransport::new(move |req| {
        if path_of(&req.url) == REFRESH_PATH {
            return Ok(response(200, &refresh_body(valid, "r2")));
        }
        if bearer(req) == Some(valid) {
            Ok(response(200, r#"{"success":true,"data":"ok"}"#))
        } else {
            Ok(response(401, r#"{"error":"Unauthorized"}"#))
        }
    })
}

// =============================================================
// Headers and body handling
// =============================================================

#[tokio::test]
async fn authed_request_sends_bearer_and_json_content_type() {
    let h = harness(MockTransport::fixed(200, r#"{"success":true,"data":1}"#), Some(("a1", "r1")));
    let out: ApiResponse<u32> = h.gateway.get("/me", &RequestOptions::authed()).await.unwrap();
    assert_eq!(out.data, 1);

    let req = h.transport.last_request();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.url, format!("{TEST_BASE_URL}/me"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(bearer(&req), Some("a1"));
    assert!(req.body.is_none());
}

#[tokio::test]
async fn authed_request_without_token_omits_authorization() {
    let h = harness(MockTransport::fixed(200, r#"{"success":true,"data":null}"#), None);
    let _: Value = h.gateway.get("/me", &RequestOptions::authed()).await.unwrap();
    assert!(h.transport.last_request().header("Authorization").is_none());
}

#[tokio::test]
async fn public_request_never_sends_token() {
    let h = harness(MockTransport::fixed(200, "[]"), Some(("a1", "r1")));
    let _: Vec<Value> = h.gateway.get("/country", &RequestOptions::public()).await.unwrap();
    assert!(h.transport.last_request().header("Authorization").is_none());
}

#[tokio::test]
async fn post_serializes_body_and_extra_headers() {
    let h = harness(MockTransport::fixed(201, r#"{"success":true,"data":"job-1"}"#), Some(("a1", "r1")));
    let options = RequestOptions::authed().with_header("X-Request-Id", "abc");
    let out: ApiResponse<String> = h.gateway.post("/jobs", &json!({"title": "T"}), &options).await.unwrap();
    assert_eq!(out.data, "job-1");

    let req = h.transport.last_request();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.body.as_deref(), Some(r#"{"title":"T"}"#));
    assert_eq!(req.header("x-request-id"), Some("abc"));
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let h = harness(MockTransport::fixed(204, ""), Some(("a1", "r1")));
    h.gateway
        .delete::<(), ()>("/proposals/p1", None, &RequestOptions::authed())
        .await
        .unwrap();
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let h = harness(MockTransport::fixed(200, "not json"), None);
    let err = h.gateway.get::<Value>("/country", &RequestOptions::public()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================
// Error taxonomy
// =============================================================

#[tokio::test]
async fn validation_body_surfaces_field_errors() {
    let body = r#"{"error":"Validation failed","validationErrors":[{"field":"email","message":"Invalid"}]}"#;
    let h = harness(MockTransport::fixed(400, body), None);
    let err = h
        .gateway
        .post::<Value, _>("/auth/register", &json!({}), &RequestOptions::public())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation failed");
    assert_eq!(
        err.field_errors(),
        &[FieldError { field: "email".to_owned(), message: "Invalid".to_owned() }]
    );
}

#[tokio::test]
async fn error_message_taken_from_body() {
    let h = harness(MockTransport::fixed(404, r#"{"message":"Job not found"}"#), None);
    let err = h.gateway.get::<Value>("/jobs/public/x", &RequestOptions::public()).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Job not found");
}

#[tokio::test]
async fn transport_failure_is_network_error_without_retry() {
    let h = harness(MockTransport::new(|_| Err(TransportError("connection refused".to_owned()))), Some(("a1", "r1")));
    let err = h.gateway.get::<Value>("/me", &RequestOptions::authed()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn unauthorized_public_request_is_plain_failure() {
    let h = harness(MockTransport::fixed(401, r#"{"error":"Bad credentials"}"#), None);
    let err = h
        .gateway
        .post::<Value, _>("/auth/login", &json!({"username": "u", "password": "p"}), &RequestOptions::public())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(h.transport.count_path(REFRESH_PATH), 0);
}

// =============================================================
// Refresh on 401
// =============================================================

#[tokio::test]
async fn single_401_refreshes_then_replays_once() {
    let h = harness(rotating_backend("a2"), Some(("a1", "r1")));
    let out: ApiResponse<String> = h.gateway.get("/profile", &RequestOptions::authed()).await.unwrap();
    assert_eq!(out.data, "ok");

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(bearer(&requests[0]), Some("a1"));

    let refresh = &requests[1];
    assert_eq!(path_of(&refresh.url), REFRESH_PATH);
    assert_eq!(refresh.method, Method::POST);
    assert!(refresh.header("Authorization").is_none());
    assert_eq!(refresh.body.as_deref(), Some(r#"{"refreshToken":"r1"}"#));

    assert_eq!(bearer(&requests[2]), Some("a2"));
    assert_eq!(h.session().access_token().as_deref(), Some("a2"));
    assert_eq!(h.session().refresh_token().as_deref(), Some("r2"));
    assert!(h.session().is_authenticated());
    assert!(!h.gateway.is_refreshing());
}

#[tokio::test]
async fn bare_refresh_response_is_accepted() {
    let transport = MockTransport::new(|req| {
        if path_of(&req.url) == REFRESH_PATH {
            return Ok(response(200, r#"{"accessToken":"a2","refreshToken":"r2"}"#));
        }
        Ok(if bearer(req) == Some("a2") { response(200, "true") } else { response(401, "") })
    });
    let h = harness(transport, Some(("a1", "r1")));
    let ok: bool = h.gateway.get("/me", &RequestOptions::authed()).await.unwrap();
    assert!(ok);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_401s_share_one_refresh() {
    let transport = rotating_backend("a2").with_refresh_delay(Duration::from_millis(50));
    let h = harness(transport, Some(("a1", "r1")));

    let mut tasks = Vec::new();
    for i in 0..5 {
        let gateway = h.gateway.clone();
        tasks.push(tokio::spawn(async move {
            gateway
                .get::<ApiResponse<String>>(&format!("/jobs/{i}"), &RequestOptions::authed())
                .await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().data, "ok");
    }

    assert_eq!(h.transport.count_path(REFRESH_PATH), 1);
    let replays = h
        .transport
        .requests()
        .iter()
        .filter(|r| path_of(&r.url) != REFRESH_PATH && bearer(r) == Some("a2"))
        .count();
    assert_eq!(replays, 5);
    assert_eq!(h.session().access_token().as_deref(), Some("a2"));
}

#[tokio::test]
async fn refresh_failure_fails_all_waiters_and_clears_once() {
    let transport = MockTransport::new(|req| {
        if path_of(&req.url) == REFRESH_PATH {
            return Ok(response(401, r#"{"error":"expired"}"#));
        }
        Ok(response(401, ""))
    });
    let h = harness(transport, Some(("a1", "r1")));
    let removals_before = h.storage.removals();

    let calls = (0..5).map(|i| {
        let gateway = h.gateway.clone();
        async move {
            gateway
                .get::<Value>(&format!("/proposals/{i}"), &RequestOptions::authed())
                .await
        }
    });
    let results = futures::future::join_all(calls).await;

    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Failed to refresh token");
    }
    assert_eq!(h.transport.count_path(REFRESH_PATH), 1);
    assert_eq!(h.storage.removals() - removals_before, 1);
    assert_eq!(h.navigator.paths(), vec![session::LOGIN_PATH.to_owned()]);
    assert!(!h.session().is_authenticated());
    assert!(h.session().refresh_token().is_none());
}

#[tokio::test]
async fn late_401_after_failed_refresh_does_not_end_session_again() {
    let transport = MockTransport::new(|req| {
        if path_of(&req.url) == REFRESH_PATH {
            return Ok(response(401, r#"{"error":"expired"}"#));
        }
        Ok(response(401, ""))
    });
    let h = harness(transport, Some(("a1", "r1")));
    let removals_before = h.storage.removals();

    let err = h.gateway.get::<Value>("/proposals/my", &RequestOptions::authed()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to refresh token");

    // A request sent with the old token whose 401 lands after the session ended.
    let late = h.gateway.await_refresh(Some("a1")).await.unwrap_err();
    assert_eq!(late.to_string(), "Session expired");
    assert_eq!(h.transport.count_path(REFRESH_PATH), 1);
    assert_eq!(h.storage.removals() - removals_before, 1);
    assert_eq!(h.navigator.paths(), vec![session::LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn refresh_endpoint_with_query_never_triggers_refresh() {
    let h = harness(MockTransport::fixed(401, r#"{"error":"Invalid refresh token"}"#), Some(("a1", "r1")));
    let path = format!("{REFRESH_PATH}?v=1");
    let err = h
        .gateway
        .post::<Value, _>(&path, &json!({"refreshToken": "r1"}), &RequestOptions::authed())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(h.transport.requests().len(), 1);
    assert!(h.navigator.paths().is_empty());
}

#[test]
fn refresh_endpoint_match_ignores_query_and_trailing_slash() {
    assert!(is_refresh_endpoint("/auth/refresh"));
    assert!(is_refresh_endpoint("/auth/refresh?v=1"));
    assert!(is_refresh_endpoint("/auth/refresh/"));
    assert!(!is_refresh_endpoint("/auth/login"));
}

#[tokio::test]
async fn refresh_endpoint_never_triggers_refresh() {
    let h = harness(MockTransport::fixed(401, r#"{"error":"Invalid refresh token"}"#), Some(("a1", "r1")));
    let err = h
        .gateway
        .post::<Value, _>(REFRESH_PATH, &json!({"refreshToken": "r1"}), &RequestOptions::authed())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid refresh token");
    assert_eq!(h.transport.requests().len(), 1);
    assert!(h.navigator.paths().is_empty());
    assert!(h.session().is_authenticated());
}

#[tokio::test]
async fn replayed_401_surfaces_without_second_refresh() {
    let transport = MockTransport::new(|req| {
        if path_of(&req.url) == REFRESH_PATH {
            return Ok(response(200, &refresh_body("a2", "r2")));
        }
        Ok(response(401, ""))
    });
    let h = harness(transport, Some(("a1", "r1")));
    let err = h.gateway.get::<Value>("/me", &RequestOptions::authed()).await.unwrap_err();

    assert!(matches!(err, ApiError::Request { status: Some(401), .. }));
    assert_eq!(h.transport.count_path(REFRESH_PATH), 1);
    assert_eq!(h.transport.count_path("/me"), 2);
    assert!(h.navigator.paths().is_empty());
    assert_eq!(h.session().access_token().as_deref(), Some("a2"));
}

#[tokio::test]
async fn missing_refresh_token_ends_session() {
    let h = harness(MockTransport::fixed(401, ""), None);
    let err = h.gateway.get::<Value>("/me", &RequestOptions::authed()).await.unwrap_err();

    assert_eq!(err.to_string(), "No refresh token available");
    assert_eq!(h.transport.count_path(REFRESH_PATH), 0);
    assert_eq!(h.navigator.paths(), vec![session::LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn rotated_token_replays_without_refresh() {
    let h = harness(rotating_backend("a2"), Some(("a1", "r1")));
    // Simulate another request completing a refresh while this one was in flight.
    h.session().set_tokens("a2", "r2");
    h.gateway.await_refresh(Some("a1")).await.unwrap();
    assert_eq!(h.transport.count_path(REFRESH_PATH), 0);
}

#[tokio::test]
async fn abandoned_waiter_does_not_cancel_refresh() {
    let transport = rotating_backend("a2").with_refresh_delay(Duration::from_millis(30));
    let h = harness(transport, Some(("a1", "r1")));

    let options = RequestOptions::authed();
    let pending = h.gateway.get::<Value>("/me", &options);
    let timed_out = tokio::time::timeout(Duration::from_millis(5), pending).await;
    assert!(timed_out.is_err());
    assert!(h.gateway.is_refreshing());

    tokio::time::timeout(Duration::from_secs(2), async {
        while h.gateway.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(h.session().access_token().as_deref(), Some("a2"));
}
