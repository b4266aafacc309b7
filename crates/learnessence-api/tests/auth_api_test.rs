//! Authentication, health and middleware behavior of the router.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use common::*;
use learnessence_api::build_rate_limiter;

#[tokio::test]
async fn test_health_needs_no_auth() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(plain_app(&store), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_missing_session_is_unauthorized() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .uri("/api/notes")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(plain_app(&store), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let store = InMemoryStore::new();
    store.add_session("known");
    let (status, body) = send(plain_app(&store), get("/api/notes", "unknown")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let store = InMemoryStore::new();
    store.add_session_for("stale", Uuid::now_v7(), Utc::now() - Duration::minutes(1));
    let (status, _) = send(plain_app(&store), get("/api/stats", "stale")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_cookie_authenticates() {
    let store = InMemoryStore::new();
    store.add_session("tok");
    // `get` sends `tok.signature`; only the part before the dot is looked up.
    let (status, body) = send(plain_app(&store), get("/api/notes", "tok")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let store = InMemoryStore::new();
    store.add_session("bearer-tok");
    let request = Request::builder()
        .uri("/api/stats")
        .header(header::AUTHORIZATION, "Bearer bearer-tok")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(plain_app(&store), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], 0);
}

#[tokio::test]
async fn test_custom_cookie_name() {
    let store = InMemoryStore::new();
    store.add_session("tok");
    let app = app(state(&store).with_session_cookie_name("my.session"));

    let request = Request::builder()
        .uri("/api/stats")
        .header(header::COOKIE, "my.session=tok.sig")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    // The default cookie name is no longer recognized.
    let (status, _) = send(app, get("/api/stats", "tok")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_set() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = plain_app(&store).oneshot(request).await.unwrap();
    let id = response
        .headers()
        .get("x-request-id")
        .expect("request id header")
        .to_str()
        .unwrap();
    let parsed: Uuid = id.parse().unwrap();
    assert_eq!(parsed.get_version_num(), 7);
}

#[tokio::test]
async fn test_incoming_request_id_is_propagated() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-supplied")
        .body(Body::empty())
        .unwrap();
    let response = plain_app(&store).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "client-supplied");
}

#[tokio::test]
async fn test_cors_allows_whitelisted_origin_with_credentials() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/notes")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = plain_app(&store).oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let store = InMemoryStore::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/notes")
        .header(header::ORIGIN, "https://evil.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = plain_app(&store).oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let store = InMemoryStore::new();
    let app = app(state(&store).with_rate_limiter(build_rate_limiter(2, 60)));

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
}
