//! HTTP tests for the OTP endpoints, run against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use actix_web::{http::StatusCode, test, web};
use serde_json::{json, Value};

use otp_api::{create_app, AppState};
use otp_core::repositories::InMemoryOtpRepository;
use otp_core::services::otp::{OtpService, OtpServiceConfig};
use otp_shared::ServerConfig;

/// Helper function to create test application state
fn create_test_app_state() -> (web::Data<AppState<InMemoryOtpRepository>>, Arc<InMemoryOtpRepository>) {
    let repository = Arc::new(InMemoryOtpRepository::new());
    let service = OtpService::new(repository.clone(), OtpServiceConfig::default()).unwrap();
    (web::Data::new(AppState::new(Arc::new(service))), repository)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(create_app($state.clone(), &ServerConfig::default())).await
    };
}

macro_rules! create_record {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/otp")
            .set_json(json!({ "email": $email, "otp": "123456", "ttl": 300 }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_create_returns_created_record() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let body = create_record!(app, "a@x.com");

    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["otp"], "123456");
    assert_eq!(body["ttl"], 300);
    assert_eq!(body["refreshToken"].as_str().unwrap().len(), 43);
}

#[actix_web::test]
async fn test_create_without_ttl_uses_default() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp")
        .set_json(json!({ "email": "a@x.com", "otp": "123456" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ttl"], 300);
}

#[actix_web::test]
async fn test_create_rejects_invalid_input() {
    let (state, repository) = create_test_app_state();
    let app = init_app!(state);

    let cases = vec![
        json!({ "email": "not-an-email", "otp": "123456", "ttl": 300 }),
        json!({ "email": "a@x.com", "otp": "", "ttl": 300 }),
        json!({ "email": "a@x.com", "otp": "123456", "ttl": 0 }),
        json!({ "email": "a@x.com", "otp": "123456", "ttl": 86401 }),
    ];

    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/otp")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
    assert!(repository.is_empty().await);
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_read_by_id_and_email() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);
    let created = create_record!(app, "a@x.com");
    let id = created["id"].as_str().unwrap();

    for key in [id, "a@x.com"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/otp/{}", key))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, created);
    }
}

#[actix_web::test]
async fn test_read_unknown_is_not_found() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/otp/nobody@x.com")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_delete_returns_snapshot_then_not_found() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);
    let created = create_record!(app, "a@x.com");
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/otp/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, created);

    for key in [id, "a@x.com"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/otp/{}", key))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/otp/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_refresh_rotates_token_and_rejects_replay() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);
    let created = create_record!(app, "a@x.com");
    let old_token = created["refreshToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/refresh")
        .set_json(json!({ "refreshToken": old_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refreshed: Value = test::read_body_json(resp).await;
    assert_eq!(refreshed["id"], created["id"]);
    assert_ne!(refreshed["refreshToken"], created["refreshToken"]);

    // Replay
    let req = test::TestRequest::post()
        .uri("/api/v1/otp/refresh")
        .set_json(json!({ "refreshToken": old_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The new token works
    let req = test::TestRequest::post()
        .uri("/api/v1/otp/refresh")
        .set_json(json!({ "refreshToken": refreshed["refreshToken"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_refresh_rejects_empty_and_unknown_tokens() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/refresh")
        .set_json(json!({ "refreshToken": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/otp/refresh")
        .set_json(json!({ "refreshToken": "nonexistent-token" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_expired_record_is_not_found() {
    let (state, repository) = create_test_app_state();
    let app = init_app!(state);
    let created = create_record!(app, "a@x.com");

    repository.advance(Duration::from_secs(301)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/otp/{}", created["id"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_storage_failure_is_service_unavailable() {
    let (state, repository) = create_test_app_state();
    let app = init_app!(state);
    let created = create_record!(app, "a@x.com");

    repository.set_unavailable(true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/otp/{}", created["id"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "STORAGE_UNAVAILABLE");

    let req = test::TestRequest::post()
        .uri("/api/v1/otp")
        .set_json(json!({ "email": "b@x.com", "otp": "123456", "ttl": 300 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_health_reports_store_state() {
    let (state, repository) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["store"], "up");

    repository.set_unavailable(true);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "degraded");
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let (state, _) = create_test_app_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v2/otp").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
