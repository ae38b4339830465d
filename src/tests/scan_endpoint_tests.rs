use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    build_router,
    models::scan::{DenialReason, ScanStatus},
    state::AppState,
    store::memory::InMemoryStore,
};

const API_KEY: &str = "dev-abc";

fn device_id() -> Uuid {
    Uuid::from_u128(0xD1)
}

fn area_id() -> Uuid {
    Uuid::from_u128(0xA1)
}

fn member_id() -> Uuid {
    Uuid::from_u128(0x31)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Member with one membership running from last month to next month.
fn active_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_device(API_KEY, device_id(), area_id())
        .with_member(member_id(), "Alex", "Martin")
        .with_membership(
            member_id(),
            Uuid::from_u128(1),
            "mensuel",
            today() - Duration::days(30),
            today() + Duration::days(30),
        )
}

fn scan_request(api_key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/scan")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn member_scan_body() -> String {
    json!({
        "qr_token": member_id().to_string(),
        "device_id": device_id().to_string(),
    })
    .to_string()
}

async fn send(store: Arc<InMemoryStore>, request: Request<Body>) -> (StatusCode, Value) {
    let app = build_router(AppState::new(store));
    let response = app.oneshot(request).await.unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_granted_scan() {
    let store = Arc::new(active_store());

    let (status, body) = send(store.clone(), scan_request(Some(API_KEY), &member_scan_body())).await;

    assert_eq!(status, StatusCode::OK);
    let end_date = (today() + Duration::days(30)).format("%Y-%m-%d").to_string();
    assert_eq!(
        body,
        json!({
            "allowed": true,
            "member": { "first_name": "Alex", "last_name": "Martin" },
            "membership": { "type": "mensuel", "end_date": end_date },
        })
    );

    let scans = store.scans();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].status, ScanStatus::Allowed);
    assert_eq!(scans[0].member_id, Some(member_id()));
    assert_eq!(scans[0].device_id, device_id());
    assert_eq!(scans[0].gym_area_id, area_id());
    assert!(store.last_seen(device_id()).is_some());
}

#[tokio::test]
async fn test_scan_alias_route() {
    let store = Arc::new(active_store());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/scan")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(member_scan_body()))
        .unwrap();

    let (status, body) = send(store, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn test_body_without_content_type_accepted() {
    let store = Arc::new(active_store());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/scan")
        .header("x-api-key", API_KEY)
        .body(Body::from(member_scan_body()))
        .unwrap();

    let (status, body) = send(store.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(store.scans().len(), 1);
}

#[tokio::test]
async fn test_body_with_text_plain_content_type_accepted() {
    let store = Arc::new(active_store());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/scan")
        .header("content-type", "text/plain")
        .header("x-api-key", API_KEY)
        .body(Body::from(member_scan_body()))
        .unwrap();

    let (status, body) = send(store.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(store.scans().len(), 1);
    assert_eq!(store.scans()[0].status, ScanStatus::Allowed);
}

#[tokio::test]
async fn test_expired_membership_is_200_denial() {
    let store = Arc::new(
        InMemoryStore::new()
            .with_device(API_KEY, device_id(), area_id())
            .with_member(member_id(), "Alex", "Martin")
            .with_membership(
                member_id(),
                Uuid::from_u128(1),
                "mensuel",
                today() - Duration::days(60),
                today() - Duration::days(1),
            ),
    );

    let (status, body) = send(store.clone(), scan_request(Some(API_KEY), &member_scan_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "allowed": false, "reason": "membership_expired" }));
    assert_eq!(store.scans()[0].reason, Some(DenialReason::MembershipExpired));
}

#[tokio::test]
async fn test_unknown_member_is_200_denial() {
    let store = Arc::new(active_store());
    let body = json!({
        "qr_token": Uuid::from_u128(0x99).to_string(),
        "device_id": device_id().to_string(),
    })
    .to_string();

    let (status, body) = send(store.clone(), scan_request(Some(API_KEY), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "allowed": false, "reason": "member_not_found" }));
    assert_eq!(store.scans()[0].member_id, None);
}

#[tokio::test]
async fn test_missing_fields_checked_before_credential() {
    let cases = [
        json!({ "device_id": device_id().to_string() }),
        json!({ "qr_token": member_id().to_string() }),
        json!({ "qr_token": "", "device_id": device_id().to_string() }),
    ];

    for case in cases {
        let store = Arc::new(active_store());
        let (status, body) = send(store.clone(), scan_request(None, &case.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "allowed": false, "reason": "missing_required_fields" }));
        assert!(store.scans().is_empty());
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let store = Arc::new(active_store());

    let (status, body) = send(store.clone(), scan_request(Some(API_KEY), "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "missing_required_fields");
    assert!(store.scans().is_empty());
}

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let store = Arc::new(active_store());

    let (status, body) = send(store.clone(), scan_request(None, &member_scan_body())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "allowed": false, "reason": "unauthorized_device" }));
    assert!(store.last_seen(device_id()).is_none());
    assert!(store.scans().is_empty());
}

#[tokio::test]
async fn test_unknown_credential_is_invalid_device() {
    let store = Arc::new(active_store());

    let (status, body) = send(store.clone(), scan_request(Some("dev-xyz"), &member_scan_body())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "allowed": false, "reason": "invalid_device" }));
    assert!(store.last_seen(device_id()).is_none());
    assert!(store.scans().is_empty());
}

#[tokio::test]
async fn test_device_mismatch_is_forbidden() {
    let store = Arc::new(active_store());
    let body = json!({
        "qr_token": member_id().to_string(),
        "device_id": Uuid::from_u128(0xD2).to_string(),
    })
    .to_string();

    let (status, body) = send(store.clone(), scan_request(Some(API_KEY), &body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "allowed": false, "reason": "device_mismatch" }));
    assert!(store.scans().is_empty());
}

#[tokio::test]
async fn test_store_fault_is_internal_error() {
    let store = Arc::new(active_store().failing_member_lookup());

    let (status, body) = send(store, scan_request(Some(API_KEY), &member_scan_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "allowed": false, "reason": "internal_error" }));
}

#[tokio::test]
async fn test_health_check() {
    let store = Arc::new(active_store());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(store, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = build_router(AppState::new(Arc::new(active_store())));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/scan")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-api-key,content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
