//! Integration tests for the draft autosave endpoints:
//! - Save/load round trip under a key
//! - Overwrite semantics (one row per key)
//! - 404 on missing keys, idempotent clear

mod common;

use axum::{body, http::Method, response::Response};
use common::TestApp;
use serde_json::{json, Value};

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

#[tokio::test]
async fn test_draft_save_and_load_round_trip() {
    let app = TestApp::new().await;
    let payload = json!({
        "customer": {"name": "Mona Lotfy", "phone_number": "01233445566"},
        "work_types": ["kitchen", "walls"],
        "measurements": [{"material_name": "Counter slab", "quantity": "4"}]
    });

    let response = app
        .request(
            Method::PUT,
            "/api/v1/drafts/workOrderDraft",
            Some(payload.clone()),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["draft_key"], "workOrderDraft");
    assert_eq!(body["data"]["payload"], payload);
    assert!(body["data"]["updated_at"].is_string());

    let response = app
        .request(Method::GET, "/api/v1/drafts/workOrderDraft", None)
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["payload"], payload);
}

#[tokio::test]
async fn test_draft_save_overwrites_previous_payload() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/drafts/saleDraft",
            Some(json!({"step": 1})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(
            Method::PUT,
            "/api/v1/drafts/saleDraft",
            Some(json!({"step": 2, "notes": "revised"})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(Method::GET, "/api/v1/drafts/saleDraft", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["payload"], json!({"step": 2, "notes": "revised"}));
}

#[tokio::test]
async fn test_draft_missing_key_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/drafts/nothing-here", None)
        .await;
    assert_eq!(response.status(), 404);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("nothing-here"));
}

#[tokio::test]
async fn test_draft_clear_is_idempotent() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/v1/drafts/measureDraft",
            Some(json!({"unit": "m2"})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(Method::DELETE, "/api/v1/drafts/measureDraft", None)
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(Method::GET, "/api/v1/drafts/measureDraft", None)
        .await;
    assert_eq!(response.status(), 404);

    // Clearing a draft that is already gone still succeeds
    let response = app
        .request(Method::DELETE, "/api/v1/drafts/measureDraft", None)
        .await;
    assert_eq!(response.status(), 204);
}
