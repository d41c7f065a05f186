//! Integration tests for the customer API:
//! - Create / fetch / update / delete round trips
//! - Egyptian mobile number validation
//! - Paginated listing and the search short-circuit
//! - Per-customer order listing and (name, phone) dedup through the order flow

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
async fn test_customer_create_and_fetch() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Mona Hassan",
        "phone_number": "01012345678",
        "company": "Hassan Interiors",
        "address": "4 Marble Lane, Cairo"
    });
    let create = app
        .request(Method::POST, "/api/v1/customers", Some(payload))
        .await;
    assert_eq!(create.status(), 201);

    let created = response_json(create).await;
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_i64().expect("customer id");
    assert_eq!(created["data"]["name"], "Mona Hassan");
    assert_eq!(created["data"]["phone_number"], "01012345678");
    // Balances start at zero and are maintained by bookkeeping updates
    assert_eq!(created["data"]["paid_total"], "0");
    assert_eq!(created["data"]["to_be_paid"], "0");

    let fetch = app
        .request(Method::GET, &format!("/api/v1/customers/{}", id), None)
        .await;
    assert_eq!(fetch.status(), 200);
    let fetched = response_json(fetch).await;
    assert_eq!(fetched["data"]["company"], "Hassan Interiors");
}

#[tokio::test]
async fn test_customer_create_rejects_bad_phone() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Typo Phone",
        "phone_number": "12345"
    });
    let response = app
        .request(Method::POST, "/api/v1/customers", Some(payload))
        .await;
    assert_eq!(response.status(), 400);

    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .expect("validation message")
        .contains("Phone"));
}

#[tokio::test]
async fn test_customer_update_is_partial() {
    let app = TestApp::new().await;

    let create = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({
                "name": "Karim Fawzy",
                "phone_number": "01198765432",
                "address": "Old address"
            })),
        )
        .await;
    let id = response_json(create).await["data"]["id"]
        .as_i64()
        .expect("customer id");

    let update = app
        .request(
            Method::PUT,
            &format!("/api/v1/customers/{}", id),
            Some(json!({ "address": "New showroom, Giza" })),
        )
        .await;
    assert_eq!(update.status(), 200);

    let updated = response_json(update).await;
    assert_eq!(updated["data"]["address"], "New showroom, Giza");
    assert_eq!(updated["data"]["name"], "Karim Fawzy");
    assert!(updated["data"]["updated_at"].is_string());
}

#[tokio::test]
async fn test_customer_delete_then_missing() {
    let app = TestApp::new().await;

    let create = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({
                "name": "Short Lived",
                "phone_number": "01055667788"
            })),
        )
        .await;
    let id = response_json(create).await["data"]["id"]
        .as_i64()
        .expect("customer id");

    let delete = app
        .request(Method::DELETE, &format!("/api/v1/customers/{}", id), None)
        .await;
    assert_eq!(delete.status(), 204);

    let fetch = app
        .request(Method::GET, &format!("/api/v1/customers/{}", id), None)
        .await;
    assert_eq!(fetch.status(), 404);

    // Deleting an already-deleted row reports not-found, not success
    let again = app
        .request(Method::DELETE, &format!("/api/v1/customers/{}", id), None)
        .await;
    assert_eq!(again.status(), 404);
}

#[tokio::test]
async fn test_customer_list_pagination() {
    let app = TestApp::new().await;

    for (name, phone) in [
        ("Page One", "01011111111"),
        ("Page Two", "01022222222"),
        ("Page Three", "01033333333"),
    ] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/customers",
                Some(json!({ "name": name, "phone_number": phone })),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    let first = app
        .request(Method::GET, "/api/v1/customers?page=1&limit=2", None)
        .await;
    assert_eq!(first.status(), 200);
    let first_body = response_json(first).await;
    assert_eq!(first_body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(first_body["data"]["total"], 3);
    assert_eq!(first_body["data"]["page"], 1);
    assert_eq!(first_body["data"]["limit"], 2);
    assert_eq!(first_body["data"]["total_pages"], 2);

    let second = app
        .request(Method::GET, "/api/v1/customers?page=2&limit=2", None)
        .await;
    let second_body = response_json(second).await;
    assert_eq!(second_body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(second_body["data"]["page"], 2);
}

#[tokio::test]
async fn test_customer_search_short_circuits_pagination() {
    let app = TestApp::new().await;

    for (name, phone) in [("Amr Quartz", "01044445555"), ("Laila Stone", "01266667777")] {
        app.request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": name, "phone_number": phone })),
        )
        .await;
    }

    // Name substring
    let by_name = app
        .request(Method::GET, "/api/v1/customers?search=Quartz", None)
        .await;
    assert_eq!(by_name.status(), 200);
    let by_name_body = response_json(by_name).await;
    let items = by_name_body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Amr Quartz");
    // The search path returns everything it matched on one page
    assert_eq!(by_name_body["data"]["page"], 1);
    assert_eq!(by_name_body["data"]["total_pages"], 1);

    // Phone substring
    let by_phone = app
        .request(Method::GET, "/api/v1/customers?search=6666", None)
        .await;
    let by_phone_body = response_json(by_phone).await;
    let matched = by_phone_body["data"]["items"].as_array().unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["name"], "Laila Stone");

    // No match comes back as an empty page rather than an error
    let none = app
        .request(Method::GET, "/api/v1/customers?search=zzz", None)
        .await;
    let none_body = response_json(none).await;
    assert_eq!(none_body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(none_body["data"]["total"], 0);
}

#[tokio::test]
async fn test_customer_orders_and_name_phone_dedup() {
    let app = TestApp::new().await;

    // Two sales for the same person must reuse one customer row
    let first = app
        .seed_sale_order("Nour El Din", "01277788899", &["kitchen"])
        .await;
    let second = app
        .seed_sale_order("Nour El Din", "01277788899", &["walls"])
        .await;

    let customer_id = first["customer_id"].as_i64().expect("customer id");
    assert_eq!(second["customer_id"].as_i64(), Some(customer_id));

    let orders = app
        .request(
            Method::GET,
            &format!("/api/v1/customers/{}/orders", customer_id),
            None,
        )
        .await;
    assert_eq!(orders.status(), 200);
    let orders_body = response_json(orders).await;
    assert_eq!(orders_body["data"].as_array().unwrap().len(), 2);

    // Unknown customer is a 404, not an empty list
    let missing = app
        .request(Method::GET, "/api/v1/customers/424242/orders", None)
        .await;
    assert_eq!(missing.status(), 404);
}
