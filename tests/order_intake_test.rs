//! Integration tests for sale-order intake and measurements:
//! - Order creation with the generated work-type code
//! - Validation failures (no work types, bad phone)
//! - Partial updates and paginated listing
//! - Measurement CRUD with derived line totals
//! - Order deletion removing its measurement lines

mod common;

use std::str::FromStr;

use axum::{body, http::Method, response::Response};
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};
use stoneworks_api::entities::measurement;

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

fn as_decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).expect("parse decimal")
}

#[tokio::test]
async fn test_order_create_generates_sorted_code() {
    let app = TestApp::new().await;

    // Tag order in the request must not influence the code
    let order = app
        .seed_sale_order("Hany Mostafa", "01012340001", &["walls", "kitchen"])
        .await;

    let id = order["id"].as_i64().expect("order id");
    assert_eq!(order["code"], format!("KW-{}", id));
    assert_eq!(order["order_status"], "sale");
    assert_eq!(order["customer_name"], "Hany Mostafa");
    assert_eq!(as_decimal(&order["order_price"]), dec!(15000));

    let work_types = order["work_types"].as_array().expect("work types array");
    assert_eq!(work_types.len(), 2);
}

#[tokio::test]
async fn test_order_measurements_inserted_with_line_totals() {
    let app = TestApp::new().await;

    let order = app
        .seed_sale_order("Dina Samir", "01012340002", &["floor"])
        .await;
    let id = order["id"].as_i64().expect("order id");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}/measurements", id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    let rows = body["data"].as_array().expect("measurement rows");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["material_name"], "Carrara slab");
    assert_eq!(as_decimal(&rows[0]["total_cost"]), dec!(5000));
    assert_eq!(rows[1]["material_name"], "Edge profile");
    assert_eq!(as_decimal(&rows[1]["total_cost"]), dec!(1200));
}

#[tokio::test]
async fn test_order_create_requires_a_work_type() {
    let app = TestApp::new().await;

    let payload = json!({
        "customer": { "name": "No Types", "phone_number": "01012340003" },
        "work_types": [],
        "order_price": "500"
    });
    let response = app
        .request(Method::POST, "/api/v1/orders", Some(payload))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_order_create_validates_nested_customer() {
    let app = TestApp::new().await;

    let payload = json!({
        "customer": { "name": "Bad Phone", "phone_number": "0000" },
        "work_types": ["kitchen"],
        "order_price": "500"
    });
    let response = app
        .request(Method::POST, "/api/v1/orders", Some(payload))
        .await;
    assert_eq!(response.status(), 400);

    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .expect("validation message")
        .contains("Phone"));
}

#[tokio::test]
async fn test_order_update_is_partial_and_keeps_code() {
    let app = TestApp::new().await;

    let order = app
        .seed_sale_order("Samy Adel", "01012340004", &["kitchen"])
        .await;
    let id = order["id"].as_i64().expect("order id");
    let code = order["code"].as_str().expect("order code").to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{}", id),
            Some(json!({
                "company": "Adel Kitchens",
                "order_price": "18000"
            })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let updated = response_json(response).await;
    assert_eq!(updated["data"]["company"], "Adel Kitchens");
    assert_eq!(as_decimal(&updated["data"]["order_price"]), dec!(18000));
    // The code is minted once at intake and never rewritten
    assert_eq!(updated["data"]["code"], code);
    assert_eq!(updated["data"]["customer_name"], "Samy Adel");
}

#[tokio::test]
async fn test_order_listing_and_missing_order() {
    let app = TestApp::new().await;

    app.seed_sale_order("List One", "01012340005", &["kitchen"])
        .await;
    app.seed_sale_order("List Two", "01012340006", &["floor"])
        .await;

    let list = app
        .request(Method::GET, "/api/v1/orders?page=1&limit=10", None)
        .await;
    assert_eq!(list.status(), 200);
    let list_body = response_json(list).await;
    assert_eq!(list_body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(list_body["data"]["total"], 2);

    let missing = app.request(Method::GET, "/api/v1/orders/999999", None).await;
    assert_eq!(missing.status(), 404);

    let missing_rows = app
        .request(Method::GET, "/api/v1/orders/999999/measurements", None)
        .await;
    assert_eq!(missing_rows.status(), 404);
}

#[tokio::test]
async fn test_measurement_create_update_delete() {
    let app = TestApp::new().await;

    let order = app
        .seed_sale_order("Measure Me", "01012340007", &["other"])
        .await;
    let order_id = order["id"].as_i64().expect("order id");

    // Create one more line on the existing order
    let create = app
        .request(
            Method::POST,
            "/api/v1/measurements",
            Some(json!({
                "order_id": order_id,
                "material_name": "Backsplash",
                "material_type": "quartz",
                "unit": "m2",
                "quantity": "3",
                "cost": "250"
            })),
        )
        .await;
    assert_eq!(create.status(), 201);
    let created = response_json(create).await;
    let measurement_id = created["data"]["id"].as_i64().expect("measurement id");
    assert_eq!(as_decimal(&created["data"]["total_cost"]), dec!(750));

    // Changing only the quantity recomputes the total against the stored cost
    let update = app
        .request(
            Method::PUT,
            &format!("/api/v1/measurements/{}", measurement_id),
            Some(json!({ "quantity": "4" })),
        )
        .await;
    assert_eq!(update.status(), 200);
    let updated = response_json(update).await;
    assert_eq!(as_decimal(&updated["data"]["total_cost"]), dec!(1000));
    assert_eq!(updated["data"]["material_name"], "Backsplash");

    let delete = app
        .request(
            Method::DELETE,
            &format!("/api/v1/measurements/{}", measurement_id),
            None,
        )
        .await;
    assert_eq!(delete.status(), 204);

    let update_missing = app
        .request(
            Method::PUT,
            &format!("/api/v1/measurements/{}", measurement_id),
            Some(json!({ "quantity": "5" })),
        )
        .await;
    assert_eq!(update_missing.status(), 404);
}

#[tokio::test]
async fn test_order_delete_removes_measurements() {
    let app = TestApp::new().await;

    let order = app
        .seed_sale_order("Gone Soon", "01012340008", &["walls"])
        .await;
    let id = order["id"].as_i64().expect("order id");

    let delete = app
        .request(Method::DELETE, &format!("/api/v1/orders/{}", id), None)
        .await;
    assert_eq!(delete.status(), 204);

    let fetch = app
        .request(Method::GET, &format!("/api/v1/orders/{}", id), None)
        .await;
    assert_eq!(fetch.status(), 404);

    let leftover = measurement::Entity::find()
        .filter(measurement::Column::OrderId.eq(id))
        .count(&*app.state.db)
        .await
        .expect("count measurements");
    assert_eq!(leftover, 0);
}
