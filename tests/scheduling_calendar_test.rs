//! Integration tests for the weekly scheduling calendar:
//! - Seeded employee roster
//! - Inclusive date-window fetch with normalized context collections
//! - Window parameter validation
//! - Server-side assignment filters (order, employee, status, conjunction)
//! - Assignment create/update/delete lifecycle

mod common;

use std::str::FromStr;

use axum::{body, http::Method, response::Response};
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

fn as_decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).expect("parse decimal")
}

/// Converts a fresh sale into a working order and returns its id plus the
/// ids of the six pipeline stages, in pipeline order.
async fn seed_working_order(app: &TestApp, name: &str, phone: &str) -> (i64, Vec<i64>) {
    let response = app
        .request(
            Method::POST,
            "/api/v1/work-orders/convert",
            Some(json!({
                "customer": {
                    "name": name,
                    "phone_number": phone,
                    "address": "3 Basalt Lane"
                },
                "assigned_to": "Crew B",
                "work_types": ["kitchen"],
                "price": "9000",
                "measurements": [
                    {
                        "material_name": "Counter slab",
                        "material_type": "quartz",
                        "unit": "m2",
                        "quantity": "6",
                        "cost": "300"
                    }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    let order_id = body["data"]["order"]["id"].as_i64().expect("order id");
    let detail_id = body["data"]["detail"]["detail_id"]
        .as_i64()
        .expect("detail id");

    let stages_response = app
        .request(
            Method::GET,
            &format!("/api/v1/work-orders/{}/stages", detail_id),
            None,
        )
        .await;
    assert_eq!(stages_response.status(), 200);
    let stages_body = response_json(stages_response).await;
    let stage_ids = stages_body["data"]
        .as_array()
        .expect("stage rows")
        .iter()
        .map(|stage| stage["id"].as_i64().expect("stage id"))
        .collect();

    (order_id, stage_ids)
}

async fn create_assignment(app: &TestApp, stage_id: i64, employee: &str, date: &str) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/scheduling/assignments",
            Some(json!({
                "order_stage_id": stage_id,
                "employee_name": employee,
                "work_date": date
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    body["data"]["id"].as_i64().expect("assignment id")
}

#[tokio::test]
async fn test_employee_roster_is_seeded() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/scheduling/employees", None)
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    let employees = body["data"].as_array().expect("employee rows");
    assert_eq!(employees.len(), 10);
    assert_eq!(employees[0]["name"], "John Doe");
    assert_eq!(employees[0]["role"], "Technician");
    assert_eq!(employees[9]["name"], "Omar Khaled");
    assert_eq!(employees[9]["role"], "Installer");
}

#[tokio::test]
async fn test_calendar_window_is_inclusive() {
    let app = TestApp::new().await;
    let (_order_id, stage_ids) = seed_working_order(&app, "Noura Adel", "01012345678").await;

    // Both boundary days, one interior day, one day past the window
    create_assignment(&app, stage_ids[0], "John Doe", "2026-08-24").await;
    create_assignment(&app, stage_ids[1], "Jane Smith", "2026-08-26").await;
    create_assignment(&app, stage_ids[2], "Mike Johnson", "2026-08-30").await;
    create_assignment(&app, stage_ids[3], "Sara Wilson", "2026-08-31").await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/scheduling/calendar?from=2026-08-24&to=2026-08-30",
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    let data = &body["data"];
    let dates: Vec<&str> = data["assignments"]
        .as_array()
        .expect("assignment rows")
        .iter()
        .map(|a| a["work_date"].as_str().expect("work date"))
        .collect();
    assert_eq!(dates, ["2026-08-24", "2026-08-26", "2026-08-30"]);

    // Context collections ride along: the stages behind the visible
    // assignments, and their orders flattened with details attached
    assert_eq!(data["stages"].as_array().expect("stage context").len(), 3);
    let orders = data["orders"].as_array().expect("order context");
    assert_eq!(orders.len(), 1);
    assert!(orders[0]["code"].as_str().expect("order code").ends_with(
        &format!("-{}", orders[0]["id"].as_i64().expect("order id"))
    ));
    assert_eq!(
        orders[0]["order_details"]
            .as_array()
            .expect("flattened details")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_calendar_requires_a_window() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/scheduling/calendar", None)
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request(
            Method::GET,
            "/api/v1/scheduling/calendar?from=2026-08-24",
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_calendar_filters_narrow_assignments_only() {
    let app = TestApp::new().await;
    let (order_a, stages_a) = seed_working_order(&app, "Hassan Farid", "01122334455").await;
    let (_order_b, stages_b) = seed_working_order(&app, "Mona Lotfy", "01233445566").await;

    // Put the first stage of order A in progress so status filters can bite
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stages/{}", stages_a[0]),
            Some(json!({"status": "in_progress"})),
        )
        .await;
    assert_eq!(response.status(), 200);

    create_assignment(&app, stages_a[0], "John Doe", "2026-09-01").await;
    create_assignment(&app, stages_b[0], "Jane Smith", "2026-09-02").await;

    let window = "from=2026-09-01&to=2026-09-07";

    // Order filter: only the assignment on order A survives, while the
    // stage and order context stays whole for rendering
    let body = response_json(
        app.request(
            Method::GET,
            &format!(
                "/api/v1/scheduling/calendar?{}&order_id={}",
                window, order_a
            ),
            None,
        )
        .await,
    )
    .await;
    let assignments = body["data"]["assignments"].as_array().expect("assignments");
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["employee_name"], "John Doe");
    assert_eq!(body["data"]["stages"].as_array().expect("stages").len(), 2);
    assert_eq!(body["data"]["orders"].as_array().expect("orders").len(), 2);

    // Employee filter, exact name match
    let body = response_json(
        app.request(
            Method::GET,
            &format!(
                "/api/v1/scheduling/calendar?{}&employees=Jane%20Smith",
                window
            ),
            None,
        )
        .await,
    )
    .await;
    let assignments = body["data"]["assignments"].as_array().expect("assignments");
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["employee_name"], "Jane Smith");

    // Status filter follows the assignment's stage
    let body = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/scheduling/calendar?{}&statuses=in_progress", window),
            None,
        )
        .await,
    )
    .await;
    let assignments = body["data"]["assignments"].as_array().expect("assignments");
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["employee_name"], "John Doe");

    // Filters are a conjunction: John Doe works no not_started stage
    let body = response_json(
        app.request(
            Method::GET,
            &format!(
                "/api/v1/scheduling/calendar?{}&employees=John%20Doe&statuses=not_started",
                window
            ),
            None,
        )
        .await,
    )
    .await;
    assert!(body["data"]["assignments"]
        .as_array()
        .expect("assignments")
        .is_empty());
}

#[tokio::test]
async fn test_order_pickers_list_only_working_orders() {
    let app = TestApp::new().await;

    // One order still in the sale book, one converted to a working order
    app.seed_sale_order("Nadia Fouad", "01055667788", &["walls"])
        .await;
    let (working_id, _stages) = seed_working_order(&app, "Tarek Helmy", "01299887766").await;

    let body = response_json(
        app.request(Method::GET, "/api/v1/scheduling/orders/available", None)
            .await,
    )
    .await;
    let available = body["data"].as_array().expect("available orders");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0]["id"].as_i64(), Some(working_id));
    assert_eq!(available[0]["order_status"], "working");

    let body = response_json(
        app.request(Method::GET, "/api/v1/scheduling/orders/working", None)
            .await,
    )
    .await;
    let working = body["data"].as_array().expect("working orders");
    assert_eq!(working.len(), 1);
    assert_eq!(working[0]["id"].as_i64(), Some(working_id));
    assert_eq!(
        working[0]["order_details"]
            .as_array()
            .expect("details ride along")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_assignment_create_defaults_and_echoes_fields() {
    let app = TestApp::new().await;
    let (_order_id, stage_ids) = seed_working_order(&app, "Yara Nabil", "01511112222").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/scheduling/assignments",
            Some(json!({
                "order_stage_id": stage_ids[1],
                "employee_name": "Carlos Rodriguez",
                "work_date": "2026-09-03",
                "note": "Bring the wet saw",
                "employee_rate": "350"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["order_stage_id"].as_i64(), Some(stage_ids[1]));
    assert_eq!(data["employee_name"], "Carlos Rodriguez");
    assert_eq!(data["work_date"], "2026-09-03");
    assert_eq!(data["is_done"], false);
    assert_eq!(data["note"], "Bring the wet saw");
    assert_eq!(as_decimal(&data["employee_rate"]), dec!(350));
    assert!(data["created_at"].is_string());
}

#[tokio::test]
async fn test_assignment_update_is_partial() {
    let app = TestApp::new().await;
    let (_order_id, stage_ids) = seed_working_order(&app, "Karim Osman", "01098765432").await;
    let id = create_assignment(&app, stage_ids[0], "Ahmed Mohamed", "2026-09-04").await;

    // An empty change set reads back the current row untouched
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/scheduling/assignments/{}", id),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["employee_name"], "Ahmed Mohamed");
    assert_eq!(body["data"]["is_done"], false);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/scheduling/assignments/{}", id),
            Some(json!({"is_done": true, "note": "Wrapped up early"})),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_done"], true);
    assert_eq!(body["data"]["note"], "Wrapped up early");
    assert_eq!(body["data"]["employee_name"], "Ahmed Mohamed");
    assert_eq!(body["data"]["work_date"], "2026-09-04");

    let response = app
        .request(
            Method::PUT,
            "/api/v1/scheduling/assignments/999999",
            Some(json!({"is_done": true})),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_assignment_delete_then_missing() {
    let app = TestApp::new().await;
    let (_order_id, stage_ids) = seed_working_order(&app, "Laila Samir", "01256789012").await;
    let id = create_assignment(&app, stage_ids[0], "Fatima Ali", "2026-09-05").await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/scheduling/assignments/{}", id),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/scheduling/assignments/{}", id),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_assignment_requires_employee_name() {
    let app = TestApp::new().await;
    let (_order_id, stage_ids) = seed_working_order(&app, "Sami Adel", "01187654321").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/scheduling/assignments",
            Some(json!({
                "order_stage_id": stage_ids[0],
                "employee_name": "",
                "work_date": "2026-09-06"
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}
