use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stoneworks API",
        version = "1.0.0",
        description = r#"
# Stoneworks Shop Management API

Order book and production scheduling for a stone fabrication shop: customers,
sale orders with material measurements, conversion into staged work orders, and
a week-by-week crew assignment calendar.

## Features

- **Customers**: Directory with running paid/outstanding balances and per-customer order history
- **Orders**: Sale orders tagged by work type, with shop codes derived from those tags
- **Measurements**: Material lines per order with derived line totals
- **Work Orders**: Production details carrying a fixed six-stage pipeline, created directly or by converting a sale order
- **Scheduling**: Date-ranged calendar of crew assignments with server-side order/employee/status filters
- **Drafts**: Keyed JSON scratchpads so half-filled forms survive a reload

## Error Handling

The API uses a consistent error body with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "Order 42 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 20)
- `search`: Search term for filtering results
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "customers", description = "Customer directory endpoints"),
        (name = "orders", description = "Sale order endpoints"),
        (name = "measurements", description = "Material measurement endpoints"),
        (name = "work_orders", description = "Work order and stage endpoints"),
        (name = "scheduling", description = "Calendar and crew assignment endpoints"),
        (name = "drafts", description = "Form draft endpoints")
    ),
    paths(
        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::customers::get_customer_orders,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::get_order_measurements,

        // Measurements
        crate::handlers::measurements::create_measurement,
        crate::handlers::measurements::update_measurement,
        crate::handlers::measurements::delete_measurement,

        // Work orders
        crate::handlers::work_orders::list_work_orders,
        crate::handlers::work_orders::create_work_order,
        crate::handlers::work_orders::get_work_order,
        crate::handlers::work_orders::update_work_order,
        crate::handlers::work_orders::get_work_order_stages,
        crate::handlers::work_orders::update_stage,
        crate::handlers::work_orders::attach_work_order_image,
        crate::handlers::work_orders::convert_to_work_order,

        // Scheduling
        crate::handlers::scheduling::calendar,
        crate::handlers::scheduling::available_orders,
        crate::handlers::scheduling::working_orders,
        crate::handlers::scheduling::available_employees,
        crate::handlers::scheduling::create_assignment,
        crate::handlers::scheduling::update_assignment,
        crate::handlers::scheduling::delete_assignment,

        // Drafts
        crate::handlers::drafts::load_draft,
        crate::handlers::drafts::save_draft,
        crate::handlers::drafts::clear_draft,

        // Health endpoints intentionally omitted from OpenAPI paths
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Entities
            crate::entities::customer::Model,
            crate::entities::order::Model,
            crate::entities::order::WorkTypes,
            crate::entities::measurement::Model,
            crate::entities::order_detail::Model,
            crate::entities::order_stage::Model,
            crate::entities::order_stage::StageStatus,
            crate::entities::order_stage_assignment::Model,
            crate::entities::employee::Model,
            crate::entities::draft::Model,

            // Customer types
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,

            // Order types
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,

            // Measurement types
            crate::services::measurements::MeasurementInput,
            crate::services::measurements::CreateMeasurementRequest,
            crate::services::measurements::UpdateMeasurementRequest,

            // Work order types
            crate::services::work_orders::CreateWorkOrderRequest,
            crate::services::work_orders::UpdateWorkOrderRequest,
            crate::services::work_orders::UpdateStageRequest,
            crate::services::work_orders::AttachImageRequest,
            crate::services::work_orders::ConvertToWorkOrderRequest,
            crate::services::work_orders::ConversionTotals,
            crate::services::work_orders::ConvertedWorkOrder,

            // Scheduling types
            crate::services::scheduling::CalendarData,
            crate::services::scheduling::NormalizedOrder,
            crate::services::scheduling::AssignmentFilters,
            crate::services::scheduling::NewAssignment,
            crate::services::scheduling::AssignmentChanges,
            crate::services::scheduling::DetailWithStages,
            crate::services::scheduling::OrderWithDetails,
            crate::handlers::scheduling::CalendarQuery,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
