use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use serde_json::{json, Value};
use stoneworks_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    health, AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up the full router over a throwaway SQLite
/// database. Each instance gets its own temp directory so test binaries can
/// run in parallel without sharing state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("stoneworks_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let base_logger =
            stoneworks_api::logging::setup_logger(stoneworks_api::logging::LoggerConfig::default());
        let services = AppServices::new(
            db_arc.clone(),
            Some(Arc::new(event_sender.clone())),
            base_logger,
        );

        let state = AppState {
            db: db_arc.clone(),
            config: cfg,
            event_sender,
            services,
        };

        // Same wiring shape as main: the API router takes the shared state,
        // the health router carries its own.
        let router = Router::new()
            .nest("/api/v1", stoneworks_api::api_v1_routes())
            .with_state(state.clone())
            .nest("/health", health::health_routes_with_state(db_arc));

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a sale order through the API: one customer, two measurement
    /// lines (12.5 m2 at 400 plus 8 m at 150, cost basis 6200). Returns the
    /// created order JSON.
    #[allow(dead_code)]
    pub async fn seed_sale_order(&self, name: &str, phone: &str, work_types: &[&str]) -> Value {
        let payload = json!({
            "customer": {
                "name": name,
                "phone_number": phone,
                "address": "12 Quarry Road"
            },
            "work_types": work_types,
            "order_price": "15000",
            "measurements": [
                {
                    "material_name": "Carrara slab",
                    "material_type": "marble",
                    "unit": "m2",
                    "quantity": "12.5",
                    "cost": "400"
                },
                {
                    "material_name": "Edge profile",
                    "material_type": "granite",
                    "unit": "m",
                    "quantity": "8",
                    "cost": "150"
                }
            ]
        });

        let response = self
            .request(Method::POST, "/api/v1/orders", Some(payload))
            .await;
        assert_eq!(response.status(), 201, "seed order should be created");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("seed order body");
        let body: Value = serde_json::from_slice(&bytes).expect("seed order json");
        body["data"].clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
