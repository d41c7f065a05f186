pub mod customers;
pub mod drafts;
pub mod measurements;
pub mod orders;
pub mod scheduling;
pub mod work_orders;

use std::sync::Arc;

use slog::Logger;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::logging::component_logger;
use crate::services::drafts::{DbDraftStore, DraftService, DraftStore};
use crate::services::{
    CustomerService, MeasurementService, OrderService, SchedulingService, WorkOrderService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
    pub measurements: Arc<MeasurementService>,
    pub work_orders: Arc<WorkOrderService>,
    pub scheduling: Arc<SchedulingService>,
    pub drafts: Arc<DraftService>,
}

impl AppServices {
    /// Builds the service container, one component logger per service.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        base_logger: Logger,
    ) -> Self {
        let customers = Arc::new(CustomerService::new(
            db_pool.clone(),
            event_sender.clone(),
            component_logger(&base_logger, "customer_service"),
        ));
        let orders = Arc::new(OrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            component_logger(&base_logger, "order_service"),
        ));
        let measurements = Arc::new(MeasurementService::new(
            db_pool.clone(),
            event_sender.clone(),
            component_logger(&base_logger, "measurement_service"),
        ));
        let work_orders = Arc::new(WorkOrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            component_logger(&base_logger, "work_order_service"),
        ));
        let scheduling = Arc::new(SchedulingService::new(
            db_pool.clone(),
            event_sender.clone(),
            component_logger(&base_logger, "scheduling_service"),
        ));
        let draft_store: Arc<dyn DraftStore> = Arc::new(DbDraftStore::new(db_pool));
        let drafts = Arc::new(DraftService::new(
            draft_store,
            event_sender,
            component_logger(&base_logger, "draft_service"),
        ));

        Self {
            customers,
            orders,
            measurements,
            work_orders,
            scheduling,
            drafts,
        }
    }
}
