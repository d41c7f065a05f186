use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::order::{self, WorkTypes};
use crate::entities::order_stage::{StageStatus, STAGE_TEMPLATE};
use crate::entities::{customer, measurement, order_detail, order_stage};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::customers::{upsert_customer_record, CreateCustomerRequest, UpsertOutcome};
use crate::services::measurements::{replace_measurement_rows, MeasurementInput};
use crate::services::orders::{insert_order_record, NewOrderRecord};
use crate::tracing::{log_error, ErrorKind};

/// `process_stage` a detail starts in when created on its own.
const PROCESS_STAGE_NOT_STARTED: &str = "not_started";
/// `process_stage` a detail starts in when created by conversion, matching the
/// first entry of the stage template.
const PROCESS_STAGE_PENDING: &str = "pending";
/// `created_by` stamp for orders the conversion flow creates itself.
const CONVERSION_AUTHOR: &str = "system";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderRequest {
    /// Order the new detail hangs off; must already exist.
    pub order_id: i64,
    #[validate(length(min = 1, message = "An assignee is required"))]
    pub assigned_to: String,
    pub due_date: Option<NaiveDate>,
    pub price: Decimal,
    pub notes: Option<String>,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderRequest {
    #[validate(length(min = 1, message = "Assignee cannot be blank"))]
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub img_url: Option<String>,
    pub process_stage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachImageRequest {
    /// Name of the uploaded file; turned into a placeholder URL until real
    /// storage exists.
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStageRequest {
    /// Must parse as a [`StageStatus`] when present.
    pub status: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_finish_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_finish_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Everything the conversion flow needs in one request. The customer is
/// resolved with the first of `order_id` (reuse that order's customer),
/// `customer_id`, or the inline `customer` block.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConvertToWorkOrderRequest {
    /// Existing sale order to move into production; `None` creates a fresh
    /// order already in the working state.
    pub order_id: Option<i64>,
    /// Existing customer to bill; ignored when `order_id` is set.
    pub customer_id: Option<i64>,
    /// Inline customer block, upserted by (name, phone) when neither id is
    /// given.
    #[validate]
    pub customer: Option<CreateCustomerRequest>,
    #[validate(length(min = 1, message = "An assignee is required"))]
    pub assigned_to: String,
    pub due_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "At least one work type is required"))]
    pub work_types: Vec<String>,
    pub price: Decimal,
    /// Replaces whatever measurements the order already has.
    #[validate]
    pub measurements: Vec<MeasurementInput>,
    pub notes: Option<String>,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionTotals {
    pub total_cost: Decimal,
    pub profit: Decimal,
    /// Whole-percent margin, 0 when the cost basis is zero.
    pub profit_margin: Decimal,
}

/// Conversion result: the order row now in the working state, its new
/// production detail, and the derived money figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertedWorkOrder {
    pub order: order::Model,
    pub detail: order_detail::Model,
    pub totals: ConversionTotals,
}

/// Derives profit and margin from the quoted price and the measurement cost
/// basis. The margin is a whole percentage rounded half away from zero.
pub fn compute_totals(price: Decimal, total_cost: Decimal) -> ConversionTotals {
    let profit = price - total_cost;
    let profit_margin = if total_cost.is_zero() {
        Decimal::ZERO
    } else {
        (profit / total_cost * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    };
    ConversionTotals {
        total_cost,
        profit,
        profit_margin,
    }
}

/// Stand-in URL until real image storage lands; keeps the `img_url` contract
/// alive for clients.
pub fn placeholder_image_url(file_name: &str) -> String {
    let label = file_name.trim().replace(' ', "+");
    format!("https://placehold.co/600x400?text={}", label)
}

/// Inserts the six-stage pipeline for one detail, every stage in its initial
/// status. Generic over the connection so both the transactional create path
/// and the conversion flow can use it.
pub async fn insert_stage_template<C: ConnectionTrait>(
    conn: &C,
    order_detail_id: i64,
) -> Result<Vec<order_stage::Model>, ServiceError> {
    let now = Utc::now();
    let mut stages = Vec::with_capacity(STAGE_TEMPLATE.len());
    for name in STAGE_TEMPLATE {
        let inserted = order_stage::ActiveModel {
            order_detail_id: Set(order_detail_id),
            stage_name: Set(name.to_string()),
            status: Set(StageStatus::initial().to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!(error = %e, order_detail_id, stage = name, "Failed to insert stage");
            ServiceError::DatabaseError(e)
        })?;
        stages.push(inserted);
    }
    Ok(stages)
}

/// All conversion preconditions, checked before anything is written.
fn validate_conversion_request(request: &ConvertToWorkOrderRequest) -> Result<(), ServiceError> {
    if request.measurements.is_empty() {
        return Err(ServiceError::ValidationError(
            "At least one measurement is required".to_string(),
        ));
    }
    for line in &request.measurements {
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Measurement '{}' must have a positive quantity",
                line.material_name
            )));
        }
        if line.cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Measurement '{}' cannot have a negative cost",
                line.material_name
            )));
        }
    }
    if !request.measurements.iter().any(|line| !line.unit.is_empty()) {
        return Err(ServiceError::ValidationError(
            "At least one measurement must specify a unit".to_string(),
        ));
    }
    if request.order_id.is_none() && request.customer_id.is_none() && request.customer.is_none() {
        return Err(ServiceError::ValidationError(
            "A customer is required: pass an order, a customer id, or a customer block"
                .to_string(),
        ));
    }
    Ok(())
}

/// Rows the conversion created so far, so a failed step can remove them.
/// Pre-existing rows (a reused order or customer) are never tracked here.
#[derive(Debug, Default)]
struct ConversionCleanup {
    customer_id: Option<i64>,
    order_id: Option<i64>,
    detail_id: Option<i64>,
}

impl ConversionCleanup {
    fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.order_id.is_none() && self.detail_id.is_none()
    }
}

/// Work-order CRUD, the production stage pipeline, and the sale-to-work-order
/// conversion flow.
#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl WorkOrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        logger: Logger,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Details, most recently touched first.
    #[instrument(skip(self))]
    pub async fn list_work_orders(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        let db = &*self.db_pool;
        order_detail::Entity::find()
            .order_by_desc(order_detail::Column::UpdatedDate)
            .order_by_desc(order_detail::Column::DetailId)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list work orders");
                ServiceError::DatabaseError(e)
            })
    }

    pub async fn count_work_orders(&self) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        order_detail::Entity::find().count(db).await.map_err(|e| {
            error!(error = %e, "Failed to count work orders");
            ServiceError::DatabaseError(e)
        })
    }

    #[instrument(skip(self))]
    pub async fn get_work_order(&self, detail_id: i64) -> Result<order_detail::Model, ServiceError> {
        let db = &*self.db_pool;
        order_detail::Entity::find_by_id(detail_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, detail_id, "Failed to fetch work order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {} not found", detail_id)))
    }

    /// Creates a detail plus its stage pipeline for an existing order, in one
    /// transaction. The cost basis is the sum of the order's measurements.
    #[instrument(skip(self, request), fields(order_id = request.order_id))]
    pub async fn create_work_order(
        &self,
        request: CreateWorkOrderRequest,
    ) -> Result<order_detail::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let order_row = order::Entity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = request.order_id, "Failed to load order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let total_cost: Decimal = measurement::Entity::find()
            .filter(measurement::Column::OrderId.eq(order_row.id))
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = order_row.id, "Failed to load measurements");
                ServiceError::DatabaseError(e)
            })?
            .iter()
            .map(|row| row.total_cost)
            .sum();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin transaction");
            ServiceError::DatabaseError(e)
        })?;

        let detail = order_detail::ActiveModel {
            order_id: Set(order_row.id),
            assigned_to: Set(Some(request.assigned_to.clone())),
            due_date: Set(request.due_date),
            price: Set(request.price),
            total_cost: Set(total_cost),
            notes: Set(request.notes.clone()),
            img_url: Set(request.img_url.clone()),
            process_stage: Set(Some(PROCESS_STAGE_NOT_STARTED.to_string())),
            updated_date: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = order_row.id, "Failed to insert work order detail");
            ServiceError::DatabaseError(e)
        })?;

        insert_stage_template(&txn, detail.detail_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit work order creation");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Work order created";
            "order_id" => order_row.id,
            "detail_id" => detail.detail_id,
        );
        self.notify(Event::WorkOrderCreated {
            order_id: order_row.id,
            detail_id: detail.detail_id,
        })
        .await;

        Ok(detail)
    }

    /// Partial update; absent fields keep their stored values.
    #[instrument(skip(self, request))]
    pub async fn update_work_order(
        &self,
        detail_id: i64,
        request: UpdateWorkOrderRequest,
    ) -> Result<order_detail::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let current = self.get_work_order(detail_id).await?;

        let mut active: order_detail::ActiveModel = current.into();
        if let Some(assigned_to) = request.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        if let Some(due_date) = request.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(img_url) = request.img_url {
            active.img_url = Set(Some(img_url));
        }
        if let Some(process_stage) = request.process_stage {
            active.process_stage = Set(Some(process_stage));
        }
        let now = Utc::now();
        active.updated_date = Set(Some(now));
        active.updated_at = Set(Some(now));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, detail_id, "Failed to update work order");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Work order updated"; "detail_id" => detail_id);
        self.notify(Event::WorkOrderUpdated(detail_id)).await;
        Ok(updated)
    }

    /// Stages for one detail in creation order. Unknown details are a
    /// `NotFound`, not an empty list.
    #[instrument(skip(self))]
    pub async fn get_stages(&self, detail_id: i64) -> Result<Vec<order_stage::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_work_order(detail_id).await?;

        order_stage::Entity::find()
            .filter(order_stage::Column::OrderDetailId.eq(detail_id))
            .order_by_asc(order_stage::Column::CreatedAt)
            .order_by_asc(order_stage::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, detail_id, "Failed to list stages");
                ServiceError::DatabaseError(e)
            })
    }

    /// Updates one stage. A status change must name a member of the closed
    /// [`StageStatus`] set and is announced on the event bus.
    #[instrument(skip(self, request))]
    pub async fn update_stage(
        &self,
        stage_id: i64,
        request: UpdateStageRequest,
    ) -> Result<order_stage::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = order_stage::Entity::find_by_id(stage_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, stage_id, "Failed to fetch stage");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Stage {} not found", stage_id)))?;
        let old_status = current.status.clone();

        let next_status = match &request.status {
            Some(raw) => {
                let parsed = StageStatus::from_str(raw).map_err(|_| {
                    ServiceError::ValidationError(format!("Unknown stage status '{}'", raw))
                })?;
                Some(parsed.to_string())
            }
            None => None,
        };

        let mut active: order_stage::ActiveModel = current.into();
        if let Some(status) = next_status.clone() {
            active.status = Set(status);
        }
        if let Some(date) = request.planned_start_date {
            active.planned_start_date = Set(Some(date));
        }
        if let Some(date) = request.planned_finish_date {
            active.planned_finish_date = Set(Some(date));
        }
        if let Some(date) = request.actual_start_date {
            active.actual_start_date = Set(Some(date));
        }
        if let Some(date) = request.actual_finish_date {
            active.actual_finish_date = Set(Some(date));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, stage_id, "Failed to update stage");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(new_status) = next_status {
            if new_status != old_status {
                slog::info!(self.logger, "Stage status changed";
                    "stage_id" => stage_id,
                    "from" => old_status.clone(),
                    "to" => new_status.clone(),
                );
                self.notify(Event::StageStatusChanged {
                    stage_id,
                    old_status,
                    new_status,
                })
                .await;
            }
        }
        Ok(updated)
    }

    /// Stores a placeholder URL for an uploaded file name on the detail.
    #[instrument(skip(self))]
    pub async fn attach_image(
        &self,
        detail_id: i64,
        file_name: &str,
    ) -> Result<order_detail::Model, ServiceError> {
        if file_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "A file name is required".to_string(),
            ));
        }
        let db = &*self.db_pool;
        let url = placeholder_image_url(file_name);
        let current = self.get_work_order(detail_id).await?;

        let mut active: order_detail::ActiveModel = current.into();
        active.img_url = Set(Some(url.clone()));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, detail_id, "Failed to attach image");
            ServiceError::DatabaseError(e)
        })?;

        self.notify(Event::WorkOrderImageAttached { detail_id, url })
            .await;
        Ok(updated)
    }

    /// Moves a sale into production: resolves the customer, puts an order
    /// into the working state (creating one if needed), replaces its
    /// measurements, and creates the detail plus the stage pipeline.
    ///
    /// Runs as a sequence of independent writes, not a transaction; when a
    /// step fails, the rows created so far are removed again in reverse
    /// order before the error is returned.
    #[instrument(skip(self, request), fields(order_id = ?request.order_id))]
    pub async fn convert_to_work_order(
        &self,
        request: ConvertToWorkOrderRequest,
    ) -> Result<ConvertedWorkOrder, ServiceError> {
        request.validate()?;
        validate_conversion_request(&request)?;

        let mut cleanup = ConversionCleanup::default();
        match self.run_conversion(&request, &mut cleanup).await {
            Ok((converted, old_status)) => {
                slog::info!(self.logger, "Sale order converted";
                    "order_id" => converted.order.id,
                    "detail_id" => converted.detail.detail_id,
                    "total_cost" => converted.totals.total_cost.to_string(),
                );

                if let Some(customer_id) = cleanup.customer_id {
                    self.notify(Event::CustomerCreated(customer_id)).await;
                }
                if let Some(old) = old_status {
                    if !old.eq_ignore_ascii_case(order::STATUS_WORKING) {
                        self.notify(Event::OrderStatusChanged {
                            order_id: converted.order.id,
                            old_status: old,
                            new_status: order::STATUS_WORKING.to_string(),
                        })
                        .await;
                    }
                }
                self.notify(Event::WorkOrderCreated {
                    order_id: converted.order.id,
                    detail_id: converted.detail.detail_id,
                })
                .await;
                self.notify(Event::SaleOrderConverted {
                    source_order_id: converted.order.id,
                    work_order_id: converted.detail.detail_id,
                })
                .await;

                Ok(converted)
            }
            Err(err) => {
                self.compensate(cleanup, &err).await;
                Err(err)
            }
        }
    }

    async fn run_conversion(
        &self,
        request: &ConvertToWorkOrderRequest,
        cleanup: &mut ConversionCleanup,
    ) -> Result<(ConvertedWorkOrder, Option<String>), ServiceError> {
        let db = &*self.db_pool;

        let (customer_row, source_order) = if let Some(order_id) = request.order_id {
            let source = order::Entity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, order_id, "Failed to load order for conversion");
                    ServiceError::DatabaseError(e)
                })?
                .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
            let customer_row = customer::Entity::find_by_id(source.customer_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, customer_id = source.customer_id, "Failed to load customer");
                    ServiceError::DatabaseError(e)
                })?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Customer {} not found", source.customer_id))
                })?;
            (customer_row, Some(source))
        } else if let Some(customer_id) = request.customer_id {
            let customer_row = customer::Entity::find_by_id(customer_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, customer_id, "Failed to load customer");
                    ServiceError::DatabaseError(e)
                })?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Customer {} not found", customer_id))
                })?;
            (customer_row, None)
        } else {
            let block = request.customer.as_ref().ok_or_else(|| {
                ServiceError::ValidationError("A customer is required".to_string())
            })?;
            let (customer_row, outcome) = upsert_customer_record(db, block).await?;
            if outcome == UpsertOutcome::Created {
                cleanup.customer_id = Some(customer_row.id);
            }
            (customer_row, None)
        };

        let old_status;
        let order_row = match source_order {
            Some(existing) => {
                old_status = Some(existing.order_status.clone());
                let mut active: order::ActiveModel = existing.into();
                active.customer_name = Set(customer_row.name.clone());
                active.company = Set(customer_row.company.clone());
                active.address = Set(customer_row.address.clone());
                active.order_status = Set(order::STATUS_WORKING.to_string());
                active.order_price = Set(request.price);
                active.work_types = Set(WorkTypes::new(request.work_types.clone()));
                active.updated_at = Set(Some(Utc::now()));
                active.update(db).await.map_err(|e| {
                    error!(error = %e, "Failed to move order into production");
                    ServiceError::DatabaseError(e)
                })?
            }
            None => {
                old_status = None;
                let created = insert_order_record(
                    db,
                    NewOrderRecord {
                        customer_id: customer_row.id,
                        customer_name: customer_row.name.clone(),
                        company: customer_row.company.clone(),
                        address: customer_row.address.clone(),
                        order_status: order::STATUS_WORKING.to_string(),
                        order_price: request.price,
                        work_types: request.work_types.clone(),
                        created_by: Some(CONVERSION_AUTHOR.to_string()),
                    },
                )
                .await?;
                cleanup.order_id = Some(created.id);
                created
            }
        };

        let measurement_rows =
            replace_measurement_rows(db, order_row.id, &request.measurements).await?;
        let total_cost: Decimal = measurement_rows.iter().map(|row| row.total_cost).sum();

        let detail = order_detail::ActiveModel {
            order_id: Set(order_row.id),
            assigned_to: Set(Some(request.assigned_to.clone())),
            due_date: Set(request.due_date),
            price: Set(request.price),
            total_cost: Set(total_cost),
            notes: Set(request.notes.clone()),
            img_url: Set(request.img_url.clone()),
            process_stage: Set(Some(PROCESS_STAGE_PENDING.to_string())),
            updated_date: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = order_row.id, "Failed to create work order detail");
            ServiceError::DatabaseError(e)
        })?;
        cleanup.detail_id = Some(detail.detail_id);

        insert_stage_template(db, detail.detail_id).await?;

        let totals = compute_totals(request.price, total_cost);
        Ok((
            ConvertedWorkOrder {
                order: order_row,
                detail,
                totals,
            },
            old_status,
        ))
    }

    /// Removes whatever the failed conversion created, newest first. Deletes
    /// are idempotent (zero rows affected means that step never ran) and a
    /// failed delete is logged without masking the original error.
    async fn compensate(&self, cleanup: ConversionCleanup, original: &ServiceError) {
        if cleanup.is_empty() {
            return;
        }
        slog::warn!(self.logger, "Conversion failed, removing partial records";
            "error" => original.to_string(),
            "order_id" => cleanup.order_id.unwrap_or_default(),
            "detail_id" => cleanup.detail_id.unwrap_or_default(),
        );
        let db = &*self.db_pool;

        if let Some(detail_id) = cleanup.detail_id {
            if let Err(e) = order_stage::Entity::delete_many()
                .filter(order_stage::Column::OrderDetailId.eq(detail_id))
                .exec(db)
                .await
            {
                log_error(&e, ErrorKind::Database, Some("conversion cleanup: stages"));
            }
            if let Err(e) = order_detail::Entity::delete_by_id(detail_id).exec(db).await {
                log_error(&e, ErrorKind::Database, Some("conversion cleanup: detail"));
            }
        }
        if let Some(order_id) = cleanup.order_id {
            if let Err(e) = measurement::Entity::delete_many()
                .filter(measurement::Column::OrderId.eq(order_id))
                .exec(db)
                .await
            {
                log_error(
                    &e,
                    ErrorKind::Database,
                    Some("conversion cleanup: measurements"),
                );
            }
            if let Err(e) = order::Entity::delete_by_id(order_id).exec(db).await {
                log_error(&e, ErrorKind::Database, Some("conversion cleanup: order"));
            }
        }
        if let Some(customer_id) = cleanup.customer_id {
            if let Err(e) = customer::Entity::delete_by_id(customer_id).exec(db).await {
                log_error(
                    &e,
                    ErrorKind::Database,
                    Some("conversion cleanup: customer"),
                );
            }
        }
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send work order event");
            }
        }
    }
}
