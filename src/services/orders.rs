use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
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
use crate::entities::measurement;
use crate::entities::order::{self, WorkTypes};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::customers::{upsert_customer_record, CreateCustomerRequest, UpsertOutcome};
use crate::services::measurements::{insert_measurement_rows, MeasurementInput};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Customer contact block; resolved through the (name, phone) upsert.
    #[validate]
    pub customer: CreateCustomerRequest,
    #[validate(length(min = 1, message = "At least one work type is required"))]
    pub work_types: Vec<String>,
    pub order_price: Decimal,
    #[serde(default)]
    #[validate]
    pub measurements: Vec<MeasurementInput>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub company: Option<String>,
    pub address: Option<String>,
    pub order_status: Option<String>,
    pub order_price: Option<Decimal>,
    /// Replaces the tag set; the order code is not regenerated.
    pub work_types: Option<Vec<String>>,
}

/// Single-letter code for a work-type tag. Unknown tags fall back to their
/// uppercased first character so a new tag degrades to something readable
/// instead of failing intake.
fn work_type_code(tag: &str) -> String {
    match tag {
        "kitchen" => "K".to_string(),
        "walls" => "W".to_string(),
        "floor" => "F".to_string(),
        "other" => "X".to_string(),
        _ => tag
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default(),
    }
}

/// `{sorted-work-type-codes}-{order-id}`, e.g. `KW-42` for a kitchen+walls
/// job. Sorting makes the code independent of tag input order.
pub fn generate_order_code(work_types: &[String], order_id: i64) -> String {
    let mut codes: Vec<String> = work_types.iter().map(|tag| work_type_code(tag)).collect();
    codes.sort();
    format!("{}-{}", codes.concat(), order_id)
}

/// Field set for inserting an order row outside the intake DTO, shared with
/// the work-order conversion flow.
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub customer_id: i64,
    pub customer_name: String,
    pub company: Option<String>,
    pub address: Option<String>,
    pub order_status: String,
    pub order_price: Decimal,
    pub work_types: Vec<String>,
    pub created_by: Option<String>,
}

/// Two-phase order insert: the row goes in with the `TEMP` placeholder code,
/// then is rewritten with the generated code once the id is known.
pub async fn insert_order_record<C: ConnectionTrait>(
    conn: &C,
    record: NewOrderRecord,
) -> Result<order::Model, ServiceError> {
    let active = order::ActiveModel {
        code: Set(order::CODE_PLACEHOLDER.to_string()),
        customer_id: Set(record.customer_id),
        customer_name: Set(record.customer_name),
        company: Set(record.company),
        address: Set(record.address),
        order_status: Set(record.order_status),
        order_price: Set(record.order_price),
        work_types: Set(WorkTypes::new(record.work_types.clone())),
        created_by: Set(record.created_by),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = active.insert(conn).await.map_err(|e| {
        error!(error = %e, "Failed to insert order");
        ServiceError::DatabaseError(e)
    })?;

    let code = generate_order_code(&record.work_types, inserted.id);
    let order_id = inserted.id;
    let mut active: order::ActiveModel = inserted.into();
    active.code = Set(code);
    active.update(conn).await.map_err(|e| {
        error!(error = %e, order_id, "Failed to assign order code");
        ServiceError::DatabaseError(e)
    })
}

/// Sale-order intake and order CRUD.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl OrderService {
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

    /// Creates a sale order: customer upsert, two-phase coded order row, and
    /// measurement lines, in one transaction.
    #[instrument(skip(self, request), fields(customer = %request.customer.name))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to open transaction");
            ServiceError::DatabaseError(e)
        })?;

        let (customer, outcome) = upsert_customer_record(&txn, &request.customer).await?;

        let order_row = insert_order_record(
            &txn,
            NewOrderRecord {
                customer_id: customer.id,
                customer_name: customer.name.clone(),
                company: customer.company.clone(),
                address: customer.address.clone(),
                order_status: order::STATUS_SALE.to_string(),
                order_price: request.order_price,
                work_types: request.work_types.clone(),
                created_by: request.created_by.clone(),
            },
        )
        .await?;

        insert_measurement_rows(&txn, order_row.id, &request.measurements).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Order created";
            "order_id" => order_row.id,
            "code" => order_row.code.clone(),
            "customer_id" => customer.id,
        );
        if outcome == UpsertOutcome::Created {
            self.notify(Event::CustomerCreated(customer.id)).await;
        }
        self.notify(Event::OrderCreated(order_row.id)).await;
        self.notify(Event::OrderCodeAssigned {
            order_id: order_row.id,
            code: order_row.code.clone(),
        })
        .await;

        Ok(order_row)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: i64) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        order::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch order");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    /// Newest orders first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .limit(Some(limit))
            .offset(offset)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list orders");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn count_orders(&self) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        order::Entity::find().count(db).await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        id: i64,
        request: UpdateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let current = self.get_order(id).await?;
        let old_status = current.order_status.clone();

        let mut active: order::ActiveModel = current.into();
        if let Some(company) = request.company {
            active.company = Set(Some(company));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(status) = request.order_status {
            active.order_status = Set(status);
        }
        if let Some(price) = request.order_price {
            active.order_price = Set(price);
        }
        if let Some(work_types) = request.work_types {
            active.work_types = Set(WorkTypes::new(work_types));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to update order");
            ServiceError::DatabaseError(e)
        })?;

        if updated.order_status != old_status {
            self.notify(Event::OrderStatusChanged {
                order_id: updated.id,
                old_status,
                new_status: updated.order_status.clone(),
            })
            .await;
        }
        self.notify(Event::OrderUpdated(updated.id)).await;
        Ok(updated)
    }

    /// Deletes an order and its measurements in one transaction. Production
    /// rows (details, stages) are left untouched; removing a converted order
    /// is a bookkeeping decision, not a cascade.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        self.get_order(id).await?;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to open transaction");
            ServiceError::DatabaseError(e)
        })?;

        measurement::Entity::delete_many()
            .filter(measurement::Column::OrderId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete order measurements");
                ServiceError::DatabaseError(e)
            })?;

        order::Entity::delete_by_id(id).exec(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to delete order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit order deletion");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Order deleted"; "order_id" => id);
        self.notify(Event::OrderDeleted(id)).await;
        Ok(())
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }
}
