use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{customer, order};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Customer name is required"))]
    pub name: String,
    #[validate(regex(
        path = "crate::services::PHONE_REGEX",
        message = "Phone must be an Egyptian mobile number"
    ))]
    pub phone_number: String,
    pub company: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Customer name cannot be empty"))]
    pub name: Option<String>,
    #[validate(regex(
        path = "crate::services::PHONE_REGEX",
        message = "Phone must be an Egyptian mobile number"
    ))]
    pub phone_number: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    /// Running balances are maintained by the bookkeeping side and written
    /// through as-is.
    pub paid_total: Option<Decimal>,
    pub to_be_paid: Option<Decimal>,
}

/// What `upsert_customer_record` did with the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    /// Existing row found; address/company refreshed because they differed.
    Refreshed,
    /// Existing row found and returned untouched.
    Unchanged,
}

/// Find-or-create by exact (name, phone), refreshing address/company only
/// when the request carries different values. Generic over the connection so
/// the order flows can run it inside their transactions.
pub async fn upsert_customer_record<C: ConnectionTrait>(
    conn: &C,
    request: &CreateCustomerRequest,
) -> Result<(customer::Model, UpsertOutcome), ServiceError> {
    let existing = customer::Entity::find()
        .filter(customer::Column::Name.eq(request.name.clone()))
        .filter(customer::Column::PhoneNumber.eq(request.phone_number.clone()))
        .one(conn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to look up customer");
            ServiceError::DatabaseError(e)
        })?;

    if let Some(found) = existing {
        let address_changed = request.address.is_some() && request.address != found.address;
        let company_changed = request.company.is_some() && request.company != found.company;
        if !address_changed && !company_changed {
            return Ok((found, UpsertOutcome::Unchanged));
        }

        let customer_id = found.id;
        let mut active: customer::ActiveModel = found.into();
        if address_changed {
            active.address = Set(request.address.clone());
        }
        if company_changed {
            active.company = Set(request.company.clone());
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(conn).await.map_err(|e| {
            error!(error = %e, customer_id, "Failed to refresh customer contact fields");
            ServiceError::DatabaseError(e)
        })?;
        return Ok((updated, UpsertOutcome::Refreshed));
    }

    let active = customer::ActiveModel {
        name: Set(request.name.clone()),
        company: Set(request.company.clone()),
        phone_number: Set(request.phone_number.clone()),
        address: Set(request.address.clone()),
        paid_total: Set(Decimal::ZERO),
        to_be_paid: Set(Decimal::ZERO),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = active.insert(conn).await.map_err(|e| {
        error!(error = %e, "Failed to create customer");
        ServiceError::DatabaseError(e)
    })?;
    Ok((created, UpsertOutcome::Created))
}

/// Customer CRUD plus the (name, phone) upsert the order flows build on.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl CustomerService {
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

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let active = customer::ActiveModel {
            name: Set(request.name),
            company: Set(request.company),
            phone_number: Set(request.phone_number),
            address: Set(request.address),
            paid_total: Set(Decimal::ZERO),
            to_be_paid: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = active.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create customer");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Customer created";
            "customer_id" => created.id,
            "name" => created.name.clone(),
        );
        self.notify(Event::CustomerCreated(created.id)).await;
        Ok(created)
    }

    /// [`upsert_customer_record`] against the pool, with events and logging.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn upsert_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<(customer::Model, UpsertOutcome), ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let (model, outcome) = upsert_customer_record(db, &request).await?;

        match outcome {
            UpsertOutcome::Created => {
                slog::info!(self.logger, "Customer created";
                    "customer_id" => model.id,
                    "name" => model.name.clone(),
                );
                self.notify(Event::CustomerCreated(model.id)).await;
            }
            UpsertOutcome::Refreshed => {
                self.notify(Event::CustomerUpdated(model.id)).await;
            }
            UpsertOutcome::Unchanged => {}
        }
        Ok((model, outcome))
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: i64) -> Result<customer::Model, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch customer");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))
    }

    /// Newest customers first.
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .limit(Some(limit))
            .offset(offset)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list customers");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn count_customers(&self) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;
        customer::Entity::find().count(db).await.map_err(|e| {
            error!(error = %e, "Failed to count customers");
            ServiceError::DatabaseError(e)
        })
    }

    /// Substring search over name and phone number.
    #[instrument(skip(self))]
    pub async fn search_customers(
        &self,
        search_term: &str,
    ) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db_pool;
        let search_pattern = format!("%{}%", search_term);

        customer::Entity::find()
            .filter(
                Condition::any()
                    .add(customer::Column::Name.like(&search_pattern))
                    .add(customer::Column::PhoneNumber.like(&search_pattern)),
            )
            .order_by_desc(customer::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to search customers");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        id: i64,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let current = self.get_customer(id).await?;

        let mut active: customer::ActiveModel = current.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(phone) = request.phone_number {
            active.phone_number = Set(phone);
        }
        if let Some(company) = request.company {
            active.company = Set(Some(company));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(paid_total) = request.paid_total {
            active.paid_total = Set(paid_total);
        }
        if let Some(to_be_paid) = request.to_be_paid {
            active.to_be_paid = Set(to_be_paid);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to update customer");
            ServiceError::DatabaseError(e)
        })?;

        self.notify(Event::CustomerUpdated(updated.id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = customer::Entity::delete_by_id(id).exec(db).await.map_err(|e| {
            error!(error = %e, "Failed to delete customer");
            ServiceError::DatabaseError(e)
        })?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Customer {} not found", id)));
        }

        slog::info!(self.logger, "Customer deleted"; "customer_id" => id);
        self.notify(Event::CustomerDeleted(id)).await;
        Ok(())
    }

    /// The customer's orders, newest first.
    #[instrument(skip(self))]
    pub async fn get_customer_orders(
        &self,
        customer_id: i64,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        // 404 on an unknown customer rather than an empty list
        self.get_customer(customer_id).await?;

        order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch customer orders");
                ServiceError::DatabaseError(e)
            })
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send customer event");
            }
        }
    }
}
