//! Weekly production calendar: windowed joined fetches, normalization into
//! flat collections, an in-memory assignment store, filters, and week-window
//! date arithmetic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use slog::Logger;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{employee, order, order_detail, order_stage, order_stage_assignment};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::tracing::with_metrics;

pub mod filters;
pub mod normalizer;
pub mod store;
pub mod week;

pub use filters::{visible_assignments, AssignmentFilters};
pub use normalizer::{normalize, CalendarData, CalendarRow, DetailRow, NormalizedOrder, StageRow};
pub use store::{AssignmentStore, CalendarBackend};
pub use week::{week_bounds, WeekNavigator};

/// Request payload for creating a calendar assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewAssignment {
    pub order_stage_id: Option<i64>,
    #[validate(length(min = 1, message = "Employee name cannot be empty"))]
    pub employee_name: String,
    pub work_date: NaiveDate,
    #[serde(default)]
    pub is_done: Option<bool>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub employee_rate: Option<Decimal>,
}

/// Partial update for an assignment. `None` fields are left untouched; a
/// value with every field `None` reads back the current row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentChanges {
    pub order_stage_id: Option<i64>,
    pub employee_name: Option<String>,
    pub work_date: Option<NaiveDate>,
    pub is_done: Option<bool>,
    pub note: Option<String>,
    pub employee_rate: Option<Decimal>,
}

impl AssignmentChanges {
    pub fn is_empty(&self) -> bool {
        self.order_stage_id.is_none()
            && self.employee_name.is_none()
            && self.work_date.is_none()
            && self.is_done.is_none()
            && self.note.is_none()
            && self.employee_rate.is_none()
    }
}

/// A work order's detail with its production stages attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetailWithStages {
    #[serde(flatten)]
    pub detail: order_detail::Model,
    pub stages: Vec<order_stage::Model>,
}

/// An active work order with details and stages, the resolution context the
/// filter engine scans when matching assignments to orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: order::Model,
    #[serde(rename = "order_details")]
    pub details: Vec<DetailWithStages>,
}

/// Database-backed scheduling queries and assignment mutations. Doubles as
/// the production [`CalendarBackend`] for [`AssignmentStore`].
#[derive(Clone)]
pub struct SchedulingService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl SchedulingService {
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

    /// Normalized calendar for the inclusive `[from, to]` window.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn calendar_data(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<CalendarData, ServiceError> {
        let rows = with_metrics("fetch_calendar_window", None, || {
            self.calendar_rows(from, to)
        })
        .await?;
        Ok(normalize(rows))
    }

    /// Joined window fetch: assignments, then their stages, details, and
    /// orders in id batches, reassembled into per-assignment rows. Rows are
    /// ordered by work date, then id, so normalization is deterministic.
    pub async fn calendar_rows(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarRow>, ServiceError> {
        let db = &*self.db_pool;

        let assignments = order_stage_assignment::Entity::find()
            .filter(order_stage_assignment::Column::WorkDate.between(from, to))
            .order_by_asc(order_stage_assignment::Column::WorkDate)
            .order_by_asc(order_stage_assignment::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch calendar assignments");
                ServiceError::DatabaseError(e)
            })?;

        let stage_ids = unique_ids(assignments.iter().filter_map(|a| a.order_stage_id));
        let stages = if stage_ids.is_empty() {
            Vec::new()
        } else {
            order_stage::Entity::find()
                .filter(order_stage::Column::Id.is_in(stage_ids))
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch stages for calendar window");
                    ServiceError::DatabaseError(e)
                })?
        };

        let detail_ids = unique_ids(stages.iter().map(|s| s.order_detail_id));
        let details = if detail_ids.is_empty() {
            Vec::new()
        } else {
            order_detail::Entity::find()
                .filter(order_detail::Column::DetailId.is_in(detail_ids))
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch details for calendar window");
                    ServiceError::DatabaseError(e)
                })?
        };

        let order_ids = unique_ids(details.iter().map(|d| d.order_id));
        let orders = if order_ids.is_empty() {
            Vec::new()
        } else {
            order::Entity::find()
                .filter(order::Column::Id.is_in(order_ids))
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch orders for calendar window");
                    ServiceError::DatabaseError(e)
                })?
        };

        let stages_by_id: HashMap<i64, order_stage::Model> =
            stages.into_iter().map(|s| (s.id, s)).collect();
        let details_by_id: HashMap<i64, order_detail::Model> =
            details.into_iter().map(|d| (d.detail_id, d)).collect();
        let orders_by_id: HashMap<i64, order::Model> =
            orders.into_iter().map(|o| (o.id, o)).collect();

        let rows = assignments
            .into_iter()
            .map(|assignment| {
                let stage = assignment
                    .order_stage_id
                    .and_then(|id| stages_by_id.get(&id))
                    .cloned()
                    .map(|stage| {
                        let detail = details_by_id
                            .get(&stage.order_detail_id)
                            .cloned()
                            .map(|detail| {
                                let order = orders_by_id.get(&detail.order_id).cloned();
                                DetailRow { detail, order }
                            });
                        StageRow { stage, detail }
                    });
                CalendarRow { assignment, stage }
            })
            .collect();
        Ok(rows)
    }

    /// Bare assignment rows for the window, no join.
    pub async fn assignments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<order_stage_assignment::Model>, ServiceError> {
        let db = &*self.db_pool;
        order_stage_assignment::Entity::find()
            .filter(order_stage_assignment::Column::WorkDate.between(from, to))
            .order_by_asc(order_stage_assignment::Column::WorkDate)
            .order_by_asc(order_stage_assignment::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch assignments window");
                ServiceError::DatabaseError(e)
            })
    }

    /// Orders eligible for new assignments: status `working`, matched
    /// case-insensitively, newest first.
    pub async fn available_orders(&self) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        order::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(order::Column::OrderStatus)))
                    .eq(order::STATUS_WORKING),
            )
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch available orders");
                ServiceError::DatabaseError(e)
            })
    }

    /// Active orders with their details, no stages.
    pub async fn working_orders(&self) -> Result<Vec<NormalizedOrder>, ServiceError> {
        let db = &*self.db_pool;
        let rows = order::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(order::Column::OrderStatus)))
                    .is_in(order::ACTIVE_WORK_STATUSES),
            )
            .find_with_related(order_detail::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch working orders");
                ServiceError::DatabaseError(e)
            })?;
        Ok(rows
            .into_iter()
            .map(|(order, order_details)| NormalizedOrder {
                order,
                order_details,
            })
            .collect())
    }

    /// Active orders with details and stages, fetched in id batches. This is
    /// the orders context handed to the filter engine.
    pub async fn working_orders_with_stages(&self) -> Result<Vec<OrderWithDetails>, ServiceError> {
        let db = &*self.db_pool;
        let orders = order::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(order::Column::OrderStatus)))
                    .is_in(order::ACTIVE_WORK_STATUSES),
            )
            .order_by_asc(order::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch working orders");
                ServiceError::DatabaseError(e)
            })?;

        let order_ids = unique_ids(orders.iter().map(|o| o.id));
        let details = if order_ids.is_empty() {
            Vec::new()
        } else {
            order_detail::Entity::find()
                .filter(order_detail::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_detail::Column::DetailId)
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch details for working orders");
                    ServiceError::DatabaseError(e)
                })?
        };

        let detail_ids = unique_ids(details.iter().map(|d| d.detail_id));
        let stages = if detail_ids.is_empty() {
            Vec::new()
        } else {
            order_stage::Entity::find()
                .filter(order_stage::Column::OrderDetailId.is_in(detail_ids))
                .order_by_asc(order_stage::Column::Id)
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to fetch stages for working orders");
                    ServiceError::DatabaseError(e)
                })?
        };

        let mut stages_by_detail: HashMap<i64, Vec<order_stage::Model>> = HashMap::new();
        for stage in stages {
            stages_by_detail
                .entry(stage.order_detail_id)
                .or_default()
                .push(stage);
        }
        let mut details_by_order: HashMap<i64, Vec<DetailWithStages>> = HashMap::new();
        for detail in details {
            let stages = stages_by_detail.remove(&detail.detail_id).unwrap_or_default();
            details_by_order
                .entry(detail.order_id)
                .or_default()
                .push(DetailWithStages { detail, stages });
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let details = details_by_order.remove(&order.id).unwrap_or_default();
                OrderWithDetails { order, details }
            })
            .collect())
    }

    pub async fn order_details(
        &self,
        order_id: i64,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        let db = &*self.db_pool;
        order_detail::Entity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .order_by_asc(order_detail::Column::DetailId)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id, "Failed to fetch order details");
                ServiceError::DatabaseError(e)
            })
    }

    pub async fn order_stages(
        &self,
        detail_id: i64,
    ) -> Result<Vec<order_stage::Model>, ServiceError> {
        let db = &*self.db_pool;
        order_stage::Entity::find()
            .filter(order_stage::Column::OrderDetailId.eq(detail_id))
            .order_by_asc(order_stage::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, detail_id, "Failed to fetch stages");
                ServiceError::DatabaseError(e)
            })
    }

    /// Crew roster for selection lists.
    pub async fn available_employees(&self) -> Result<Vec<employee::Model>, ServiceError> {
        let db = &*self.db_pool;
        employee::Entity::find()
            .order_by_asc(employee::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch employees");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self, new), fields(employee = %new.employee_name, work_date = %new.work_date))]
    pub async fn create_assignment(
        &self,
        new: NewAssignment,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        new.validate()?;
        let db = &*self.db_pool;

        let active = order_stage_assignment::ActiveModel {
            order_stage_id: Set(new.order_stage_id),
            employee_name: Set(new.employee_name),
            work_date: Set(new.work_date),
            is_done: Set(new.is_done.unwrap_or(false)),
            note: Set(new.note),
            employee_rate: Set(new.employee_rate),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = active.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to create assignment");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Assignment created";
            "assignment_id" => created.id,
            "employee" => created.employee_name.clone(),
            "work_date" => created.work_date.to_string(),
        );
        self.notify(Event::AssignmentCreated(created.id)).await;
        Ok(created)
    }

    /// Applies only the provided fields. Empty changes read back the current
    /// row without writing.
    #[instrument(skip(self, changes), fields(assignment_id = %id))]
    pub async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        let db = &*self.db_pool;
        let current = order_stage_assignment::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch assignment");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Assignment {} not found", id)))?;

        if changes.is_empty() {
            return Ok(current);
        }

        let mut active: order_stage_assignment::ActiveModel = current.into();
        if let Some(stage_id) = changes.order_stage_id {
            active.order_stage_id = Set(Some(stage_id));
        }
        if let Some(name) = changes.employee_name {
            active.employee_name = Set(name);
        }
        if let Some(date) = changes.work_date {
            active.work_date = Set(date);
        }
        if let Some(done) = changes.is_done {
            active.is_done = Set(done);
        }
        if let Some(note) = changes.note {
            active.note = Set(Some(note));
        }
        if let Some(rate) = changes.employee_rate {
            active.employee_rate = Set(Some(rate));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to update assignment");
            ServiceError::DatabaseError(e)
        })?;

        self.notify(Event::AssignmentUpdated(updated.id)).await;
        Ok(updated)
    }

    #[instrument(skip(self), fields(assignment_id = %id))]
    pub async fn delete_assignment(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = order_stage_assignment::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete assignment");
                ServiceError::DatabaseError(e)
            })?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Assignment {} not found",
                id
            )));
        }

        slog::info!(self.logger, "Assignment deleted"; "assignment_id" => id);
        self.notify(Event::AssignmentDeleted(id)).await;
        Ok(())
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send scheduling event");
            }
        }
    }
}

#[async_trait]
impl CalendarBackend for SchedulingService {
    async fn fetch_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarRow>, ServiceError> {
        self.calendar_rows(from, to).await
    }

    async fn fetch_assignments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<order_stage_assignment::Model>, ServiceError> {
        SchedulingService::assignments(self, from, to).await
    }

    async fn create_assignment(
        &self,
        new: NewAssignment,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        SchedulingService::create_assignment(self, new).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        SchedulingService::update_assignment(self, id, changes).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<(), ServiceError> {
        SchedulingService::delete_assignment(self, id).await
    }
}

fn unique_ids<I: IntoIterator<Item = i64>>(ids: I) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Shared model constructors for the scheduling tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::entities::order::WorkTypes;
    use crate::entities::{order, order_detail, order_stage, order_stage_assignment};

    pub fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    /// A date in January 2024; `day(1)` is a Monday.
    pub fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    pub fn assignment(
        id: i64,
        order_stage_id: Option<i64>,
        employee: &str,
        work_date: NaiveDate,
    ) -> order_stage_assignment::Model {
        order_stage_assignment::Model {
            id,
            order_stage_id,
            employee_name: employee.to_string(),
            work_date,
            is_done: false,
            note: None,
            employee_rate: None,
            created_at: timestamp(),
        }
    }

    pub fn stage(id: i64, order_detail_id: i64, status: &str) -> order_stage::Model {
        order_stage::Model {
            id,
            order_detail_id,
            stage_name: "cutting".to_string(),
            status: status.to_string(),
            planned_start_date: None,
            planned_finish_date: None,
            actual_start_date: None,
            actual_finish_date: None,
            notes: None,
            created_at: timestamp(),
            updated_at: None,
        }
    }

    pub fn detail(detail_id: i64, order_id: i64) -> order_detail::Model {
        order_detail::Model {
            detail_id,
            order_id,
            assigned_to: Some("workshop".to_string()),
            updated_date: None,
            due_date: None,
            price: dec!(1000),
            total_cost: dec!(600),
            notes: None,
            img_url: None,
            process_stage: Some("pending".to_string()),
            updated_at: None,
        }
    }

    pub fn order(id: i64, status: &str) -> order::Model {
        order::Model {
            id,
            code: format!("K-{id}"),
            customer_id: 1,
            customer_name: "Test Customer".to_string(),
            company: None,
            address: Some("12 Quarry Rd".to_string()),
            order_status: status.to_string(),
            order_price: dec!(1000),
            work_types: WorkTypes::new(vec!["kitchen".to_string()]),
            created_by: Some("system".to_string()),
            created_at: timestamp(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_are_detected() {
        assert!(AssignmentChanges::default().is_empty());

        let changes = AssignmentChanges {
            is_done: Some(true),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn new_assignment_requires_an_employee_name() {
        let request = NewAssignment {
            order_stage_id: Some(1),
            employee_name: String::new(),
            work_date: fixtures::day(1),
            is_done: None,
            note: None,
            employee_rate: None,
        };
        assert!(request.validate().is_err());
    }
}
