use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use slog::Logger;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::db::DbPool;
use crate::entities::measurement;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Stored material-type vocabulary.
pub const MATERIAL_TYPES: [&str; 3] = ["marble", "quartz", "granite"];

/// Stored unit vocabulary, carried verbatim from the shop's terminology.
pub const MEASUREMENT_UNITS: [&str; 4] = [
    "count",
    "linear_meter_ML",
    "square_meter_M²",
    "cubic_meter_M³",
];

fn validate_material_type(value: &str) -> Result<(), ValidationError> {
    if MATERIAL_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_material_type"))
    }
}

// An empty unit means "not chosen yet" and is storable; the conversion flow
// separately requires at least one line with a unit.
fn validate_unit(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || MEASUREMENT_UNITS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_unit"))
    }
}

/// One material line as submitted by a form; `total_cost` is always derived,
/// never accepted from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct MeasurementInput {
    #[validate(length(min = 1, message = "Material name is required"))]
    pub material_name: String,
    #[validate(custom = "validate_material_type")]
    pub material_type: String,
    #[validate(custom = "validate_unit")]
    pub unit: String,
    pub quantity: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMeasurementRequest {
    pub order_id: i64,
    #[serde(flatten)]
    #[validate]
    pub measurement: MeasurementInput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMeasurementRequest {
    #[validate(length(min = 1, message = "Material name cannot be empty"))]
    pub material_name: Option<String>,
    #[validate(custom = "validate_material_type")]
    pub material_type: Option<String>,
    #[validate(custom = "validate_unit")]
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub cost: Option<Decimal>,
}

/// The one derivation rule for measurements.
pub fn line_total(quantity: Decimal, cost: Decimal) -> Decimal {
    quantity * cost
}

/// Inserts one measurement row per input with recomputed totals. Generic over
/// the connection so order intake and conversion can run it in their flows.
pub async fn insert_measurement_rows<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
    inputs: &[MeasurementInput],
) -> Result<Vec<measurement::Model>, ServiceError> {
    let mut inserted = Vec::with_capacity(inputs.len());
    for input in inputs {
        let active = measurement::ActiveModel {
            order_id: Set(order_id),
            material_name: Set(input.material_name.clone()),
            material_type: Set(input.material_type.clone()),
            unit: Set(input.unit.clone()),
            quantity: Set(input.quantity),
            cost: Set(input.cost),
            total_cost: Set(line_total(input.quantity, input.cost)),
            ..Default::default()
        };
        let row = active.insert(conn).await.map_err(|e| {
            error!(error = %e, order_id, "Failed to insert measurement");
            ServiceError::DatabaseError(e)
        })?;
        inserted.push(row);
    }
    Ok(inserted)
}

/// Delete-all then insert-all for one order.
pub async fn replace_measurement_rows<C: ConnectionTrait>(
    conn: &C,
    order_id: i64,
    inputs: &[MeasurementInput],
) -> Result<Vec<measurement::Model>, ServiceError> {
    measurement::Entity::delete_many()
        .filter(measurement::Column::OrderId.eq(order_id))
        .exec(conn)
        .await
        .map_err(|e| {
            error!(error = %e, order_id, "Failed to clear measurements");
            ServiceError::DatabaseError(e)
        })?;
    insert_measurement_rows(conn, order_id, inputs).await
}

/// Measurement CRUD. `total_cost` is recomputed on every write path.
#[derive(Clone)]
pub struct MeasurementService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl MeasurementService {
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

    /// Measurements for one order, in insertion order.
    #[instrument(skip(self))]
    pub async fn list_for_order(
        &self,
        order_id: i64,
    ) -> Result<Vec<measurement::Model>, ServiceError> {
        let db = &*self.db_pool;
        measurement::Entity::find()
            .filter(measurement::Column::OrderId.eq(order_id))
            .order_by_asc(measurement::Column::Id)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id, "Failed to list measurements");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_measurement(&self, id: i64) -> Result<measurement::Model, ServiceError> {
        let db = &*self.db_pool;
        measurement::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch measurement");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Measurement {} not found", id)))
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_measurement(
        &self,
        request: CreateMeasurementRequest,
    ) -> Result<measurement::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let rows =
            insert_measurement_rows(db, request.order_id, std::slice::from_ref(&request.measurement))
                .await?;
        let created = rows.into_iter().next().ok_or_else(|| {
            ServiceError::InternalError("Measurement insert returned no row".to_string())
        })?;

        self.notify(Event::MeasurementAdded {
            order_id: created.order_id,
            measurement_id: created.id,
        })
        .await;
        Ok(created)
    }

    /// Merges provided fields over the current row and recomputes
    /// `total_cost` from the effective quantity and cost, whichever of the
    /// two changed.
    #[instrument(skip(self, request), fields(measurement_id = %id))]
    pub async fn update_measurement(
        &self,
        id: i64,
        request: UpdateMeasurementRequest,
    ) -> Result<measurement::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let current = self.get_measurement(id).await?;

        let quantity = request.quantity.unwrap_or(current.quantity);
        let cost = request.cost.unwrap_or(current.cost);

        let mut active: measurement::ActiveModel = current.into();
        if let Some(name) = request.material_name {
            active.material_name = Set(name);
        }
        if let Some(material_type) = request.material_type {
            active.material_type = Set(material_type);
        }
        if let Some(unit) = request.unit {
            active.unit = Set(unit);
        }
        active.quantity = Set(quantity);
        active.cost = Set(cost);
        active.total_cost = Set(line_total(quantity, cost));

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to update measurement");
            ServiceError::DatabaseError(e)
        })?;

        self.notify(Event::MeasurementUpdated(updated.id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_measurement(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = measurement::Entity::delete_by_id(id).exec(db).await.map_err(|e| {
            error!(error = %e, "Failed to delete measurement");
            ServiceError::DatabaseError(e)
        })?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Measurement {} not found",
                id
            )));
        }

        self.notify(Event::MeasurementDeleted(id)).await;
        Ok(())
    }

    /// Atomic replace of an order's measurement set.
    #[instrument(skip(self, inputs), fields(order_id = %order_id, lines = inputs.len()))]
    pub async fn replace_for_order(
        &self,
        order_id: i64,
        inputs: Vec<MeasurementInput>,
    ) -> Result<Vec<measurement::Model>, ServiceError> {
        for input in &inputs {
            input.validate()?;
        }
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to open transaction");
            ServiceError::DatabaseError(e)
        })?;

        let rows = replace_measurement_rows(&txn, order_id, &inputs).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit measurement replace");
            ServiceError::DatabaseError(e)
        })?;

        slog::info!(self.logger, "Measurements replaced";
            "order_id" => order_id,
            "lines" => rows.len(),
        );
        Ok(rows)
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send measurement event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn marble_line() -> MeasurementInput {
        MeasurementInput {
            material_name: "Carrara slab".to_string(),
            material_type: "marble".to_string(),
            unit: "square_meter_M²".to_string(),
            quantity: dec!(2.5),
            cost: dec!(340.10),
        }
    }

    #[test]
    fn line_total_multiplies_exactly() {
        assert_eq!(line_total(dec!(2.5), dec!(340.10)), dec!(850.250));
        assert_eq!(line_total(dec!(0), dec!(99.99)), dec!(0));
        assert_eq!(line_total(dec!(3), dec!(0.1)), dec!(0.3));
    }

    #[test]
    fn input_accepts_known_vocabulary() {
        assert!(marble_line().validate().is_ok());
    }

    #[test]
    fn input_accepts_an_empty_unit() {
        let mut line = marble_line();
        line.unit = String::new();
        assert!(line.validate().is_ok());
    }

    #[test]
    fn input_rejects_unknown_material_type() {
        let mut line = marble_line();
        line.material_type = "limestone".to_string();
        assert!(line.validate().is_err());
    }

    #[test]
    fn input_rejects_unknown_unit() {
        let mut line = marble_line();
        line.unit = "bucket".to_string();
        assert!(line.validate().is_err());
    }

    #[test]
    fn update_request_skips_absent_fields() {
        assert!(UpdateMeasurementRequest::default().validate().is_ok());

        let request = UpdateMeasurementRequest {
            unit: Some("bucket".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
