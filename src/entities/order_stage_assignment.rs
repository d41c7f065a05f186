use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's scheduled work on one stage on one calendar day; the unit
/// the weekly calendar manipulates.
///
/// `order_stage_id` is nullable: an assignment whose stage was deleted (or
/// never set) is an "orphan" — still listed, but unmatchable by order or
/// status filters. `employee_name` is free text by design, not a foreign key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "order_stage_assignments")]
#[schema(as = OrderStageAssignment)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_stage_id: Option<i64>,
    pub employee_name: String,
    pub work_date: Date,
    pub is_done: bool,
    pub note: Option<String>,
    /// Pay multiplier for the day (0.5, 1, 1.5 or 2).
    pub employee_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_stage::Entity",
        from = "Column::OrderStageId",
        to = "super::order_stage::Column::Id"
    )]
    OrderStage,
}

impl Related<super::order_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderStage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
