use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use utoipa::ToSchema;

/// The closed status set for a production stage. Stored as plain strings;
/// parse at the API boundary with `StageStatus::from_str`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    StrumEnumIter,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
    OnHold,
}

impl StageStatus {
    /// Status every stage starts in when the template batch is created.
    pub fn initial() -> Self {
        StageStatus::NotStarted
    }
}

/// The fixed production pipeline, in order. Work-order creation inserts one
/// stage row per entry; stages are never created singly in the normal flow.
pub const STAGE_TEMPLATE: [&str; 6] = [
    "pending",
    "cutting",
    "finishing",
    "delivery",
    "installing",
    "completed",
];

/// One step of the production pipeline belonging to one order detail.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "order_stages")]
#[schema(as = OrderStage)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_detail_id: i64,
    pub stage_name: String,
    pub status: String,
    pub planned_start_date: Option<Date>,
    pub planned_finish_date: Option<Date>,
    pub actual_start_date: Option<Date>,
    pub actual_finish_date: Option<Date>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_detail::Entity",
        from = "Column::OrderDetailId",
        to = "super::order_detail::Column::DetailId"
    )]
    OrderDetail,
    #[sea_orm(has_many = "super::order_stage_assignment::Entity")]
    Assignments,
}

impl Related<super::order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetail.def()
    }
}

impl Related<super::order_stage_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
