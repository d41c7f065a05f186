use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Production metadata for a converted order (the "work order" header).
///
/// One-to-one with its parent order by convention only; the schema allows
/// several details per order and the calendar normalizer keeps the first one
/// it encounters. The primary key is `detail_id`, inherited from the
/// historical schema.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "order_details")]
#[schema(as = OrderDetail)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub detail_id: i64,
    pub order_id: i64,
    pub assigned_to: Option<String>,
    pub updated_date: Option<DateTime<Utc>>,
    pub due_date: Option<Date>,
    pub price: Decimal,
    pub total_cost: Decimal,
    pub notes: Option<String>,
    pub img_url: Option<String>,
    pub process_stage: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(has_many = "super::order_stage::Entity")]
    OrderStages,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::order_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderStages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
