use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Code an order is inserted with before its id is known; rewritten in the
/// same transaction once the generated code can include the id.
pub const CODE_PLACEHOLDER: &str = "TEMP";

/// Status an order is created with at intake.
pub const STATUS_SALE: &str = "sale";
/// Status set by work-order conversion.
pub const STATUS_WORKING: &str = "working";
/// Legacy alias for `working`; old rows carry it, so the working-order
/// queries accept both (and match case-insensitively).
pub const STATUS_CONVERTED: &str = "converted";

pub const ACTIVE_WORK_STATUSES: [&str; 2] = [STATUS_WORKING, STATUS_CONVERTED];

/// Work-type tags carried by an order, stored as a JSON array.
///
/// The tag vocabulary drives order-code generation: `kitchen` -> `K`,
/// `walls` -> `W`, `floor` -> `F`, `other` -> `X`.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct WorkTypes(pub Vec<String>);

impl WorkTypes {
    pub fn new(tags: Vec<String>) -> Self {
        Self(tags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A customer job. Starts life as a sale order (`order_status = "sale"`) and
/// may later be converted to a work order (`working`/`converted`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[sea_orm(table_name = "orders")]
#[schema(as = Order)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Human-readable code, `{sorted-work-type-codes}-{id}` (e.g. `KW-42`).
    /// Inserted as a placeholder and rewritten once the id is known.
    #[validate(length(min = 1, max = 50))]
    pub code: String,

    pub customer_id: i64,
    pub customer_name: String,
    pub company: Option<String>,
    pub address: Option<String>,
    pub order_status: String,
    pub order_price: Decimal,
    #[sea_orm(column_type = "Json")]
    pub work_types: WorkTypes,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::measurement::Entity")]
    Measurements,
    #[sea_orm(has_many = "super::order_detail::Entity")]
    OrderDetails,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::measurement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Measurements.def()
    }
}

impl Related<super::order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
