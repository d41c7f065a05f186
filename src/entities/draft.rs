use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Autosaved form state, keyed by a caller-chosen string (the order-entry UI
/// uses `workOrderDraft`). Server-side replacement for the browser
/// local-storage autosave.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "drafts")]
#[schema(as = Draft)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub draft_key: String,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Object)]
    pub payload: Json,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
