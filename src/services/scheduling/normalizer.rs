use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{order, order_detail, order_stage, order_stage_assignment};

/// One raw row of the windowed calendar join: an assignment carrying its
/// stage, which carries its order detail, which carries its order. Every
/// nested level is optional — a null foreign key or an unmatched join leaves
/// the chain broken at that point, which is a valid state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub assignment: order_stage_assignment::Model,
    pub stage: Option<StageRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRow {
    pub stage: order_stage::Model,
    pub detail: Option<DetailRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub detail: order_detail::Model,
    pub order: Option<order::Model>,
}

/// An order as the calendar consumes it: the order row plus the one detail
/// first encountered for it during normalization. An order can in theory own
/// several details; keeping only the first is a deliberate simplification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedOrder {
    #[serde(flatten)]
    pub order: order::Model,
    pub order_details: Vec<order_detail::Model>,
}

/// The three flat collections the calendar works from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarData {
    pub assignments: Vec<order_stage_assignment::Model>,
    pub stages: Vec<order_stage::Model>,
    pub orders: Vec<NormalizedOrder>,
}

/// Flattens the nested join response into deduplicated collections.
///
/// Every input row contributes its assignment, in input order. Stages are
/// deduplicated by id, first occurrence wins even when later duplicates
/// differ. Orders are deduplicated by id and retain the detail of the first
/// row that reached them. A chain broken at any level contributes whatever
/// sits above the break and nothing below it.
pub fn normalize(rows: Vec<CalendarRow>) -> CalendarData {
    let mut assignments = Vec::with_capacity(rows.len());
    let mut stages = Vec::new();
    let mut orders = Vec::new();
    let mut seen_stages = HashSet::new();
    let mut seen_orders = HashSet::new();

    for row in rows {
        assignments.push(row.assignment);

        let Some(StageRow { stage, detail }) = row.stage else {
            continue;
        };
        if seen_stages.insert(stage.id) {
            stages.push(stage);
        }

        let Some(DetailRow { detail, order }) = detail else {
            continue;
        };
        let Some(order) = order else {
            continue;
        };
        if seen_orders.insert(order.id) {
            orders.push(NormalizedOrder {
                order,
                order_details: vec![detail],
            });
        }
    }

    CalendarData {
        assignments,
        stages,
        orders,
    }
}
