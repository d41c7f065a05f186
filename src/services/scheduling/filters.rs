use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DetailWithStages, OrderWithDetails};
use crate::entities::{order, order_stage, order_stage_assignment};

/// Active calendar filters. Unset/empty members are vacuously true; an
/// assignment must satisfy every active member (conjunction).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentFilters {
    pub order_id: Option<i64>,
    #[serde(default)]
    pub employee_names: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl AssignmentFilters {
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.employee_names.is_empty() && self.statuses.is_empty()
    }
}

/// Derives the visible assignment subset.
///
/// Stage resolution is a linear scan by `order_stage_id`; order resolution
/// scans every order's details' stages for the stage id, falling back to a
/// match on the stage's `order_detail_id`. Linear scans are fine at weekly
/// calendar scale. An assignment whose stage cannot be resolved is excluded
/// whenever an order or status filter is active — it cannot be attributed to
/// any order or status — but an employee-only filter can still match it.
pub fn visible_assignments(
    assignments: &[order_stage_assignment::Model],
    stages: &[order_stage::Model],
    orders: &[OrderWithDetails],
    filters: &AssignmentFilters,
) -> Vec<order_stage_assignment::Model> {
    if filters.is_empty() {
        return assignments.to_vec();
    }

    assignments
        .iter()
        .filter(|assignment| passes(assignment, stages, orders, filters))
        .cloned()
        .collect()
}

fn passes(
    assignment: &order_stage_assignment::Model,
    stages: &[order_stage::Model],
    orders: &[OrderWithDetails],
    filters: &AssignmentFilters,
) -> bool {
    let stage = resolve_stage(stages, assignment);

    if let Some(wanted) = filters.order_id {
        let Some(stage) = stage else {
            return false;
        };
        match resolve_order(orders, stage) {
            Some(order) if order.id == wanted => {}
            _ => return false,
        }
    }

    if !filters.employee_names.is_empty()
        && !filters
            .employee_names
            .iter()
            .any(|name| name == &assignment.employee_name)
    {
        return false;
    }

    if !filters.statuses.is_empty() {
        let Some(stage) = stage else {
            return false;
        };
        if !filters.statuses.iter().any(|status| status == &stage.status) {
            return false;
        }
    }

    true
}

fn resolve_stage<'a>(
    stages: &'a [order_stage::Model],
    assignment: &order_stage_assignment::Model,
) -> Option<&'a order_stage::Model> {
    let stage_id = assignment.order_stage_id?;
    stages.iter().find(|stage| stage.id == stage_id)
}

fn resolve_order<'a>(
    orders: &'a [OrderWithDetails],
    stage: &order_stage::Model,
) -> Option<&'a order::Model> {
    orders
        .iter()
        .find(|candidate| {
            matches_by_stage_id(&candidate.details, stage)
                || matches_by_detail_id(&candidate.details, stage)
        })
        .map(|candidate| &candidate.order)
}

fn matches_by_stage_id(details: &[DetailWithStages], stage: &order_stage::Model) -> bool {
    details
        .iter()
        .any(|detail| detail.stages.iter().any(|s| s.id == stage.id))
}

fn matches_by_detail_id(details: &[DetailWithStages], stage: &order_stage::Model) -> bool {
    details
        .iter()
        .any(|detail| detail.detail.detail_id == stage.order_detail_id)
}
