use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::filters::{visible_assignments, AssignmentFilters};
use super::normalizer::{normalize, CalendarData, CalendarRow};
use super::{AssignmentChanges, NewAssignment, OrderWithDetails};
use crate::entities::order_stage_assignment;
use crate::errors::ServiceError;

/// Persistence seam for the calendar. `SchedulingService` is the production
/// implementation; tests substitute fakes.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Joined calendar rows for the inclusive `[from, to]` window.
    async fn fetch_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarRow>, ServiceError>;

    /// Bare assignment rows for the same window, without the join. Fetched
    /// alongside `fetch_calendar` to cross-check the join result.
    async fn fetch_assignments(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<order_stage_assignment::Model>, ServiceError>;

    async fn create_assignment(
        &self,
        new: NewAssignment,
    ) -> Result<order_stage_assignment::Model, ServiceError>;

    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<order_stage_assignment::Model, ServiceError>;

    async fn delete_assignment(&self, id: i64) -> Result<(), ServiceError>;
}

/// In-memory calendar state for one viewer, kept consistent with the backend
/// by applying every mutation there first and touching local state only after
/// the backend acknowledged it.
///
/// Loads carry a generation ticket taken before the fetch; a load that
/// finishes after a newer load began discards its result, so a stale window
/// can never overwrite a fresh one.
pub struct AssignmentStore {
    backend: Arc<dyn CalendarBackend>,
    state: RwLock<CalendarData>,
    generation: AtomicU64,
}

impl AssignmentStore {
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(CalendarData::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces local state with the normalized calendar for `[from, to]`.
    /// Returns `false` when a newer load superseded this one and the result
    /// was discarded.
    ///
    /// The joined fetch and a bare assignment fetch run concurrently; rows
    /// the join dropped are logged, never treated as errors.
    pub async fn load(&self, from: NaiveDate, to: NaiveDate) -> Result<bool, ServiceError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (rows, raw) = tokio::try_join!(
            self.backend.fetch_calendar(from, to),
            self.backend.fetch_assignments(from, to),
        )?;
        let data = normalize(rows);
        cross_validate(&raw, &data);

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "calendar load superseded, discarding result");
            return Ok(false);
        }
        *state = data;
        Ok(true)
    }

    /// Persists a new assignment and appends it to local state. Requires a
    /// stage reference and a non-blank employee name; the work date is
    /// guaranteed by the type.
    pub async fn add(
        &self,
        new: NewAssignment,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        if new.order_stage_id.is_none() {
            return Err(ServiceError::ValidationError(
                "order_stage_id is required".to_string(),
            ));
        }
        if new.employee_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "employee_name is required".to_string(),
            ));
        }

        let created = self.backend.create_assignment(new).await?;
        let mut state = self.state.write().await;
        state.assignments.push(created.clone());
        Ok(created)
    }

    /// Persists a partial update and merges the returned row into local state
    /// by id. An id outside the loaded window updates the backend only.
    pub async fn update(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<order_stage_assignment::Model, ServiceError> {
        let updated = self.backend.update_assignment(id, changes).await?;
        let mut state = self.state.write().await;
        if let Some(slot) = state.assignments.iter_mut().find(|a| a.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Deletes from the backend, then prunes local state.
    pub async fn remove(&self, id: i64) -> Result<(), ServiceError> {
        self.backend.delete_assignment(id).await?;
        let mut state = self.state.write().await;
        state.assignments.retain(|a| a.id != id);
        Ok(())
    }

    pub async fn snapshot(&self) -> CalendarData {
        self.state.read().await.clone()
    }

    /// Applies `filters` to the loaded assignments. `orders` supplies the
    /// order-resolution context (working orders with their details and
    /// stages), which is fetched separately from the calendar window.
    pub async fn visible(
        &self,
        orders: &[OrderWithDetails],
        filters: &AssignmentFilters,
    ) -> Vec<order_stage_assignment::Model> {
        let state = self.state.read().await;
        visible_assignments(&state.assignments, &state.stages, orders, filters)
    }
}

/// Assignments the bare fetch returned but the join dropped are a
/// data-integrity smell; surface them without failing the load.
fn cross_validate(raw: &[order_stage_assignment::Model], data: &CalendarData) {
    let normalized: HashSet<i64> = data.assignments.iter().map(|a| a.id).collect();
    let missing: Vec<i64> = raw
        .iter()
        .map(|a| a.id)
        .filter(|id| !normalized.contains(id))
        .collect();
    if !missing.is_empty() {
        warn!(
            assignment_ids = ?missing,
            "assignments present in the raw window fetch are missing from the calendar join"
        );
    }
}
