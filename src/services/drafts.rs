use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value as JsonValue;
use slog::Logger;
use tracing::{error, instrument, warn};

use crate::db::DbPool;
use crate::entities::draft;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Storage seam for autosaved form drafts. The server runs on the database
/// implementation; tests and embedded callers can use the in-memory one.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, key: &str, payload: JsonValue) -> Result<draft::Model, ServiceError>;
    async fn load(&self, key: &str) -> Result<Option<draft::Model>, ServiceError>;
    /// Returns whether a draft was actually removed.
    async fn clear(&self, key: &str) -> Result<bool, ServiceError>;
}

/// Drafts persisted in the `drafts` table, one row per key.
pub struct DbDraftStore {
    db_pool: Arc<DbPool>,
}

impl DbDraftStore {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DraftStore for DbDraftStore {
    async fn save(&self, key: &str, payload: JsonValue) -> Result<draft::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = draft::Entity::find_by_id(key.to_string())
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, key, "Failed to look up draft");
                ServiceError::DatabaseError(e)
            })?;

        let now = Utc::now();
        let saved = match existing {
            Some(found) => {
                let mut active: draft::ActiveModel = found.into();
                active.payload = Set(payload);
                active.updated_at = Set(now);
                active.update(db).await.map_err(|e| {
                    error!(error = %e, key, "Failed to update draft");
                    ServiceError::DatabaseError(e)
                })?
            }
            None => draft::ActiveModel {
                draft_key: Set(key.to_string()),
                payload: Set(payload),
                updated_at: Set(now),
            }
            .insert(db)
            .await
            .map_err(|e| {
                error!(error = %e, key, "Failed to insert draft");
                ServiceError::DatabaseError(e)
            })?,
        };
        Ok(saved)
    }

    async fn load(&self, key: &str) -> Result<Option<draft::Model>, ServiceError> {
        let db = &*self.db_pool;
        draft::Entity::find_by_id(key.to_string())
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, key, "Failed to load draft");
                ServiceError::DatabaseError(e)
            })
    }

    async fn clear(&self, key: &str) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        let result = draft::Entity::delete_by_id(key.to_string())
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, key, "Failed to clear draft");
                ServiceError::DatabaseError(e)
            })?;
        Ok(result.rows_affected > 0)
    }
}

/// Drafts kept in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: DashMap<String, draft::Model>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn save(&self, key: &str, payload: JsonValue) -> Result<draft::Model, ServiceError> {
        let model = draft::Model {
            draft_key: key.to_string(),
            payload,
            updated_at: Utc::now(),
        };
        self.drafts.insert(key.to_string(), model.clone());
        Ok(model)
    }

    async fn load(&self, key: &str) -> Result<Option<draft::Model>, ServiceError> {
        Ok(self.drafts.get(key).map(|entry| entry.clone()))
    }

    async fn clear(&self, key: &str) -> Result<bool, ServiceError> {
        Ok(self.drafts.remove(key).is_some())
    }
}

/// Draft autosave over a pluggable [`DraftStore`].
#[derive(Clone)]
pub struct DraftService {
    store: Arc<dyn DraftStore>,
    event_sender: Option<Arc<EventSender>>,
    logger: Logger,
}

impl DraftService {
    pub fn new(
        store: Arc<dyn DraftStore>,
        event_sender: Option<Arc<EventSender>>,
        logger: Logger,
    ) -> Self {
        Self {
            store,
            event_sender,
            logger,
        }
    }

    /// Saves (or overwrites) the draft under `key`.
    #[instrument(skip(self, payload))]
    pub async fn save_draft(
        &self,
        key: &str,
        payload: JsonValue,
    ) -> Result<draft::Model, ServiceError> {
        if key.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Draft key cannot be blank".to_string(),
            ));
        }
        let saved = self.store.save(key, payload).await?;
        slog::debug!(self.logger, "Draft saved"; "key" => key.to_string());
        self.notify(Event::DraftSaved(key.to_string())).await;
        Ok(saved)
    }

    /// Loads the draft under `key`; absent drafts are a `NotFound`.
    #[instrument(skip(self))]
    pub async fn load_draft(&self, key: &str) -> Result<draft::Model, ServiceError> {
        self.store
            .load(key)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Draft '{}' not found", key)))
    }

    /// Removes the draft under `key`. Clearing an absent draft is not an
    /// error; the return value says whether anything was removed.
    #[instrument(skip(self))]
    pub async fn clear_draft(&self, key: &str) -> Result<bool, ServiceError> {
        let removed = self.store.clear(key).await?;
        if removed {
            slog::debug!(self.logger, "Draft cleared"; "key" => key.to_string());
            self.notify(Event::DraftCleared(key.to_string())).await;
        }
        Ok(removed)
    }

    async fn notify(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send draft event");
            }
        }
    }
}
