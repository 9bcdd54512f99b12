//! Lifecycle manager: per-record soft delete, restore, permanent delete, and
//! deleted-record listing.
//!
//! Every state transition is recorded in the append-only audit log. Marker
//! writes are guarded UPDATEs; the affected-row count is the sole success
//! signal, which is what resolves races with a concurrently running sweep
//! (whichever transaction commits first wins).

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::RetentionConfig,
    db::{DbError, DbPool},
    models::{AuditAction, CreateAuditLogEntry, DeletedRecord, EntityKind},
};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("{kind} {id} is already deleted")]
    AlreadyDeleted { kind: EntityKind, id: Uuid },

    #[error("restore window expired for {kind} {id} (deleted {deleted_at}, window {window_days} days)")]
    RestoreWindowExpired {
        kind: EntityKind,
        id: Uuid,
        deleted_at: chrono::DateTime<Utc>,
        window_days: u32,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Outcome of a restore call. Restoring an already-active record is an
/// idempotent no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    AlreadyActive,
}

/// Per-record lifecycle operations over the typed entity registry.
pub struct LifecycleManager {
    db: Arc<DbPool>,
    retention: RetentionConfig,
}

impl LifecycleManager {
    pub fn new(db: Arc<DbPool>, retention: RetentionConfig) -> Self {
        Self { db, retention }
    }

    /// Mark a record deleted without touching its dependents.
    ///
    /// Cascading removal happens only at permanent-delete time, so a
    /// soft-deleted parent still has its (soft-deleted or active) children
    /// and auxiliary rows in place.
    pub async fn soft_delete(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> LifecycleResult<()> {
        let marker = self
            .db
            .records()
            .find_marker(kind, id)
            .await?
            .ok_or(LifecycleError::NotFound { kind, id })?;

        if marker.is_deleted() {
            return Err(LifecycleError::AlreadyDeleted { kind, id });
        }

        let now = Utc::now();
        let affected = self
            .db
            .records()
            .mark_deleted(kind, id, actor_id, now)
            .await?;
        if affected == 0 {
            // Another caller marked it between our read and write.
            return Err(LifecycleError::AlreadyDeleted { kind, id });
        }

        self.db
            .audit_logs()
            .create(CreateAuditLogEntry {
                actor_id: Some(actor_id),
                action: AuditAction::SoftDelete,
                target_table: Some(kind.to_string()),
                target_id: Some(id),
                reason,
                metadata: json!({}),
            })
            .await?;

        tracing::info!(kind = %kind, id = %id, actor = %actor_id, "Record soft-deleted");
        Ok(())
    }

    /// Return a soft-deleted record to active, if its deletion age is still
    /// within the retention window.
    ///
    /// The window is enforced logically: a record deleted 61 days ago is not
    /// restorable even if no sweep has physically purged it yet.
    pub async fn restore(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> LifecycleResult<RestoreOutcome> {
        let marker = self
            .db
            .records()
            .find_marker(kind, id)
            .await?
            .ok_or(LifecycleError::NotFound { kind, id })?;

        let Some(deleted_at) = marker.deleted_at else {
            tracing::debug!(kind = %kind, id = %id, "Restore of active record is a no-op");
            return Ok(RestoreOutcome::AlreadyActive);
        };

        let now = Utc::now();
        if now - deleted_at > self.retention.window() {
            return Err(LifecycleError::RestoreWindowExpired {
                kind,
                id,
                deleted_at,
                window_days: self.retention.window_days,
            });
        }

        let affected = self.db.records().clear_marker(kind, id).await?;
        if affected == 0 {
            // A concurrent sweep purged the row between our read and write.
            return Err(LifecycleError::NotFound { kind, id });
        }

        self.db
            .audit_logs()
            .create(CreateAuditLogEntry {
                actor_id: Some(actor_id),
                action: AuditAction::Restore,
                target_table: Some(kind.to_string()),
                target_id: Some(id),
                reason,
                metadata: json!({}),
            })
            .await?;

        tracing::info!(kind = %kind, id = %id, actor = %actor_id, "Record restored");
        Ok(RestoreOutcome::Restored)
    }

    /// Remove a record and its auxiliary rows for good, active or not.
    ///
    /// Snapshot, cascades, the row delete, and the audit entry all commit in
    /// one transaction (see `RecordRepo::purge`). Returns the pre-deletion
    /// snapshot for the caller.
    pub async fn permanent_delete(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor_id: Option<Uuid>,
        reason: Option<String>,
    ) -> LifecycleResult<JsonValue> {
        let snapshot = self
            .db
            .records()
            .purge(kind, id, actor_id, reason)
            .await?
            .ok_or(LifecycleError::NotFound { kind, id })?;

        tracing::info!(
            kind = %kind,
            id = %id,
            actor = actor_id.map(|a| a.to_string()).as_deref().unwrap_or("system"),
            "Record permanently deleted"
        );
        Ok(snapshot)
    }

    /// Soft-deleted records of a kind, most recently deleted first, annotated
    /// with deletion age and restorability. `page` is 1-based.
    pub async fn list_deleted(
        &self,
        kind: EntityKind,
        page: i64,
        limit: i64,
    ) -> LifecycleResult<Vec<DeletedRecord>> {
        let limit = limit.max(1);
        let offset = (page.max(1) - 1) * limit;

        let rows = self.db.records().list_deleted(kind, limit, offset).await?;

        let now = Utc::now();
        let window = self.retention.window();
        Ok(rows
            .into_iter()
            .map(|row| DeletedRecord::annotate(row, now, window))
            .collect())
    }
}
