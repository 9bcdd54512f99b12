use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{DeletedRowRecord, EntityKind, RecordMarker},
};

/// Record-level persistence operations shared by the lifecycle manager and
/// the sweeper.
///
/// All marker writes are guarded UPDATEs and report affected-row counts; the
/// count is the sole success signal under concurrent access — whichever
/// transaction commits first wins, the loser sees zero rows.
#[async_trait]
pub trait RecordRepo: Send + Sync {
    /// Fetch the soft-delete marker pair for a record.
    /// Returns `None` if no row with this id exists.
    async fn find_marker(&self, kind: EntityKind, id: Uuid) -> DbResult<Option<RecordMarker>>;

    /// Set the marker pair on an active record
    /// (`WHERE id = ? AND deleted_at IS NULL`).
    /// Returns the number of rows affected (0 = missing or already deleted).
    async fn mark_deleted(
        &self,
        kind: EntityKind,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> DbResult<u64>;

    /// Clear the marker pair on a soft-deleted record
    /// (`WHERE id = ? AND deleted_at IS NOT NULL`).
    /// Returns the number of rows affected (0 = missing or already active).
    async fn clear_marker(&self, kind: EntityKind, id: Uuid) -> DbResult<u64>;

    /// Read the full record as a JSON object (the kind's snapshot columns).
    /// Returns `None` if no row with this id exists.
    async fn snapshot(&self, kind: EntityKind, id: Uuid) -> DbResult<Option<JsonValue>>;

    /// Permanently delete one record inside a single transaction:
    /// snapshot, cascade deletes over the kind's auxiliary targets in
    /// declared order, the row delete itself, and a `permanent_delete` audit
    /// entry carrying the snapshot. Any failure rolls the whole record back.
    ///
    /// Returns the snapshot, or `None` if the row was already gone (in which
    /// case nothing is written, including the audit entry).
    async fn purge(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor_id: Option<Uuid>,
        reason: Option<String>,
    ) -> DbResult<Option<JsonValue>>;

    /// Soft-deleted rows of a kind, most recently deleted first.
    async fn list_deleted(
        &self,
        kind: EntityKind,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DeletedRowRecord>>;

    /// Ids of rows soft-deleted strictly before the cutoff, oldest first,
    /// capped at `limit`.
    async fn find_purge_eligible(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<Uuid>>;
}
