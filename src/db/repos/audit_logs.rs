use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    db::error::DbResult,
    models::{AuditLogEntry, AuditLogQuery, CreateAuditLogEntry},
};

#[async_trait]
pub trait AuditLogRepo: Send + Sync {
    /// Append a new audit log entry. Entries are never updated afterwards.
    async fn create(&self, input: CreateAuditLogEntry) -> DbResult<AuditLogEntry>;

    /// List audit log entries matching the query, newest first.
    async fn list(&self, query: AuditLogQuery) -> DbResult<Vec<AuditLogEntry>>;

    /// Count audit log entries matching the query (ignores pagination).
    async fn count(&self, query: AuditLogQuery) -> DbResult<i64>;

    /// Delete entries older than the given cutoff, in batches to avoid
    /// locking the database. Returns the total number of entries deleted.
    ///
    /// This is the audit log's own retention step, invoked only by the
    /// sweeper as its final pass; it is not reachable through the restore
    /// workflow.
    async fn delete_before(&self, cutoff: DateTime<Utc>, batch_size: u32) -> DbResult<u64>;
}
