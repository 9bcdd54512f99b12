use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{audit_logs::insert_audit_row, common::parse_uuid};
use crate::{
    db::{error::DbResult, repos::RecordRepo},
    models::{
        AuditAction, CreateAuditLogEntry, DeletedRowRecord, EntityKind, RecordMarker,
    },
};

pub struct SqliteRecordRepo {
    pool: SqlitePool,
}

impl SqliteRecordRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// SELECT returning the whole row as one JSON object. Column names come
    /// from the closed `EntityKind` registry, never from caller input.
    fn snapshot_sql(kind: EntityKind) -> String {
        let fields = kind
            .columns()
            .iter()
            .map(|c| format!("'{c}', {c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT json_object({fields}) AS snapshot FROM {} WHERE id = ?",
            kind.table()
        )
    }
}

#[async_trait]
impl RecordRepo for SqliteRecordRepo {
    async fn find_marker(&self, kind: EntityKind, id: Uuid) -> DbResult<Option<RecordMarker>> {
        let sql = format!(
            "SELECT deleted_at, deleted_by FROM {} WHERE id = ?",
            kind.table()
        );

        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let deleted_by: Option<String> = row.get("deleted_by");
                Ok(Some(RecordMarker {
                    deleted_at: row.get("deleted_at"),
                    deleted_by: deleted_by.map(|s| parse_uuid(&s)).transpose()?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn mark_deleted(
        &self,
        kind: EntityKind,
        id: Uuid,
        deleted_by: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> DbResult<u64> {
        let sql = format!(
            "UPDATE {} SET deleted_at = ?, deleted_by = ? WHERE id = ? AND deleted_at IS NULL",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(deleted_at)
            .bind(deleted_by.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn clear_marker(&self, kind: EntityKind, id: Uuid) -> DbResult<u64> {
        let sql = format!(
            "UPDATE {} SET deleted_at = NULL, deleted_by = NULL \
             WHERE id = ? AND deleted_at IS NOT NULL",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn snapshot(&self, kind: EntityKind, id: Uuid) -> DbResult<Option<JsonValue>> {
        let row = sqlx::query(&Self::snapshot_sql(kind))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let snapshot: String = row.get("snapshot");
                Ok(Some(serde_json::from_str(&snapshot)?))
            }
            None => Ok(None),
        }
    }

    async fn purge(
        &self,
        kind: EntityKind,
        id: Uuid,
        actor_id: Option<Uuid>,
        reason: Option<String>,
    ) -> DbResult<Option<JsonValue>> {
        let mut tx = self.pool.begin().await?;

        // Snapshot first: it is the forensic record in the audit entry.
        let row = sqlx::query(&Self::snapshot_sql(kind))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            // Already gone (e.g. a concurrent sweep won); nothing to do.
            return Ok(None);
        };
        let snapshot_str: String = row.get("snapshot");
        let snapshot: JsonValue = serde_json::from_str(&snapshot_str)?;

        // Auxiliary rows before the record itself, in declared order.
        for target in kind.cascade_targets() {
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?",
                target.table, target.ref_column
            );
            sqlx::query(&sql)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let entry = CreateAuditLogEntry {
            actor_id,
            action: AuditAction::PermanentDelete,
            target_table: Some(kind.to_string()),
            target_id: Some(id),
            reason,
            metadata: snapshot.clone(),
        };
        insert_audit_row(&mut *tx, Uuid::new_v4(), Utc::now(), &entry).await?;

        tx.commit().await?;

        Ok(Some(snapshot))
    }

    async fn list_deleted(
        &self,
        kind: EntityKind,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DeletedRowRecord>> {
        let sql = format!(
            "SELECT id, deleted_at, deleted_by FROM {} \
             WHERE deleted_at IS NOT NULL \
             ORDER BY deleted_at DESC, id DESC \
             LIMIT ? OFFSET ?",
            kind.table()
        );

        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(DeletedRowRecord {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    deleted_at: row.get("deleted_at"),
                    deleted_by: parse_uuid(&row.get::<String, _>("deleted_by"))?,
                })
            })
            .collect()
    }

    async fn find_purge_eligible(
        &self,
        kind: EntityKind,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<Uuid>> {
        let sql = format!(
            "SELECT id FROM {} \
             WHERE deleted_at IS NOT NULL AND deleted_at < ? \
             ORDER BY deleted_at ASC \
             LIMIT ?",
            kind.table()
        );

        let rows = sqlx::query(&sql)
            .bind(cutoff)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| parse_uuid(&row.get::<String, _>("id")))
            .collect()
    }
}
