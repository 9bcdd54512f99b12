use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::AuditLogRepo,
    },
    models::{AuditAction, AuditLogEntry, AuditLogQuery, CreateAuditLogEntry},
};

/// Append one audit row through the given executor.
///
/// Shared between the audit repo's `create` and the record repo's `purge`,
/// which writes its `permanent_delete` entry inside the purge transaction.
pub(super) async fn insert_audit_row<'e, E>(
    executor: E,
    id: Uuid,
    created_at: DateTime<Utc>,
    input: &CreateAuditLogEntry,
) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let metadata_json = serde_json::to_string(&input.metadata)?;

    sqlx::query(
        r#"
        INSERT INTO audit_logs (
            id, actor_id, action, target_table, target_id,
            reason, metadata, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(input.actor_id.map(|a| a.to_string()))
    .bind(input.action.to_string())
    .bind(input.target_table.as_deref())
    .bind(input.target_id.map(|t| t.to_string()))
    .bind(input.reason.as_deref())
    .bind(metadata_json)
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub struct SqliteAuditLogRepo {
    pool: SqlitePool,
}

impl SqliteAuditLogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_action(s: &str) -> DbResult<AuditAction> {
        s.parse().map_err(DbError::Internal)
    }

    fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> DbResult<AuditLogEntry> {
        let actor_id: Option<String> = row.get("actor_id");
        let target_id: Option<String> = row.get("target_id");
        let metadata_str: String = row.get("metadata");

        Ok(AuditLogEntry {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            actor_id: actor_id.map(|s| parse_uuid(&s)).transpose()?,
            action: Self::parse_action(&row.get::<String, _>("action"))?,
            target_table: row.get("target_table"),
            target_id: target_id.map(|s| parse_uuid(&s)).transpose()?,
            reason: row.get("reason"),
            metadata: serde_json::from_str(&metadata_str)?,
            created_at: row.get("created_at"),
        })
    }

    fn build_conditions(query: &AuditLogQuery) -> (Vec<&'static str>, Vec<String>) {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(action) = &query.action {
            conditions.push("action = ?");
            params.push(action.to_string());
        }
        if let Some(target_table) = &query.target_table {
            conditions.push("target_table = ?");
            params.push(target_table.clone());
        }
        if let Some(target_id) = &query.target_id {
            conditions.push("target_id = ?");
            params.push(target_id.to_string());
        }
        if let Some(actor_id) = &query.actor_id {
            conditions.push("actor_id = ?");
            params.push(actor_id.to_string());
        }

        (conditions, params)
    }
}

#[async_trait]
impl AuditLogRepo for SqliteAuditLogRepo {
    async fn create(&self, input: CreateAuditLogEntry) -> DbResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        insert_audit_row(&self.pool, id, now, &input).await?;

        Ok(AuditLogEntry {
            id,
            actor_id: input.actor_id,
            action: input.action,
            target_table: input.target_table,
            target_id: input.target_id,
            reason: input.reason,
            metadata: input.metadata,
            created_at: now,
        })
    }

    async fn list(&self, query: AuditLogQuery) -> DbResult<Vec<AuditLogEntry>> {
        let limit = query.limit.unwrap_or(100);
        let offset = query.offset.unwrap_or(0);

        let (conditions, params) = Self::build_conditions(&query);
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT id, actor_id, action, target_table, target_id,
                   reason, metadata, created_at
            FROM audit_logs
            {}
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            where_clause
        );

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }
        query_builder = query_builder.bind(limit).bind(offset);

        let rows = query_builder.fetch_all(&self.pool).await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn count(&self, query: AuditLogQuery) -> DbResult<i64> {
        let (conditions, params) = Self::build_conditions(&query);
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT COUNT(*) as count FROM audit_logs {}", where_clause);

        let mut query_builder = sqlx::query(&sql);
        for param in &params {
            query_builder = query_builder.bind(param);
        }

        let row = query_builder.fetch_one(&self.pool).await?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>, batch_size: u32) -> DbResult<u64> {
        let mut total_deleted: u64 = 0;

        loop {
            // Delete a batch using a subquery to select ids
            let result = sqlx::query(
                r#"
                DELETE FROM audit_logs
                WHERE id IN (
                    SELECT id FROM audit_logs
                    WHERE created_at < ?
                    LIMIT ?
                )
                "#,
            )
            .bind(cutoff)
            .bind(batch_size as i64)
            .execute(&self.pool)
            .await?;

            let rows_deleted = result.rows_affected();
            total_deleted += rows_deleted;

            if rows_deleted < batch_size as u64 {
                break;
            }
        }

        Ok(total_deleted)
    }
}
