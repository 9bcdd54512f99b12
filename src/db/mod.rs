mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    records: Arc<dyn RecordRepo>,
    audit_logs: Arc<dyn AuditLogRepo>,
}

/// SQLite-backed database pool.
///
/// Repositories are cached at construction time to avoid allocation on each
/// access.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            records: Arc::new(sqlite::SqliteRecordRepo::new(pool.clone())),
            audit_logs: Arc::new(sqlite::SqliteAuditLogRepo::new(pool.clone())),
        };
        DbPool { pool, repos }
    }

    /// Create a database pool from configuration
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(config.create_if_missing)
                    .journal_mode(if config.wal_mode {
                        sqlx::sqlite::SqliteJournalMode::Wal
                    } else {
                        sqlx::sqlite::SqliteJournalMode::Delete
                    })
                    .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms)),
            )
            .await?;

        Ok(Self::from_sqlite(pool))
    }

    /// Run database migrations using sqlx's migration runner.
    /// This automatically creates and manages a _sqlx_migrations table.
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Get record repository
    pub fn records(&self) -> Arc<dyn RecordRepo> {
        Arc::clone(&self.repos.records)
    }

    /// Get audit log repository
    pub fn audit_logs(&self) -> Arc<dyn AuditLogRepo> {
        Arc::clone(&self.repos.audit_logs)
    }

    /// Get a reference to the underlying pool.
    /// Useful for operations that need direct pool access.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
