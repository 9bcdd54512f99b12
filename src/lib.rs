//! Soft-delete lifecycle and retention-sweep engine.
//!
//! Records in a closed set of entity tables carry a `deleted_at`/`deleted_by`
//! marker pair. Soft-deleted records stay fully intact and restorable for a
//! configurable window (60 days by default); a daily sweeper then permanently
//! removes expired records together with their auxiliary rows, children
//! before parents. Every lifecycle transition lands in an append-only audit
//! log with its own, longer retention.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reclaim::{
//!     config::EngineConfig,
//!     db::DbPool,
//!     lifecycle::LifecycleManager,
//!     sweep::{Sweeper, start_sweep_worker},
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_file("reclaim.toml")?;
//! let db = Arc::new(DbPool::from_config(&config.database).await?);
//! db.run_migrations().await?;
//!
//! let lifecycle = LifecycleManager::new(Arc::clone(&db), config.retention.clone());
//! let sweeper = Arc::new(Sweeper::new(db, config.retention));
//!
//! let shutdown = CancellationToken::new();
//! start_sweep_worker(Arc::clone(&sweeper), shutdown.clone());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod sweep;

pub use config::EngineConfig;
pub use db::DbPool;
pub use lifecycle::{LifecycleError, LifecycleManager, RestoreOutcome};
pub use models::EntityKind;
pub use sweep::{SweepOutcome, Sweeper};
