//! Retention sweeper: permanently deletes purge-eligible records across all
//! entity types, children before parents, with per-table failure isolation.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::RetentionConfig,
    db::{DbPool, DbResult},
    models::{AuditAction, CreateAuditLogEntry, EntityKind},
};

/// What initiated a sweep run.
#[derive(Debug, Clone)]
pub enum SweepTrigger {
    /// Fired by the recurring scheduler.
    Scheduled,
    /// Requested by an administrator.
    Manual {
        actor_id: Uuid,
        reason: Option<String>,
    },
}

impl SweepTrigger {
    fn actor_id(&self) -> Option<Uuid> {
        match self {
            SweepTrigger::Scheduled => None,
            SweepTrigger::Manual { actor_id, .. } => Some(*actor_id),
        }
    }

    fn reason(&self) -> Option<String> {
        match self {
            SweepTrigger::Scheduled => None,
            SweepTrigger::Manual { reason, .. } => reason.clone(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SweepTrigger::Scheduled => "scheduled",
            SweepTrigger::Manual { .. } => "manual",
        }
    }
}

/// A per-table failure captured during a sweep.
#[derive(Debug, Clone)]
pub struct SweepTableError {
    pub kind: EntityKind,
    pub message: String,
}

/// Results from a single sweep run.
#[derive(Debug)]
pub struct SweepReport {
    /// Records purged, keyed by entity kind name.
    pub purged: BTreeMap<String, u64>,
    /// Per-table failures; the sweep continued past each of them.
    pub errors: Vec<SweepTableError>,
    /// Audit log entries removed by the final self-purge step.
    pub audit_entries_purged: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SweepReport {
    /// Total records purged across all tables.
    pub fn total_purged(&self) -> u64 {
        self.purged.values().sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Outcome of a sweep request. A request while another sweep holds the gate
/// is a logged no-op, not an error.
#[derive(Debug)]
pub enum SweepOutcome {
    Completed(SweepReport),
    AlreadyRunning,
}

/// Point-in-time view of the sweeper for status endpoints.
#[derive(Debug, Clone)]
pub struct SweepStatus {
    pub running: bool,
    pub last_completed: Option<DateTime<Utc>>,
    pub next_scheduled: DateTime<Utc>,
}

/// The retention sweeper.
///
/// `gate` is the subsystem's only mutual-exclusion primitive: it serializes
/// sweep runs (at most one globally) but never blocks record-level lifecycle
/// calls, which rely on row-level guarded writes instead.
pub struct Sweeper {
    db: Arc<DbPool>,
    retention: RetentionConfig,
    gate: tokio::sync::Mutex<()>,
    last_completed: tokio::sync::RwLock<Option<DateTime<Utc>>>,
}

impl Sweeper {
    pub fn new(db: Arc<DbPool>, retention: RetentionConfig) -> Self {
        Self {
            db,
            retention,
            gate: tokio::sync::Mutex::new(()),
            last_completed: tokio::sync::RwLock::new(None),
        }
    }

    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }

    /// Run one sweep. Administrators and the scheduler share this code path.
    pub async fn run(&self, trigger: SweepTrigger) -> DbResult<SweepOutcome> {
        // try_lock is the in-progress flag; the guard releases the gate on
        // every exit path, including early returns and panics.
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::info!(trigger = trigger.label(), "Sweep already in progress, skipping");
            return Ok(SweepOutcome::AlreadyRunning);
        };

        let started_at = Utc::now();
        let cutoff = started_at - self.retention.window();

        tracing::info!(
            trigger = trigger.label(),
            cutoff = %cutoff,
            "Starting retention sweep"
        );

        self.db
            .audit_logs()
            .create(CreateAuditLogEntry {
                actor_id: trigger.actor_id(),
                action: AuditAction::SweepStart,
                target_table: None,
                target_id: None,
                reason: trigger.reason(),
                metadata: json!({
                    "trigger": trigger.label(),
                    "cutoff": cutoff,
                }),
            })
            .await?;

        let mut report = SweepReport {
            purged: BTreeMap::new(),
            errors: Vec::new(),
            audit_entries_purged: 0,
            started_at,
            finished_at: started_at,
        };

        for kind in EntityKind::SWEEP_ORDER {
            match self.sweep_kind(kind, cutoff).await {
                Ok(purged) => {
                    if purged > 0 {
                        tracing::info!(kind = %kind, purged, "Swept entity type");
                    }
                    report.purged.insert(kind.to_string(), purged);
                }
                Err(e) => {
                    // Best-effort per table: record the failure and move on.
                    // The affected records stay purge-eligible and are picked
                    // up by the next sweep.
                    tracing::error!(kind = %kind, error = %e, "Sweep failed for entity type");
                    let entry = CreateAuditLogEntry {
                        actor_id: None,
                        action: AuditAction::SweepError,
                        target_table: Some(kind.to_string()),
                        target_id: None,
                        reason: None,
                        metadata: json!({ "error": e.to_string() }),
                    };
                    if let Err(audit_err) = self.db.audit_logs().create(entry).await {
                        tracing::error!(error = %audit_err, "Failed to record sweep error");
                    }
                    report.errors.push(SweepTableError {
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        // Final, self-referential step: the audit log's own retention. Not
        // subject to the restore workflow.
        let audit_cutoff = started_at - self.retention.audit_window();
        match self
            .db
            .audit_logs()
            .delete_before(audit_cutoff, self.retention.batch_size)
            .await
        {
            Ok(purged) => report.audit_entries_purged = purged,
            Err(e) => {
                tracing::error!(error = %e, "Audit log self-purge failed");
                let entry = CreateAuditLogEntry {
                    actor_id: None,
                    action: AuditAction::SweepError,
                    target_table: Some("audit_logs".to_string()),
                    target_id: None,
                    reason: None,
                    metadata: json!({ "error": e.to_string() }),
                };
                if let Err(audit_err) = self.db.audit_logs().create(entry).await {
                    tracing::error!(error = %audit_err, "Failed to record sweep error");
                }
            }
        }

        report.finished_at = Utc::now();

        self.db
            .audit_logs()
            .create(CreateAuditLogEntry {
                actor_id: trigger.actor_id(),
                action: AuditAction::SweepComplete,
                target_table: None,
                target_id: None,
                reason: None,
                metadata: json!({
                    "purged": &report.purged,
                    "errors": report.errors.len(),
                    "audit_entries_purged": report.audit_entries_purged,
                }),
            })
            .await?;

        *self.last_completed.write().await = Some(report.finished_at);

        tracing::info!(
            total_purged = report.total_purged(),
            errors = report.errors.len(),
            audit_entries_purged = report.audit_entries_purged,
            "Retention sweep complete"
        );

        Ok(SweepOutcome::Completed(report))
    }

    /// Manual trigger: same algorithm as the scheduler, with the requesting
    /// actor recorded in the `sweep_start` entry.
    pub async fn manual_sweep(
        &self,
        actor_id: Uuid,
        reason: Option<String>,
    ) -> DbResult<SweepOutcome> {
        self.run(SweepTrigger::Manual { actor_id, reason }).await
    }

    /// Current sweeper state: in-progress flag, last completed run, and the
    /// next scheduled run time.
    pub async fn status(&self) -> SweepStatus {
        SweepStatus {
            running: self.gate.try_lock().is_err(),
            last_completed: *self.last_completed.read().await,
            next_scheduled: self.retention.next_sweep_after(Utc::now()),
        }
    }

    /// Purge every record of one kind whose deletion age exceeds the window.
    /// Each record's cascade-and-delete is its own transaction; an error here
    /// aborts only this kind's pass.
    async fn sweep_kind(&self, kind: EntityKind, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let batch = self.retention.batch_size as i64;
        let mut total: u64 = 0;

        loop {
            let ids = self
                .db
                .records()
                .find_purge_eligible(kind, cutoff, batch)
                .await?;
            let fetched = ids.len();

            for id in ids {
                // None = already gone (idempotent: a resumed or racing sweep
                // simply finds nothing).
                if self.db.records().purge(kind, id, None, None).await?.is_some() {
                    total += 1;
                }
            }

            if (fetched as i64) < batch {
                break;
            }
        }

        Ok(total)
    }
}
