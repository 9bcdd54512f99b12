use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Lifecycle transition recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A record was marked deleted
    SoftDelete,
    /// A soft-deleted record was returned to active
    Restore,
    /// A record and its auxiliary rows were removed
    PermanentDelete,
    /// A sweep run began
    SweepStart,
    /// A sweep run finished
    SweepComplete,
    /// One entity type's pass failed during a sweep
    SweepError,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::SoftDelete => write!(f, "soft_delete"),
            AuditAction::Restore => write!(f, "restore"),
            AuditAction::PermanentDelete => write!(f, "permanent_delete"),
            AuditAction::SweepStart => write!(f, "sweep_start"),
            AuditAction::SweepComplete => write!(f, "sweep_complete"),
            AuditAction::SweepError => write!(f, "sweep_error"),
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft_delete" => Ok(AuditAction::SoftDelete),
            "restore" => Ok(AuditAction::Restore),
            "permanent_delete" => Ok(AuditAction::PermanentDelete),
            "sweep_start" => Ok(AuditAction::SweepStart),
            "sweep_complete" => Ok(AuditAction::SweepComplete),
            "sweep_error" => Ok(AuditAction::SweepError),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

/// An immutable audit log entry recording one lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique identifier for this entry
    pub id: Uuid,
    /// Actor that triggered the transition (None = system, e.g. the sweeper)
    pub actor_id: Option<Uuid>,
    /// The transition recorded
    pub action: AuditAction,
    /// Entity kind affected (None for system-level sweep entries)
    pub target_table: Option<String>,
    /// Record affected (None for system-level entries)
    pub target_id: Option<Uuid>,
    /// Optional free-text reason supplied by the caller
    pub reason: Option<String>,
    /// Opaque structured payload (pre-deletion snapshot, sweep counts, ...)
    pub metadata: JsonValue,
    /// When the transition occurred
    pub created_at: DateTime<Utc>,
}

/// Input for appending a new audit log entry
#[derive(Debug, Clone)]
pub struct CreateAuditLogEntry {
    /// Actor that triggered the transition (None = system)
    pub actor_id: Option<Uuid>,
    /// The transition to record
    pub action: AuditAction,
    /// Entity kind affected, if any
    pub target_table: Option<String>,
    /// Record affected, if any
    pub target_id: Option<Uuid>,
    /// Optional free-text reason
    pub reason: Option<String>,
    /// Opaque structured payload
    pub metadata: JsonValue,
}

/// Filter for listing audit log entries
#[derive(Debug, Clone, Default)]
pub struct AuditLogQuery {
    /// Filter by action
    pub action: Option<AuditAction>,
    /// Filter by affected entity kind
    pub target_table: Option<String>,
    /// Filter by affected record
    pub target_id: Option<Uuid>,
    /// Filter by actor
    pub actor_id: Option<Uuid>,
    /// Maximum entries to return (default 100)
    pub limit: Option<i64>,
    /// Entries to skip
    pub offset: Option<i64>,
}
