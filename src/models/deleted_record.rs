use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The soft-delete marker pair as stored on a participating row.
///
/// Invariant (enforced by the lifecycle operations, asserted in tests):
/// `deleted_by` is set if and only if `deleted_at` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMarker {
    /// When the record was soft-deleted (None = active)
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who soft-deleted it
    pub deleted_by: Option<Uuid>,
}

impl RecordMarker {
    /// Whether the record is currently soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Raw soft-deleted row as returned by the record repository.
#[derive(Debug, Clone)]
pub struct DeletedRowRecord {
    pub id: Uuid,
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: Uuid,
}

/// A soft-deleted record annotated for callers of `list_deleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedRecord {
    /// Record identifier
    pub id: Uuid,
    /// When the record was soft-deleted
    pub deleted_at: DateTime<Utc>,
    /// Actor that soft-deleted it
    pub deleted_by: Uuid,
    /// Whole days since deletion
    pub age_days: i64,
    /// Whether the record is still within the retention window
    pub restorable: bool,
}

impl DeletedRecord {
    /// Annotate a raw row with deletion age and restorability relative to
    /// `now` and the retention window.
    pub fn annotate(row: DeletedRowRecord, now: DateTime<Utc>, window: Duration) -> Self {
        let age = now - row.deleted_at;
        DeletedRecord {
            id: row.id,
            deleted_at: row.deleted_at,
            deleted_by: row.deleted_by,
            age_days: age.num_days(),
            restorable: age <= window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_within_window() {
        let now = Utc::now();
        let row = DeletedRowRecord {
            id: Uuid::new_v4(),
            deleted_at: now - Duration::days(10),
            deleted_by: Uuid::new_v4(),
        };

        let annotated = DeletedRecord::annotate(row, now, Duration::days(60));
        assert_eq!(annotated.age_days, 10);
        assert!(annotated.restorable);
    }

    #[test]
    fn test_annotate_past_window() {
        let now = Utc::now();
        let row = DeletedRowRecord {
            id: Uuid::new_v4(),
            deleted_at: now - Duration::days(61),
            deleted_by: Uuid::new_v4(),
        };

        let annotated = DeletedRecord::annotate(row, now, Duration::days(60));
        assert_eq!(annotated.age_days, 61);
        assert!(!annotated.restorable);
    }

    #[test]
    fn test_annotate_exactly_at_window_is_restorable() {
        // Age equal to the window is still restorable; eligibility starts the
        // instant the age exceeds it.
        let now = Utc::now();
        let row = DeletedRowRecord {
            id: Uuid::new_v4(),
            deleted_at: now - Duration::days(60),
            deleted_by: Uuid::new_v4(),
        };

        let annotated = DeletedRecord::annotate(row, now, Duration::days(60));
        assert!(annotated.restorable);
    }
}
