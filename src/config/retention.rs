//! Retention configuration.
//!
//! Controls the restore grace period for soft-deleted records, the audit
//! log's own (much longer) retention, and the sweeper's schedule.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! enabled = true
//! window_days = 60
//! audit_log_days = 365
//! sweep_hour_utc = 4
//! batch_size = 1000
//! ```

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Retention configuration.
///
/// `window_days` governs both restorability (a soft-deleted record can be
/// restored while its deletion age is within the window) and purge
/// eligibility (the sweeper removes records older than the window). The two
/// are the same boundary by design: the instant a record stops being
/// restorable it becomes purge-eligible, whether or not a sweep has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Whether the scheduled sweep worker runs.
    /// The restore window is enforced regardless of this flag.
    /// Default: false (must be explicitly enabled)
    #[serde(default)]
    pub enabled: bool,

    /// Days a soft-deleted record remains restorable.
    /// Default: 60
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Days to keep audit log entries before the sweeper's final
    /// self-purge step removes them.
    /// Default: 365
    #[serde(default = "default_audit_log_days")]
    pub audit_log_days: u32,

    /// UTC hour of day (0-23) at which the scheduled sweep fires.
    /// Default: 4
    #[serde(default = "default_sweep_hour_utc")]
    pub sweep_hour_utc: u32,

    /// Batch size for eligibility scans and audit log deletes.
    /// Default: 1000
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_days: default_window_days(),
            audit_log_days: default_audit_log_days(),
            sweep_hour_utc: default_sweep_hour_utc(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_window_days() -> u32 {
    60
}

fn default_audit_log_days() -> u32 {
    365
}

fn default_sweep_hour_utc() -> u32 {
    4
}

fn default_batch_size() -> u32 {
    1000
}

impl RetentionConfig {
    /// The restore grace period as a Duration.
    pub fn window(&self) -> Duration {
        Duration::days(self.window_days as i64)
    }

    /// The audit log's own retention period as a Duration.
    pub fn audit_window(&self) -> Duration {
        Duration::days(self.audit_log_days as i64)
    }

    /// The next scheduled sweep time strictly after `now`: today at
    /// `sweep_hour_utc`, or tomorrow if that time has already passed.
    pub fn next_sweep_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now
            .with_hour(self.sweep_hour_utc)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .expect("sweep_hour_utc is validated to be < 24");

        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::Validation(
                "retention.window_days must be at least 1".into(),
            ));
        }
        if self.sweep_hour_utc > 23 {
            return Err(ConfigError::Validation(
                "retention.sweep_hour_utc must be between 0 and 23".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "retention.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
