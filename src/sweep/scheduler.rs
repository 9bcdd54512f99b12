//! Recurring sweep scheduler.
//!
//! Runs the sweeper once per day at the configured UTC hour, until the
//! shutdown token is cancelled. Disabled entirely when
//! `retention.enabled = false`; the restore window is still enforced by the
//! lifecycle manager in that case, records just accumulate.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::sweep::{SweepTrigger, Sweeper};

/// Spawn the recurring sweep worker. Returns immediately; the worker runs
/// until `shutdown` is cancelled.
pub fn start_sweep_worker(sweeper: Arc<Sweeper>, shutdown: CancellationToken) {
    if !sweeper.retention().enabled {
        tracing::info!("Retention sweep disabled, not starting worker");
        return;
    }

    tokio::spawn(async move {
        tracing::info!(
            sweep_hour_utc = sweeper.retention().sweep_hour_utc,
            window_days = sweeper.retention().window_days,
            "Sweep worker started"
        );

        loop {
            let now = Utc::now();
            let next = sweeper.retention().next_sweep_after(now);
            let wait = (next - now)
                .to_std()
                .unwrap_or_else(|_| std::time::Duration::from_secs(0));

            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Sweep worker shutting down");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            if let Err(e) = sweeper.run(SweepTrigger::Scheduled).await {
                // The next tick retries; eligible records are never lost.
                tracing::error!(error = %e, "Scheduled sweep failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RetentionConfig, db::tests::harness};

    #[tokio::test]
    async fn test_disabled_worker_does_not_start() {
        let db = Arc::new(harness::create_test_db().await);
        let sweeper = Arc::new(Sweeper::new(db, RetentionConfig::default()));
        let shutdown = CancellationToken::new();

        // enabled defaults to false; this must be a synchronous no-op.
        start_sweep_worker(Arc::clone(&sweeper), shutdown.clone());

        let status = sweeper.status().await;
        assert!(status.last_completed.is_none());
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown() {
        let db = Arc::new(harness::create_test_db().await);
        let retention = RetentionConfig {
            enabled: true,
            ..Default::default()
        };
        let sweeper = Arc::new(Sweeper::new(db, retention));
        let shutdown = CancellationToken::new();

        start_sweep_worker(Arc::clone(&sweeper), shutdown.clone());
        shutdown.cancel();

        // Give the spawned task a moment to observe cancellation.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!sweeper.status().await.running);
    }
}
