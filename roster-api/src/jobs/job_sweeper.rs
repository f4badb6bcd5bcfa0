//! Job Sweeper Background Task
//!
//! Finished import jobs are kept in memory so clients can poll them. This
//! task periodically drops the ones that finished longer ago than the
//! retention window.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::constants::{DEFAULT_JOB_RETENTION_SECS, DEFAULT_JOB_SWEEP_INTERVAL_SECS};

use super::import_job::JobRegistry;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the job sweeper.
#[derive(Debug, Clone)]
pub struct JobSweeperConfig {
    /// How often to sweep (default: 10 minutes)
    pub sweep_interval: Duration,

    /// How long a finished job stays queryable (default: 24 hours)
    pub retention: Duration,
}

impl Default for JobSweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_JOB_SWEEP_INTERVAL_SECS),
            retention: Duration::from_secs(DEFAULT_JOB_RETENTION_SECS),
        }
    }
}

impl JobSweeperConfig {
    /// Create JobSweeperConfig from environment variables.
    ///
    /// - `ROSTER_JOB_SWEEP_INTERVAL_SECS`: Sweep period (default: 600)
    /// - `ROSTER_JOB_RETENTION_SECS`: Retention of finished jobs (default: 86400)
    pub fn from_env() -> Self {
        let sweep_interval = Duration::from_secs(
            std::env::var("ROSTER_JOB_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_JOB_SWEEP_INTERVAL_SECS),
        );

        let retention = Duration::from_secs(
            std::env::var("ROSTER_JOB_RETENTION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JOB_RETENTION_SECS),
        );

        Self {
            sweep_interval,
            retention,
        }
    }
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Sweep finished jobs until the shutdown signal flips to `true`.
///
/// Returns the total number of jobs removed.
pub async fn job_sweeper_task(
    registry: JobRegistry,
    config: JobSweeperConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> u64 {
    let mut sweep_interval = interval(config.sweep_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let retention = chrono::Duration::from_std(config.retention)
        .unwrap_or_else(|_| chrono::Duration::days(1));
    let mut removed_total = 0u64;

    tracing::info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        retention_secs = config.retention.as_secs(),
        "Job sweeper started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Job sweeper shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                let removed = registry.prune_finished_before(chrono::Utc::now() - retention);
                removed_total += removed as u64;
                if removed > 0 {
                    tracing::info!(removed, remaining = registry.len(), "Swept finished import jobs");
                } else {
                    tracing::trace!("Job sweep found nothing to remove");
                }
            }
        }
    }

    tracing::info!(removed_total, "Job sweeper completed");
    removed_total
}
