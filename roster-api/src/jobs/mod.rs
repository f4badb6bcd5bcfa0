//! Import Jobs and Background Tasks
//!
//! - `import_job`: the job registry behind `GET /jobs/{id}` and the task
//!   that drives one upload through the ingestion pipeline
//! - `job_sweeper`: periodic removal of old finished jobs
//!
//! # Usage
//!
//! ```ignore
//! use roster_api::jobs::{job_sweeper_task, JobRegistry, JobSweeperConfig};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! tokio::spawn(job_sweeper_task(registry.clone(), JobSweeperConfig::from_env(), shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod import_job;
pub mod job_sweeper;

pub use import_job::{spawn_import, ImportJob, JobRegistry, JobStatus};
pub use job_sweeper::{job_sweeper_task, JobSweeperConfig};
