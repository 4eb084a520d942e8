//! Cron-based scheduler for enqueuing recurring jobs

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Scheduler that pushes a fixed set of jobs on every cron tick.
///
/// One instance drives the candle-fetch fan-out (one job per symbol); a
/// second instance drives the supervision scan.
pub struct JobScheduler<J> {
    storage: Arc<RedisStorage<J>>,
    jobs: Vec<J>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl<J> JobScheduler<J>
where
    J: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
{
    /// Create a scheduler firing every `interval_seconds`. An interval of 0
    /// disables the schedule and is an error.
    pub fn new(
        storage: Arc<RedisStorage<J>>,
        jobs: Vec<J>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_seconds == 0 {
            return Err("Scheduler disabled: interval_seconds is 0".into());
        }

        // Cron format: second minute hour day month weekday
        let cron_expr = if interval_seconds >= 60 {
            let minutes = interval_seconds / 60;
            format!("0 */{} * * * *", minutes)
        } else {
            format!("*/{} * * * * *", interval_seconds)
        };

        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            job_count = jobs.len(),
            "JobScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            storage,
            jobs,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler loop.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let storage = self.storage.clone();
        let jobs = self.jobs.clone();
        let schedule = self.schedule.clone();
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                debug!(
                    job_count = jobs.len(),
                    "JobScheduler: cron tick, enqueuing {} jobs",
                    jobs.len()
                );

                for job in &jobs {
                    let mut storage_clone = (*storage).clone();
                    if let Err(e) = storage_clone.push(job.clone()).await {
                        error!(error = %e, "JobScheduler: failed to enqueue job");
                    }
                }
            }
        });

        {
            let mut h = handle_arc.write().await;
            *h = Some(handle);
        }

        info!("JobScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
