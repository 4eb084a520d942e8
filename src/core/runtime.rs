//! Apalis worker setup for the evaluation and supervision pipelines

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::{AdmitSignalJob, EvaluateSignalJob, FetchCandlesJob, SupervisePositionsJob};
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Supervision runtime that sets up the Apalis workers.
pub struct SupervisionRuntime {
    job_context: Arc<JobContext>,
    fetch_storage: Arc<RedisStorage<FetchCandlesJob>>,
    eval_storage: Arc<RedisStorage<EvaluateSignalJob>>,
    admit_storage: Arc<RedisStorage<AdmitSignalJob>>,
    supervise_storage: Arc<RedisStorage<SupervisePositionsJob>>,
    concurrency: usize,
}

impl SupervisionRuntime {
    pub fn new(
        job_context: Arc<JobContext>,
        fetch_storage: Arc<RedisStorage<FetchCandlesJob>>,
        eval_storage: Arc<RedisStorage<EvaluateSignalJob>>,
        admit_storage: Arc<RedisStorage<AdmitSignalJob>>,
        supervise_storage: Arc<RedisStorage<SupervisePositionsJob>>,
    ) -> Self {
        let concurrency = job_context.config.allowed_symbols.len().max(1);
        Self {
            job_context,
            fetch_storage,
            eval_storage,
            admit_storage,
            supervise_storage,
            concurrency,
        }
    }

    /// Set custom concurrency (default is number of symbols).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Start all workers and return handles for graceful shutdown.
    pub async fn start_workers(
        &self,
    ) -> Result<Vec<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut handles = Vec::new();

        info!(
            concurrency = self.concurrency,
            "SupervisionRuntime: starting Apalis workers with concurrency {}",
            self.concurrency
        );

        // Worker for FetchCandlesJob
        let fetch_storage = (*self.fetch_storage).clone();
        let eval_storage = (*self.eval_storage).clone();
        let job_context = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("fetch-candles-worker")
                .data(job_context.clone())
                .data(eval_storage.clone())
                .backend(fetch_storage)
                .build_fn(handlers::handle_fetch_candles);

            info!("SupervisionRuntime: FetchCandlesJob worker started");
            worker.run().await;
        }));

        // Worker for EvaluateSignalJob
        let eval_storage_worker = (*self.eval_storage).clone();
        let admit_storage = (*self.admit_storage).clone();
        let job_context_eval = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("evaluate-signal-worker")
                .data(job_context_eval.clone())
                .data(admit_storage.clone())
                .backend(eval_storage_worker)
                .build_fn(handlers::handle_evaluate_signal);

            info!("SupervisionRuntime: EvaluateSignalJob worker started");
            worker.run().await;
        }));

        // Worker for AdmitSignalJob
        let admit_storage_worker = (*self.admit_storage).clone();
        let job_context_admit = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("admit-signal-worker")
                .data(job_context_admit.clone())
                .backend(admit_storage_worker)
                .build_fn(handlers::handle_admit_signal);

            info!("SupervisionRuntime: AdmitSignalJob worker started");
            worker.run().await;
        }));

        // Worker for SupervisePositionsJob
        let supervise_storage_worker = (*self.supervise_storage).clone();
        let job_context_supervise = self.job_context.clone();
        handles.push(tokio::spawn(async move {
            let worker = WorkerBuilder::new("supervise-positions-worker")
                .data(job_context_supervise.clone())
                .backend(supervise_storage_worker)
                .build_fn(handlers::handle_supervise_positions);

            info!("SupervisionRuntime: SupervisePositionsJob worker started");
            worker.run().await;
        }));

        info!("SupervisionRuntime: all workers started");
        Ok(handles)
    }
}
