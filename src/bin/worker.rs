//! Sentrix Worker
//!
//! Processes evaluation and supervision jobs from the Redis queue.
//! Can be run as a separate process/instance from the API server.

use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use sentrix::cache::RedisCache;
use sentrix::config::EngineConfig;
use sentrix::core::runtime::SupervisionRuntime;
use sentrix::core::scheduler::JobScheduler;
use sentrix::db::PgStore;
use sentrix::execution::{ExecutionProvider, RestExecutionProvider};
use sentrix::indicators::MIN_BARS;
use sentrix::jobs::context::JobContext;
use sentrix::jobs::types::{
    AdmitSignalJob, EvaluateSignalJob, FetchCandlesJob, SupervisePositionsJob,
};
use sentrix::logging;
use sentrix::metrics::Metrics;
use sentrix::positions::store::PositionStore;
use sentrix::positions::supervisor::PositionSupervisor;
use sentrix::services::cache_provider::CacheMarketDataProvider;
use sentrix::services::market_data::MarketDataProvider;
use sentrix::signals::admission::AdmissionGate;
use sentrix::signals::candidates::CandidateQueue;
use sentrix::signals::scorer::{ScorerConfig, SignalScorer};
use sentrix::signals::sources::SourceRegistry;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let config = EngineConfig::from_env();
    let environment = sentrix::config::get_environment();
    info!("Starting Sentrix Worker");
    info!(environment = %environment, "Environment");

    if config.fetch_interval_secs == 0 {
        return Err("EVAL_INTERVAL_SECONDS must be > 0 for worker".into());
    }

    // Initialize metrics
    let metrics = Arc::new(Metrics::new()?);

    // Initialize Postgres (required for signal audit and positions)
    info!("Initializing Postgres connection...");
    let database = match PgStore::new().await {
        Ok(db) => {
            info!("Postgres connected");
            metrics.database_connected.set(1.0);
            Arc::new(db)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Postgres");
            return Err(format!("Postgres connection required for worker: {}", e).into());
        }
    };

    // Initialize Redis cache (for reading candles and candidates)
    info!("Initializing Redis connection...");
    let cache = match RedisCache::new().await {
        Ok(c) => {
            info!("Redis connected");
            metrics.cache_connected.set(1.0);
            Arc::new(c)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis");
            return Err(format!("Redis connection required for worker: {}", e).into());
        }
    };

    // Create read-only data provider for jobs. It reads candles the
    // upstream collector wrote to Redis and never opens market connections.
    info!("Initializing read-only market data provider...");
    let data_provider: Arc<dyn MarketDataProvider> =
        Arc::new(CacheMarketDataProvider::new(cache.clone(), MIN_BARS + 50));

    let executor: Arc<dyn ExecutionProvider> = Arc::new(RestExecutionProvider::new(
        sentrix::config::get_execution_url(),
    ));
    let position_store: Arc<dyn PositionStore> = database.clone();
    let sources = Arc::new(SourceRegistry::new());
    let gate = Arc::new(AdmissionGate::new(
        config.clone(),
        sources,
        database.clone(),
    ));
    let scorer = Arc::new(SignalScorer::new(ScorerConfig {
        min_confidence: config.min_confidence,
        stop_loss_pct: config.stop_loss_pct,
        take_profit_pct: config.take_profit_pct,
        ..ScorerConfig::default()
    }));
    let supervisor = Arc::new(PositionSupervisor::new(
        position_store.clone(),
        data_provider.clone(),
        executor.clone(),
        config.clone(),
        Some(metrics.clone()),
    ));
    let candidates = Arc::new(CandidateQueue::new(
        cache.clone(),
        config.freshness_window_secs,
    ));

    // Initialize Apalis storage backends
    info!("Initializing Apalis Redis storage...");
    let redis_url = sentrix::config::get_redis_url();
    let conn = apalis_redis::connect(redis_url.clone()).await?;
    let fetch_storage: Arc<RedisStorage<FetchCandlesJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let eval_storage: Arc<RedisStorage<EvaluateSignalJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let admit_storage: Arc<RedisStorage<AdmitSignalJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let supervise_storage: Arc<RedisStorage<SupervisePositionsJob>> =
        Arc::new(RedisStorage::new(conn));
    info!("Apalis Redis storage initialized");

    let concurrency: usize = env::var("WORKER_CONCURRENCY")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(|| config.allowed_symbols.len().max(1));
    info!(concurrency = concurrency, "Worker concurrency: {}", concurrency);
    info!(
        symbols = ?config.allowed_symbols,
        fetch_interval = config.fetch_interval_secs,
        scan_interval = config.scan_interval_secs,
        "Evaluating {} symbols",
        config.allowed_symbols.len()
    );

    // Create job context
    let job_context = Arc::new(JobContext {
        data_provider,
        scorer,
        gate,
        supervisor,
        position_store,
        executor,
        candidates,
        config: config.clone(),
        metrics: Some(metrics.clone()),
    });

    // Initialize and start job runtime (workers)
    info!("Starting Apalis workers...");
    let runtime = SupervisionRuntime::new(
        job_context,
        fetch_storage.clone(),
        eval_storage.clone(),
        admit_storage.clone(),
        supervise_storage.clone(),
    )
    .with_concurrency(concurrency);
    let worker_handles = runtime
        .start_workers()
        .await
        .map_err(|e| format!("Failed to start workers: {}", e))?;

    // Candle-fetch fan-out: one job per symbol per tick
    info!("Starting fetch scheduler...");
    let fetch_jobs: Vec<FetchCandlesJob> = config
        .allowed_symbols
        .iter()
        .map(|symbol| FetchCandlesJob {
            symbol: symbol.clone(),
        })
        .collect();
    let fetch_scheduler =
        JobScheduler::new(fetch_storage, fetch_jobs, config.fetch_interval_secs)
            .map_err(|e| format!("Failed to create fetch scheduler: {}", e))?;
    fetch_scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start fetch scheduler: {}", e))?;

    // Supervision scan on its own cadence
    info!("Starting supervision scheduler...");
    let supervise_scheduler = JobScheduler::new(
        supervise_storage,
        vec![SupervisePositionsJob {}],
        config.scan_interval_secs,
    )
    .map_err(|e| format!("Failed to create supervision scheduler: {}", e))?;
    supervise_scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start supervision scheduler: {}", e))?;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            fetch_scheduler.stop().await;
            supervise_scheduler.stop().await;
            for handle in worker_handles {
                handle.abort();
            }
            info!("Worker stopped");
        }
    }

    Ok(())
}
