//! Job handlers for the evaluation and supervision workflows

use crate::errors::EngineError;
use crate::execution::OpenOrder;
use crate::indicators::engine::{IndicatorEngine, MIN_BARS};
use crate::jobs::context::JobContext;
use crate::jobs::types::{AdmitSignalJob, EvaluateSignalJob, FetchCandlesJob, SupervisePositionsJob};
use crate::models::position::Position;
use crate::signals::admission::AdmissionOutcome;
use apalis::prelude::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Read candle history for a symbol and hand it to evaluation.
///
/// Errors here are retryable: an empty or short history just means the
/// upstream collector has not caught up yet.
pub async fn handle_fetch_candles(
    job: FetchCandlesJob,
    ctx: Data<Arc<JobContext>>,
    eval_storage: Data<apalis_redis::RedisStorage<EvaluateSignalJob>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    debug!(symbol = %job.symbol, "FetchCandlesJob: fetching candles for {}", job.symbol);

    let candles = ctx
        .data_provider
        .get_candles(&job.symbol, MIN_BARS + 50)
        .await
        .map_err(|e| {
            Box::new(std::io::Error::other(format!("Market data error: {}", e)))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

    if candles.is_empty() {
        debug!(symbol = %job.symbol, "FetchCandlesJob: no candles available yet for {}", job.symbol);
        return Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No candles available for {}", job.symbol),
        )) as Box<dyn std::error::Error + Send + Sync>);
    }

    if candles.len() < MIN_BARS {
        debug!(
            symbol = %job.symbol,
            count = candles.len(),
            min = MIN_BARS,
            "FetchCandlesJob: not enough candles ({} < {}) for {}",
            candles.len(),
            MIN_BARS,
            job.symbol
        );
        return Err(Box::new(EngineError::InsufficientData {
            have: candles.len(),
            need: MIN_BARS,
        }) as Box<dyn std::error::Error + Send + Sync>);
    }

    let next_job = EvaluateSignalJob {
        symbol: job.symbol.clone(),
        candles,
    };
    let mut storage = (*eval_storage).clone();
    storage.push(next_job).await.map_err(|e| {
        Box::new(std::io::Error::other(format!(
            "Failed to enqueue EvaluateSignalJob: {}",
            e
        ))) as Box<dyn std::error::Error + Send + Sync>
    })?;

    debug!(symbol = %job.symbol, "FetchCandlesJob: enqueued EvaluateSignalJob for {}", job.symbol);
    Ok(())
}

/// Compute the indicator snapshot, fold in a pending external candidate,
/// and score a signal. Quiet markets produce no signal and no error.
pub async fn handle_evaluate_signal(
    job: EvaluateSignalJob,
    ctx: Data<Arc<JobContext>>,
    admit_storage: Data<apalis_redis::RedisStorage<AdmitSignalJob>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();
    debug!(
        symbol = %job.symbol,
        candle_count = job.candles.len(),
        "EvaluateSignalJob: evaluating {} with {} candles",
        job.symbol,
        job.candles.len()
    );

    let snapshot = match IndicatorEngine::compute(&job.candles) {
        Ok(snapshot) => snapshot,
        Err(EngineError::InsufficientData { have, need }) => {
            debug!(
                symbol = %job.symbol,
                have = have,
                need = need,
                "EvaluateSignalJob: history shrank below minimum, skipping"
            );
            return Ok(());
        }
        Err(e) => return Err(Box::new(e)),
    };

    let candidate = match ctx.candidates.take(&job.symbol).await {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!(symbol = %job.symbol, error = %e, "EvaluateSignalJob: candidate queue unreachable");
            None
        }
    };

    let signal = ctx
        .scorer
        .score(&job.symbol, &snapshot, &job.candles, candidate.as_ref());

    if let Some(ref metrics) = ctx.metrics {
        metrics
            .signal_evaluation_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }

    let Some(signal) = signal else {
        debug!(symbol = %job.symbol, "EvaluateSignalJob: no signal for {}", job.symbol);
        return Ok(());
    };

    if let Some(ref metrics) = ctx.metrics {
        metrics.signals_generated_total.inc();
    }
    info!(
        symbol = %job.symbol,
        signal_id = %signal.id,
        direction = signal.direction.as_str(),
        confidence = signal.confidence,
        source = %signal.source,
        "EvaluateSignalJob: signal generated for {}",
        job.symbol
    );

    let mut storage = (*admit_storage).clone();
    storage
        .push(AdmitSignalJob { signal })
        .await
        .map_err(|e| {
            Box::new(std::io::Error::other(format!(
                "Failed to enqueue AdmitSignalJob: {}",
                e
            ))) as Box<dyn std::error::Error + Send + Sync>
        })?;

    Ok(())
}

/// Run a signal through the admission gate and open a position when it
/// passes.
///
/// An execution failure is logged and dropped rather than returned: the
/// queue would otherwise retry the whole job and risk opening the same
/// position twice.
pub async fn handle_admit_signal(
    job: AdmitSignalJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let signal = &job.signal;

    match ctx.gate.admit(signal, Utc::now()).await {
        AdmissionOutcome::Rejected(reason) => {
            if let Some(ref metrics) = ctx.metrics {
                metrics.signals_rejected_total.inc();
            }
            debug!(
                signal_id = %signal.id,
                reason = reason.as_str(),
                "AdmitSignalJob: signal rejected"
            );
            return Ok(());
        }
        AdmissionOutcome::Duplicate => {
            debug!(signal_id = %signal.id, "AdmitSignalJob: already admitted, skipping");
            return Ok(());
        }
        AdmissionOutcome::Accepted => {}
    }

    if let Some(ref metrics) = ctx.metrics {
        metrics.signals_admitted_total.inc();
    }

    let order = OpenOrder {
        symbol: signal.symbol.clone(),
        direction: signal.direction.into(),
        quantity: ctx.config.default_quantity,
        leverage: ctx.config.default_leverage,
        stop_loss: signal.stop_loss,
        take_profit: signal.take_profit,
    };

    let report = match ctx.executor.open(&order).await {
        Ok(report) if report.filled => report,
        Ok(_) => {
            warn!(
                signal_id = %signal.id,
                symbol = %signal.symbol,
                "AdmitSignalJob: execution declined the open order"
            );
            return Ok(());
        }
        Err(e) => {
            error!(
                signal_id = %signal.id,
                symbol = %signal.symbol,
                error = %e,
                "AdmitSignalJob: failed to open position"
            );
            return Ok(());
        }
    };

    let position = Position::open(
        ctx.config.default_user_id,
        signal.symbol.clone(),
        signal.direction.into(),
        report.fill_price,
        ctx.config.default_quantity,
        ctx.config.default_leverage,
        signal.stop_loss,
        signal.take_profit,
        Utc::now(),
    );
    ctx.position_store.insert(&position).await.map_err(|e| {
        Box::new(std::io::Error::other(format!(
            "Failed to store opened position: {}",
            e
        ))) as Box<dyn std::error::Error + Send + Sync>
    })?;

    if let Some(ref metrics) = ctx.metrics {
        metrics.positions_opened_total.inc();
    }
    info!(
        position_id = %position.id,
        signal_id = %signal.id,
        symbol = %position.symbol,
        direction = position.direction.as_str(),
        entry_price = position.entry_price,
        "AdmitSignalJob: position opened for {}",
        position.symbol
    );
    Ok(())
}

/// Run one supervision scan over all open positions.
pub async fn handle_supervise_positions(
    _job: SupervisePositionsJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();
    let report = ctx.supervisor.scan().await.map_err(|e| {
        Box::new(std::io::Error::other(format!("Supervision scan failed: {}", e)))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    if let Some(ref metrics) = ctx.metrics {
        metrics
            .scan_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }
    debug!(
        supervised = report.supervised,
        closes_confirmed = report.closes_confirmed,
        rollbacks = report.rollbacks,
        skipped = report.skipped,
        "SupervisePositionsJob: scan complete ({} positions)",
        report.supervised
    );
    Ok(())
}
