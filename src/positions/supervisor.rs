use crate::config::EngineConfig;
use crate::errors::BoxError;
use crate::execution::ExecutionProvider;
use crate::metrics::Metrics;
use crate::models::position::{CloseInstruction, CloseReason, Direction, Position, PositionStatus};
use crate::positions::pnl::unrealized_pnl;
use crate::positions::store::PositionStore;
use crate::services::market_data::MarketDataProvider;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How one close attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Execution confirmed the fill and the position is closed.
    Confirmed,
    /// Execution failed or timed out; the position is open again.
    RolledBack,
    /// Another actor already holds the close; nothing was done.
    Skipped,
}

/// Summary of one supervision scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanReport {
    pub supervised: usize,
    pub closes_confirmed: usize,
    pub rollbacks: usize,
    pub skipped: usize,
}

/// Periodically re-prices open positions and closes the ones that hit a
/// stop, target, or the maximum hold time.
pub struct PositionSupervisor {
    store: Arc<dyn PositionStore>,
    market_data: Arc<dyn MarketDataProvider>,
    executor: Arc<dyn ExecutionProvider>,
    config: EngineConfig,
    metrics: Option<Arc<Metrics>>,
}

impl PositionSupervisor {
    pub fn new(
        store: Arc<dyn PositionStore>,
        market_data: Arc<dyn MarketDataProvider>,
        executor: Arc<dyn ExecutionProvider>,
        config: EngineConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            store,
            market_data,
            executor,
            config,
            metrics,
        }
    }

    /// Decide whether `position` must close at `price`.
    ///
    /// Take-profit is checked before stop-loss, and both before the hold
    /// timeout, so a position that is simultaneously past its stop and its
    /// deadline closes as a stop-loss.
    pub fn evaluate_close(
        position: &Position,
        price: f64,
        now: DateTime<Utc>,
        max_hold_secs: i64,
    ) -> Option<CloseReason> {
        match position.direction {
            Direction::Long => {
                if price >= position.take_profit {
                    return Some(CloseReason::TakeProfit);
                }
                if price <= position.stop_loss {
                    return Some(CloseReason::StopLoss);
                }
            }
            Direction::Short => {
                if price <= position.take_profit {
                    return Some(CloseReason::TakeProfit);
                }
                if price >= position.stop_loss {
                    return Some(CloseReason::StopLoss);
                }
            }
        }
        if (now - position.opened_at).num_seconds() >= max_hold_secs {
            return Some(CloseReason::Timeout);
        }
        None
    }

    /// One supervision pass over the open positions.
    pub async fn scan(&self) -> Result<ScanReport, BoxError> {
        let open = self.store.list_open().await?;
        if let Some(metrics) = &self.metrics {
            metrics.open_positions.set(open.len() as f64);
        }
        let supervised = open.len();

        let outcomes: Vec<Option<CloseOutcome>> = stream::iter(open)
            .map(|position| self.supervise_one(position))
            .buffer_unordered(self.config.supervisor_concurrency)
            .collect()
            .await;

        let mut report = ScanReport {
            supervised,
            ..Default::default()
        };
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                CloseOutcome::Confirmed => report.closes_confirmed += 1,
                CloseOutcome::RolledBack => report.rollbacks += 1,
                CloseOutcome::Skipped => report.skipped += 1,
            }
        }
        Ok(report)
    }

    async fn supervise_one(&self, position: Position) -> Option<CloseOutcome> {
        let price = match self.market_data.get_latest_price(&position.symbol).await {
            Ok(price) => price,
            Err(e) => {
                // No fresh price this cycle; the position keeps its last mark.
                warn!(
                    position_id = %position.id,
                    symbol = %position.symbol,
                    error = %e,
                    "Price fetch failed, skipping position this scan"
                );
                return None;
            }
        };

        if let Err(e) = self.store.update_mark(position.id, price).await {
            warn!(position_id = %position.id, error = %e, "Failed to update mark price");
        }

        let pnl = unrealized_pnl(
            position.direction,
            position.entry_price,
            price,
            position.quantity,
            position.leverage,
        );
        debug!(
            position_id = %position.id,
            symbol = %position.symbol,
            price = price,
            unrealized_pnl = pnl,
            "Supervised position"
        );

        let reason =
            Self::evaluate_close(&position, price, Utc::now(), self.config.max_hold_secs)?;
        match self.close_position(&position, reason).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(
                    position_id = %position.id,
                    reason = reason.as_str(),
                    error = %e,
                    "Close attempt errored"
                );
                None
            }
        }
    }

    /// Close `position` for `reason`.
    ///
    /// Claims the position with an `Open -> Closing` compare-and-swap, asks
    /// the execution collaborator to close, and either finalizes on a
    /// confirmed fill or rolls the status back to `Open` so a later scan can
    /// retry.
    pub async fn close_position(
        &self,
        position: &Position,
        reason: CloseReason,
    ) -> Result<CloseOutcome, BoxError> {
        let claimed = self
            .store
            .transition(position.id, PositionStatus::Open, PositionStatus::Closing)
            .await?;
        if !claimed {
            debug!(
                position_id = %position.id,
                "Position no longer open, close skipped"
            );
            return Ok(CloseOutcome::Skipped);
        }

        let instruction = CloseInstruction::new(position.id, reason);
        let confirm_timeout = Duration::from_millis(self.config.close_confirm_timeout_ms);
        let result =
            tokio::time::timeout(confirm_timeout, self.executor.close(&instruction)).await;

        match result {
            Ok(Ok(report)) if report.filled => {
                let realized = unrealized_pnl(
                    position.direction,
                    position.entry_price,
                    report.fill_price,
                    position.quantity,
                    position.leverage,
                );
                self.store
                    .finalize_close(position.id, reason, report.fill_price, realized, Utc::now())
                    .await?;
                if let Some(metrics) = &self.metrics {
                    metrics.positions_closed_total.inc();
                }
                info!(
                    position_id = %position.id,
                    reason = reason.as_str(),
                    fill_price = report.fill_price,
                    realized_pnl = realized,
                    "Position closed"
                );
                Ok(CloseOutcome::Confirmed)
            }
            other => {
                match other {
                    Ok(Ok(_)) => warn!(
                        position_id = %position.id,
                        "Execution reported an unfilled close, rolling back"
                    ),
                    Ok(Err(e)) => warn!(
                        position_id = %position.id,
                        error = %e,
                        "Execution close failed, rolling back"
                    ),
                    Err(_) => warn!(
                        position_id = %position.id,
                        timeout_ms = self.config.close_confirm_timeout_ms,
                        "Close confirmation timed out, rolling back"
                    ),
                }
                let restored = self
                    .store
                    .transition(position.id, PositionStatus::Closing, PositionStatus::Open)
                    .await?;
                if !restored {
                    error!(
                        position_id = %position.id,
                        "Rollback lost the closing status, manual reconciliation needed"
                    );
                }
                if let Some(metrics) = &self.metrics {
                    metrics.close_rollbacks_total.inc();
                }
                Ok(CloseOutcome::RolledBack)
            }
        }
    }
}
