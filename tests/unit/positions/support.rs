//! Shared scripted collaborators for position tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentrix::errors::BoxError;
use sentrix::execution::{ExecutionProvider, ExecutionReport, OpenOrder};
use sentrix::models::indicators::Candle;
use sentrix::models::position::{CloseInstruction, Direction, Position};
use sentrix::services::market_data::MarketDataProvider;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Price feed that replays a fixed per-symbol sequence, one price per call.
/// An exhausted script reports an error, which a scan treats as "no update
/// this cycle".
pub struct ScriptedMarketData {
    prices: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn script(&self, symbol: &str, prices: &[f64]) {
        self.prices
            .lock()
            .unwrap()
            .insert(symbol.to_string(), prices.iter().copied().collect());
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedMarketData {
    async fn get_candles(&self, _symbol: &str, _limit: usize) -> Result<Vec<Candle>, BoxError> {
        Ok(Vec::new())
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, BoxError> {
        let mut prices = self.prices.lock().unwrap();
        prices
            .get_mut(symbol)
            .and_then(|script| script.pop_front())
            .ok_or_else(|| format!("price script exhausted for {}", symbol).into())
    }
}

/// Execution double that records every instruction and fills at a fixed
/// price. Can be told to fail or to stall past the confirmation timeout.
pub struct MockExecution {
    pub opens: Mutex<Vec<OpenOrder>>,
    pub closes: Mutex<Vec<CloseInstruction>>,
    fill_price: Mutex<f64>,
    fail_closes: AtomicBool,
    close_delay_ms: AtomicU64,
}

impl MockExecution {
    pub fn filling_at(fill_price: f64) -> Self {
        Self {
            opens: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
            fill_price: Mutex::new(fill_price),
            fail_closes: AtomicBool::new(false),
            close_delay_ms: AtomicU64::new(0),
        }
    }

    pub fn fail_closes(&self) {
        self.fail_closes.store(true, Ordering::SeqCst);
    }

    pub fn delay_closes(&self, millis: u64) {
        self.close_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn close_count(&self) -> usize {
        self.closes.lock().unwrap().len()
    }
}

#[async_trait]
impl ExecutionProvider for MockExecution {
    async fn open(&self, order: &OpenOrder) -> Result<ExecutionReport, BoxError> {
        let fill_price = *self.fill_price.lock().unwrap();
        self.opens.lock().unwrap().push(order.clone());
        Ok(ExecutionReport {
            filled: true,
            fill_price,
        })
    }

    async fn close(&self, instruction: &CloseInstruction) -> Result<ExecutionReport, BoxError> {
        self.closes.lock().unwrap().push(instruction.clone());

        let delay = self.close_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail_closes.load(Ordering::SeqCst) {
            return Err("execution venue unavailable".into());
        }
        let fill_price = *self.fill_price.lock().unwrap();
        Ok(ExecutionReport {
            filled: true,
            fill_price,
        })
    }
}

/// Open long/short position with explicit brackets, opened at `opened_at`.
pub fn open_position(
    symbol: &str,
    direction: Direction,
    entry: f64,
    stop: f64,
    target: f64,
    opened_at: DateTime<Utc>,
) -> Position {
    Position::open(
        0,
        symbol.to_string(),
        direction,
        entry,
        1.0,
        1.0,
        stop,
        target,
        opened_at,
    )
}
