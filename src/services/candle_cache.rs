use crate::models::indicators::Candle;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// In-process rolling candle window per symbol.
///
/// Holds the last `max_bars` candles so evaluation keeps working from the
/// last known history when the upstream cache is briefly unreachable.
pub struct CandleCache {
    windows: RwLock<HashMap<String, VecDeque<Candle>>>,
    max_bars: usize,
}

impl CandleCache {
    pub fn new(max_bars: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_bars,
        }
    }

    /// Merge `candles` into the window for `symbol`. A candle with a
    /// timestamp already present replaces the stored one.
    pub async fn push(&self, symbol: &str, candles: &[Candle]) {
        let mut windows = self.windows.write().await;
        let window = windows.entry(symbol.to_string()).or_default();
        for candle in candles {
            window.retain(|c| c.timestamp != candle.timestamp);
            window.push_back(candle.clone());
        }
        while window.len() > self.max_bars {
            window.pop_front();
        }
    }

    /// Last `limit` candles for `symbol`, oldest first.
    pub async fn series(&self, symbol: &str, limit: usize) -> Vec<Candle> {
        let windows = self.windows.read().await;
        match windows.get(symbol) {
            Some(window) => {
                let start = window.len().saturating_sub(limit);
                window.iter().skip(start).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Close of the newest stored candle.
    pub async fn latest_price(&self, symbol: &str) -> Option<f64> {
        let windows = self.windows.read().await;
        windows
            .get(symbol)
            .and_then(|window| window.back())
            .map(|candle| candle.close)
    }
}
