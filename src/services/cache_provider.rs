use crate::cache::redis::RedisCache;
use crate::errors::{BoxError, EngineError};
use crate::models::indicators::Candle;
use crate::services::candle_cache::CandleCache;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Market data provider backed by the shared Redis cache, with an
/// in-process window as a fallback.
///
/// A Redis outage is treated as "no update this cycle": the provider keeps
/// serving the last hydrated window instead of failing evaluation.
pub struct CacheMarketDataProvider {
    redis: Arc<RedisCache>,
    window: CandleCache,
}

impl CacheMarketDataProvider {
    pub fn new(redis: Arc<RedisCache>, max_bars: usize) -> Self {
        Self {
            redis,
            window: CandleCache::new(max_bars),
        }
    }

    fn candles_key(symbol: &str) -> String {
        format!("candles:{}", symbol)
    }

    fn price_key(symbol: &str) -> String {
        format!("price:{}", symbol)
    }
}

#[async_trait]
impl MarketDataProvider for CacheMarketDataProvider {
    async fn get_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, BoxError> {
        match self
            .redis
            .get_json::<Vec<Candle>>(&Self::candles_key(symbol))
            .await
        {
            Ok(Some(candles)) => self.window.push(symbol, &candles).await,
            Ok(None) => {}
            Err(e) => {
                warn!(
                    symbol = symbol,
                    error = %e,
                    "Candle cache unreachable, serving last known window"
                );
            }
        }
        Ok(self.window.series(symbol, limit).await)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, BoxError> {
        match self.redis.get_json::<f64>(&Self::price_key(symbol)).await {
            Ok(Some(price)) => return Ok(price),
            Ok(None) => {}
            Err(e) => {
                warn!(symbol = symbol, error = %e, "Price cache unreachable");
            }
        }
        match self.window.latest_price(symbol).await {
            Some(price) => Ok(price),
            None => Err(Box::new(EngineError::CollaboratorUnavailable(format!(
                "no price available for {}",
                symbol
            )))),
        }
    }
}
