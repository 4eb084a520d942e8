use crate::errors::BoxError;
use crate::models::indicators::Candle;
use async_trait::async_trait;

/// Read-only market data access.
///
/// The engine only consumes candle history and marks that an upstream
/// collector has already written; implementations must not open their own
/// market connections.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Up to `limit` candles for `symbol`, oldest first.
    async fn get_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, BoxError>;

    /// Most recent traded or marked price for `symbol`.
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, BoxError>;
}
