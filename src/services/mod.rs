//! Market data access for the evaluation and supervision loops

pub mod cache_provider;
pub mod candle_cache;
pub mod market_data;

pub use cache_provider::CacheMarketDataProvider;
pub use candle_cache::CandleCache;
pub use market_data::MarketDataProvider;
