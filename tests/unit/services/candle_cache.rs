//! Unit tests for the rolling candle window

use chrono::{Duration, TimeZone, Utc};
use sentrix::models::indicators::Candle;
use sentrix::services::candle_cache::CandleCache;

fn candle(minute: i64, close: f64) -> Candle {
    let timestamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute);
    Candle::new(close, close + 1.0, close - 1.0, close, 1000.0, timestamp)
}

#[tokio::test]
async fn test_push_and_series_oldest_first() {
    let cache = CandleCache::new(100);
    cache
        .push("BTC-PERP", &[candle(0, 100.0), candle(1, 101.0), candle(2, 102.0)])
        .await;

    let series = cache.series("BTC-PERP", 10).await;
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].close, 100.0);
    assert_eq!(series[2].close, 102.0);
}

#[tokio::test]
async fn test_window_evicts_oldest_past_capacity() {
    let cache = CandleCache::new(3);
    let candles: Vec<Candle> = (0..5).map(|i| candle(i, 100.0 + i as f64)).collect();
    cache.push("BTC-PERP", &candles).await;

    let series = cache.series("BTC-PERP", 10).await;
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].close, 102.0);
    assert_eq!(series[2].close, 104.0);
}

#[tokio::test]
async fn test_same_timestamp_replaces_stored_candle() {
    let cache = CandleCache::new(100);
    cache.push("BTC-PERP", &[candle(0, 100.0)]).await;
    cache.push("BTC-PERP", &[candle(0, 105.0)]).await;

    let series = cache.series("BTC-PERP", 10).await;
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].close, 105.0);
}

#[tokio::test]
async fn test_series_limit_returns_newest() {
    let cache = CandleCache::new(100);
    let candles: Vec<Candle> = (0..10).map(|i| candle(i, 100.0 + i as f64)).collect();
    cache.push("BTC-PERP", &candles).await;

    let series = cache.series("BTC-PERP", 4).await;
    assert_eq!(series.len(), 4);
    assert_eq!(series[0].close, 106.0);
    assert_eq!(series[3].close, 109.0);
}

#[tokio::test]
async fn test_latest_price_and_unknown_symbol() {
    let cache = CandleCache::new(100);
    assert!(cache.latest_price("BTC-PERP").await.is_none());
    assert!(cache.series("ETH-PERP", 10).await.is_empty());

    cache.push("BTC-PERP", &[candle(0, 100.0), candle(1, 108.0)]).await;
    assert_eq!(cache.latest_price("BTC-PERP").await, Some(108.0));
}
