//! Unit tests for the indicator engine

use chrono::Utc;
use sentrix::errors::EngineError;
use sentrix::indicators::engine::{IndicatorEngine, MIN_BARS};
use sentrix::models::indicators::Candle;

fn create_uptrend_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.5;
            Candle::new(
                base,
                base + 0.3,
                base - 0.2,
                base + 0.1,
                1000.0 + i as f64 * 10.0,
                Utc::now(),
            )
        })
        .collect()
}

fn create_downtrend_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = 300.0 - i as f64 * 0.5;
            Candle::new(
                base,
                base + 0.2,
                base - 0.3,
                base - 0.1,
                1000.0 + i as f64 * 10.0,
                Utc::now(),
            )
        })
        .collect()
}

#[test]
fn test_insufficient_data() {
    let candles = create_uptrend_candles(100);
    let err = IndicatorEngine::compute(&candles).unwrap_err();
    match err {
        EngineError::InsufficientData { have, need } => {
            assert_eq!(have, 100);
            assert_eq!(need, MIN_BARS);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_uptrend_snapshot() {
    let candles = create_uptrend_candles(250);
    let snapshot = IndicatorEngine::compute(&candles).unwrap();
    assert_eq!(snapshot.price, candles[candles.len() - 1].close);
    assert!(snapshot.rsi > 70.0);
    assert!(snapshot.macd > 0.0);
    assert!(snapshot.sma20 > snapshot.sma50);
    assert!(snapshot.sma50 > snapshot.sma200);
    assert!(snapshot.price_change_pct > 0.0);
    assert!((0.0..=1.0).contains(&snapshot.analysis_score));
}

#[test]
fn test_downtrend_snapshot() {
    let candles = create_downtrend_candles(250);
    let snapshot = IndicatorEngine::compute(&candles).unwrap();
    assert!(snapshot.rsi < 30.0);
    assert!(snapshot.macd < 0.0);
    assert!(snapshot.sma20 < snapshot.sma50);
    assert!(snapshot.price < snapshot.sma20);
    assert!(snapshot.price_change_pct < 0.0);
}

#[test]
fn test_snapshot_is_deterministic() {
    let candles = create_downtrend_candles(220);
    let a = IndicatorEngine::compute(&candles).unwrap();
    let b = IndicatorEngine::compute(&candles).unwrap();
    assert_eq!(a.rsi, b.rsi);
    assert_eq!(a.macd, b.macd);
    assert_eq!(a.macd_signal, b.macd_signal);
    assert_eq!(a.bb_upper, b.bb_upper);
    assert_eq!(a.analysis_score, b.analysis_score);
    assert_eq!(a.trend, b.trend);
}

#[test]
fn test_analysis_score_adjustments() {
    // Oversold downtrend: +0.2 (RSI), -0.1 (MACD), no MA bonuses.
    let candles = create_downtrend_candles(250);
    let snapshot = IndicatorEngine::compute(&candles).unwrap();
    assert!((snapshot.analysis_score - 0.6).abs() < 1e-9);

    // Overbought uptrend: -0.2 (RSI), +0.1 (MACD), +0.1 +0.1 (above MAs).
    let candles = create_uptrend_candles(250);
    let snapshot = IndicatorEngine::compute(&candles).unwrap();
    assert!((snapshot.analysis_score - 0.6).abs() < 1e-9);
}
