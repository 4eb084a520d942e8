//! Unit tests for SMA indicator

use chrono::Utc;
use sentrix::indicators::trend::sma::calculate_sma;
use sentrix::models::indicators::Candle;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&c| Candle::new(c, c + 0.1, c - 0.1, c, 1000.0, Utc::now()))
        .collect()
}

#[test]
fn test_sma_insufficient_data() {
    let candles = candles_from_closes(&[100.0; 19]);
    assert!(calculate_sma(&candles, 20).is_none());
}

#[test]
fn test_sma_exact_value() {
    let closes: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let candles = candles_from_closes(&closes);
    // Mean of 6..=10 is 8.
    let sma = calculate_sma(&candles, 5).unwrap();
    assert!((sma - 8.0).abs() < 1e-12);
}

#[test]
fn test_sma_uses_only_last_window() {
    let mut closes = vec![1_000.0; 30];
    closes.extend(vec![50.0; 20]);
    let candles = candles_from_closes(&closes);
    let sma = calculate_sma(&candles, 20).unwrap();
    assert!((sma - 50.0).abs() < 1e-12);
}
