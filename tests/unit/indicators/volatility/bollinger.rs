//! Unit tests for Bollinger Bands

use chrono::Utc;
use sentrix::indicators::volatility::bollinger::calculate_bollinger_bands;
use sentrix::models::indicators::Candle;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&c| Candle::new(c, c + 0.1, c - 0.1, c, 1000.0, Utc::now()))
        .collect()
}

#[test]
fn test_bollinger_insufficient_data() {
    let candles = candles_from_closes(&[100.0; 10]);
    assert!(calculate_bollinger_bands(&candles, 20, 2.0).is_none());
}

#[test]
fn test_bollinger_collapses_on_constant_series() {
    let candles = candles_from_closes(&[100.0; 40]);
    let bb = calculate_bollinger_bands(&candles, 20, 2.0).unwrap();
    assert!((bb.upper - 100.0).abs() < 1e-9);
    assert!((bb.middle - 100.0).abs() < 1e-9);
    assert!((bb.lower - 100.0).abs() < 1e-9);
}

#[test]
fn test_bollinger_band_ordering() {
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + ((i % 9) as f64 - 4.0) * 1.2)
        .collect();
    let candles = candles_from_closes(&closes);
    let bb = calculate_bollinger_bands(&candles, 20, 2.0).unwrap();
    assert!(bb.upper > bb.middle);
    assert!(bb.middle > bb.lower);
    // Bands sit symmetrically around the middle.
    assert!(((bb.upper - bb.middle) - (bb.middle - bb.lower)).abs() < 1e-9);
}
