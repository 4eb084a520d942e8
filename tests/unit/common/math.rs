//! Unit tests for shared math primitives

use sentrix::common::math::{ema, ema_series, sma, standard_deviation};

#[test]
fn test_sma_insufficient_data() {
    let values = vec![1.0, 2.0, 3.0];
    assert!(sma(&values, 5).is_none());
    assert!(sma(&values, 0).is_none());
}

#[test]
fn test_sma_uses_last_window() {
    let values = vec![10.0, 20.0, 1.0, 2.0, 3.0];
    let result = sma(&values, 3).unwrap();
    assert!((result - 2.0).abs() < 1e-12);
}

#[test]
fn test_standard_deviation_constant_series() {
    let values = vec![5.0; 30];
    let result = standard_deviation(&values, 20).unwrap();
    assert!(result.abs() < 1e-12);
}

#[test]
fn test_standard_deviation_known_value() {
    // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is 2.
    let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let result = standard_deviation(&values, 8).unwrap();
    assert!((result - 2.0).abs() < 1e-12);
}

#[test]
fn test_ema_constant_series() {
    let values = vec![100.0; 50];
    let result = ema(&values, 12).unwrap();
    assert!((result - 100.0).abs() < 1e-9);
}

#[test]
fn test_ema_insufficient_data() {
    let values = vec![1.0; 10];
    assert!(ema(&values, 20).is_none());
}

#[test]
fn test_ema_series_alignment() {
    let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let series = ema_series(&values, 10).unwrap();
    // One output per input starting from the seed bar.
    assert_eq!(series.len(), values.len() - 10 + 1);
    // Seed is the SMA of the first 10 values.
    let seed: f64 = values[..10].iter().sum::<f64>() / 10.0;
    assert!((series[0] - seed).abs() < 1e-12);
}

#[test]
fn test_ema_tracks_rising_series() {
    let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let short = ema(&values, 12).unwrap();
    let long = ema(&values, 26).unwrap();
    // Shorter period reacts faster, so it sits closer to the latest value.
    assert!(short > long);
}
