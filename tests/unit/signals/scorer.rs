//! Unit tests for the rule-based scorer

use chrono::Utc;
use sentrix::models::indicators::{Candle, IndicatorSnapshot, TrendDirection};
use sentrix::models::signal::{RawCandidate, SignalDirection};
use sentrix::signals::scorer::{ScorerConfig, SignalScorer};

fn neutral_snapshot(price: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: 50.0,
        macd: 0.0,
        macd_signal: 0.0,
        bb_upper: price + 10.0,
        bb_middle: price,
        bb_lower: price - 10.0,
        sma20: price,
        sma50: price,
        sma200: price,
        ema12: price,
        ema26: price,
        price,
        price_change_pct: 0.0,
        analysis_score: 0.5,
        trend: TrendDirection::Neutral,
        computed_at: Utc::now(),
    }
}

fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|_| Candle::new(price, price, price, price, 1000.0, Utc::now()))
        .collect()
}

fn candidate(direction: SignalDirection, confidence: f64) -> RawCandidate {
    RawCandidate {
        symbol: "BTC-PERP".to_string(),
        direction,
        confidence,
        source: "telegram".to_string(),
        created_at: Utc::now(),
    }
}

fn scorer() -> SignalScorer {
    SignalScorer::new(ScorerConfig::default())
}

#[test]
fn test_no_rule_fires_no_signal() {
    let snapshot = neutral_snapshot(100.0);
    let candles = flat_candles(30, 100.0);
    assert!(scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .is_none());
}

#[test]
fn test_oversold_rsi_proposes_buy() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    let candles = flat_candles(30, 100.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert!((signal.confidence - 0.7).abs() < 1e-9);
    assert_eq!(signal.entry_price, 100.0);
    assert!((signal.stop_loss - 98.0).abs() < 1e-9);
    assert!((signal.take_profit - 104.0).abs() < 1e-9);
    assert_eq!(signal.source, "technical");
}

#[test]
fn test_overbought_rsi_proposes_sell_with_mirrored_brackets() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 80.0;
    let candles = flat_candles(30, 100.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert_eq!(signal.direction, SignalDirection::Sell);
    assert!((signal.stop_loss - 102.0).abs() < 1e-9);
    assert!((signal.take_profit - 96.0).abs() < 1e-9);
}

#[test]
fn test_macd_cross_and_trend_alignment_stack() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.macd = 1.5;
    snapshot.macd_signal = 0.5;
    snapshot.sma20 = 98.0;
    snapshot.sma50 = 95.0;
    let candles = flat_candles(30, 100.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert_eq!(signal.direction, SignalDirection::Buy);
    // 0.5 + 0.15 (cross above zero) + 0.1 (alignment)
    assert!((signal.confidence - 0.75).abs() < 1e-9);
    assert_eq!(signal.reasons.len(), 2);
}

#[test]
fn test_macd_cross_below_zero_has_smaller_weight() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.macd = -0.5;
    snapshot.macd_signal = -1.0;
    snapshot.sma20 = 98.0;
    snapshot.sma50 = 95.0;
    let candles = flat_candles(30, 100.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    // 0.5 + 0.1 (cross below zero) + 0.1 (alignment)
    assert!((signal.confidence - 0.7).abs() < 1e-9);
}

#[test]
fn test_disagreeing_rules_do_not_subtract() {
    // Oversold RSI proposes buy; bearish MACD cross and downtrend
    // alignment disagree and are skipped.
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    snapshot.macd = -2.0;
    snapshot.macd_signal = -1.0;
    snapshot.sma20 = 102.0;
    snapshot.sma50 = 104.0;
    let candles = flat_candles(30, 100.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert!((signal.confidence - 0.7).abs() < 1e-9);
}

#[test]
fn test_volume_confirmation_adds_increment() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    let mut candles = flat_candles(30, 100.0);
    candles.last_mut().unwrap().volume = 5000.0;
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert!((signal.confidence - 0.75).abs() < 1e-9);
}

#[test]
fn test_confidence_capped_below_one() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    snapshot.bb_lower = 101.0; // price at/below lower band
    snapshot.macd = 1.0;
    snapshot.macd_signal = 0.5;
    snapshot.sma20 = 98.0;
    snapshot.sma50 = 95.0;
    let mut candles = flat_candles(30, 100.0);
    candles.last_mut().unwrap().volume = 5000.0;
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, None)
        .unwrap();
    assert!((signal.confidence - 0.95).abs() < 1e-9);
}

#[test]
fn test_weak_candidate_alone_is_below_floor() {
    let snapshot = neutral_snapshot(100.0);
    let candles = flat_candles(30, 100.0);
    let weak = candidate(SignalDirection::Buy, 0.4);
    // 0.5 + 0.2 * 0.4 = 0.58 < 0.6
    assert!(scorer()
        .score("BTC-PERP", &snapshot, &candles, Some(&weak))
        .is_none());
}

#[test]
fn test_agreeing_candidate_labels_source() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    let candles = flat_candles(30, 100.0);
    let external = candidate(SignalDirection::Buy, 1.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, Some(&external))
        .unwrap();
    assert!((signal.confidence - 0.9).abs() < 1e-9);
    assert_eq!(signal.source, "telegram");
}

#[test]
fn test_disagreeing_candidate_is_ignored() {
    let mut snapshot = neutral_snapshot(100.0);
    snapshot.rsi = 20.0;
    let candles = flat_candles(30, 100.0);
    let external = candidate(SignalDirection::Sell, 1.0);
    let signal = scorer()
        .score("BTC-PERP", &snapshot, &candles, Some(&external))
        .unwrap();
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert!((signal.confidence - 0.7).abs() < 1e-9);
    assert_eq!(signal.source, "technical");
}
