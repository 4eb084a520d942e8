use crate::errors::EngineError;
use crate::indicators::momentum::macd::calculate_macd;
use crate::indicators::momentum::rsi::calculate_rsi;
use crate::indicators::trend::ema::calculate_ema;
use crate::indicators::trend::sma::calculate_sma;
use crate::indicators::volatility::bollinger::calculate_bollinger_bands;
use crate::models::indicators::{Candle, IndicatorSnapshot, TrendDirection};
use chrono::Utc;
use tracing::debug;

/// Minimum candle history required before a snapshot is computed. The
/// longest lookback is the 200-bar moving average.
pub const MIN_BARS: usize = 200;

/// Computes one [`IndicatorSnapshot`] per symbol from raw candle history.
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Compute a full snapshot from `candles`, oldest first.
    ///
    /// Fails with [`EngineError::InsufficientData`] below [`MIN_BARS`];
    /// partial snapshots are never produced.
    pub fn compute(candles: &[Candle]) -> Result<IndicatorSnapshot, EngineError> {
        let insufficient = || EngineError::InsufficientData {
            have: candles.len(),
            need: MIN_BARS,
        };
        if candles.len() < MIN_BARS {
            return Err(insufficient());
        }

        let price = candles[candles.len() - 1].close;
        let prev_close = candles[candles.len() - 2].close;
        let price_change_pct = if prev_close != 0.0 {
            (price - prev_close) / prev_close * 100.0
        } else {
            0.0
        };

        // All lookbacks fit inside MIN_BARS, so every calculation below is
        // guaranteed to succeed once the length check passed.
        let rsi = calculate_rsi(candles, 14).ok_or_else(insufficient)?;
        let macd = calculate_macd(candles, 12, 26, 9).ok_or_else(insufficient)?;
        let bb = calculate_bollinger_bands(candles, 20, 2.0).ok_or_else(insufficient)?;
        let sma20 = calculate_sma(candles, 20).ok_or_else(insufficient)?;
        let sma50 = calculate_sma(candles, 50).ok_or_else(insufficient)?;
        let sma200 = calculate_sma(candles, 200).ok_or_else(insufficient)?;
        let ema12 = calculate_ema(candles, 12).ok_or_else(insufficient)?;
        let ema26 = calculate_ema(candles, 26).ok_or_else(insufficient)?;

        let analysis_score = Self::analysis_score(rsi, macd.macd, sma20, sma50, price);
        let trend = if analysis_score > 0.6 {
            TrendDirection::Bullish
        } else if analysis_score < 0.4 {
            TrendDirection::Bearish
        } else {
            TrendDirection::Neutral
        };

        debug!(
            price = price,
            rsi = rsi,
            analysis_score = analysis_score,
            trend = ?trend,
            "Computed indicator snapshot"
        );

        Ok(IndicatorSnapshot {
            rsi,
            macd: macd.macd,
            macd_signal: macd.signal,
            bb_upper: bb.upper,
            bb_middle: bb.middle,
            bb_lower: bb.lower,
            sma20,
            sma50,
            sma200,
            ema12,
            ema26,
            price,
            price_change_pct,
            analysis_score,
            trend,
            computed_at: Utc::now(),
        })
    }

    /// Composite market-condition score in `[0, 1]`, centered at 0.5.
    ///
    /// Fixed additive adjustments: overbought RSI pulls the score down and
    /// oversold pulls it up, a positive MACD line and price above the 20-
    /// and 50-bar averages each push it up.
    fn analysis_score(rsi: f64, macd: f64, sma20: f64, sma50: f64, price: f64) -> f64 {
        let mut score: f64 = 0.5;

        if rsi > 70.0 {
            score -= 0.2;
        } else if rsi < 30.0 {
            score += 0.2;
        }
        if macd > 0.0 {
            score += 0.1;
        } else {
            score -= 0.1;
        }
        if price > sma20 {
            score += 0.1;
        }
        if price > sma50 {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }
}
