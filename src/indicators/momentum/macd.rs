use crate::common::math;
use crate::models::indicators::{Candle, MacdIndicator};

/// MACD line, signal line, and histogram.
///
/// The MACD line is the difference between the fast and slow EMAs of the
/// close series; the signal line is an EMA of the MACD line itself.
pub fn calculate_macd(
    candles: &[Candle],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdIndicator> {
    if candles.len() < slow_period + signal_period {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let fast = math::ema_series(&closes, fast_period)?;
    let slow = math::ema_series(&closes, slow_period)?;

    // fast starts earlier; trim both series to the slow alignment.
    let offset = fast.len() - slow.len();
    let macd_line: Vec<f64> = slow
        .iter()
        .zip(fast[offset..].iter())
        .map(|(s, f)| f - s)
        .collect();

    let signal_series = math::ema_series(&macd_line, signal_period)?;
    let macd = *macd_line.last()?;
    let signal = *signal_series.last()?;

    Some(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
    })
}
