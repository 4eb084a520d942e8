use crate::common::math;
use crate::models::indicators::Candle;

/// Simple moving average of the close over the last `period` bars.
pub fn calculate_sma(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::sma(&closes, period)
}
