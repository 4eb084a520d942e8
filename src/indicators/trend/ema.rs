use crate::common::math;
use crate::models::indicators::Candle;

/// Exponential moving average of the close over `period` bars.
pub fn calculate_ema(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema(&closes, period)
}
