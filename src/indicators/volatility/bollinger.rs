use crate::common::math;
use crate::models::indicators::{BollingerBands, Candle};

/// Bollinger bands: SMA of the close plus/minus `num_std` population
/// standard deviations over the same window.
pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: usize,
    num_std: f64,
) -> Option<BollingerBands> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::sma(&closes, period)?;
    let std_dev = math::standard_deviation(&closes, period)?;
    Some(BollingerBands {
        upper: middle + num_std * std_dev,
        middle,
        lower: middle - num_std * std_dev,
    })
}
