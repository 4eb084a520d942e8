//! Technical indicator calculations and the per-symbol snapshot engine

pub mod engine;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use engine::{IndicatorEngine, MIN_BARS};
