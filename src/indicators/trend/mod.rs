pub mod ema;
pub mod sma;
