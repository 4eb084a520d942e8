pub mod macd;
pub mod rsi;
