//! Job types for the evaluation and supervision workflows

use crate::models::indicators::Candle;
use crate::models::signal::Signal;
use serde::{Deserialize, Serialize};

/// Job to fetch candle history for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchCandlesJob {
    pub symbol: String,
}

/// Job to compute indicators and score a signal from candles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateSignalJob {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

/// Job to run a scored signal through the admission gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmitSignalJob {
    pub signal: Signal,
}

/// Job to run one supervision scan over the open positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisePositionsJob {}
