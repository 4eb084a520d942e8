use crate::models::indicators::IndicatorSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tradable signal direction. "Hold" is never emitted as a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "buy",
            SignalDirection::Sell => "sell",
        }
    }
}

/// One fired rule with its contribution, kept for explainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReason {
    pub description: String,
    pub weight: f64,
}

/// A scored signal ready for admission.
///
/// Invariants: `confidence` is derived only from the fixed rule set, and
/// stop/target straddle the entry consistently with the direction (stop
/// below entry and target above for buy, inverted for sell).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub symbol: String,
    pub direction: SignalDirection,
    pub source: String,
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub timeframe: String,
    pub created_at: DateTime<Utc>,
    pub reasons: Vec<SignalReason>,
    pub snapshot: IndicatorSnapshot,
}

impl Signal {
    /// Signal age in milliseconds at `now`.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_milliseconds()
    }
}

/// Raw candidate delivered by an external signal source; folded into
/// scoring as one extra vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    pub symbol: String,
    pub direction: SignalDirection,
    pub confidence: f64,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Why a signal was turned away at the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Stale,
    LowConfidence,
    BadSymbol,
    UnreliableSource,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Stale => "stale",
            RejectReason::LowConfidence => "low_confidence",
            RejectReason::BadSymbol => "bad_symbol",
            RejectReason::UnreliableSource => "unreliable_source",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-once audit record for a rejected signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedSignal {
    pub signal_id: Uuid,
    pub symbol: String,
    pub reason: RejectReason,
    pub confidence: f64,
    pub age_ms: i64,
    pub rejected_at: DateTime<Utc>,
}
