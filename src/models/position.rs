use crate::models::signal::SignalDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl From<SignalDirection> for Direction {
    fn from(direction: SignalDirection) -> Self {
        match direction {
            SignalDirection::Buy => Direction::Long,
            SignalDirection::Sell => Direction::Short,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Position lifecycle. At most one terminal transition:
/// `Open -> Closing -> Closed`, or `Open -> Cancelled` (administrative).
/// `Closing -> Open` is the rollback path after a failed close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closing,
    Closed,
    Cancelled,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Open => "open",
            PositionStatus::Closing => "closing",
            PositionStatus::Closed => "closed",
            PositionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for PositionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(PositionStatus::Open),
            "closing" => Ok(PositionStatus::Closing),
            "closed" => Ok(PositionStatus::Closed),
            "cancelled" => Ok(PositionStatus::Cancelled),
            other => Err(format!("unknown position status: {}", other)),
        }
    }
}

/// Why a position was (or is being) closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    Timeout,
    DirectionalSignal,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::TakeProfit => "take_profit",
            CloseReason::StopLoss => "stop_loss",
            CloseReason::Timeout => "timeout",
            CloseReason::DirectionalSignal => "directional_signal",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CloseReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "take_profit" => Ok(CloseReason::TakeProfit),
            "stop_loss" => Ok(CloseReason::StopLoss),
            "timeout" => Ok(CloseReason::Timeout),
            "directional_signal" => Ok(CloseReason::DirectionalSignal),
            other => Err(format!("unknown close reason: {}", other)),
        }
    }
}

/// An open (or archived) position.
///
/// `current_price` and `realized_pnl` are written only by the supervision
/// loop; all status changes go through the store's compare-and-swap
/// transition so two concurrent close attempts cannot both win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub user_id: i64,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub current_price: f64,
    pub quantity: f64,
    pub leverage: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: PositionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_reason: Option<CloseReason>,
    pub realized_pnl: Option<f64>,
}

impl Position {
    /// A fresh open position at `entry_price`.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        user_id: i64,
        symbol: String,
        direction: Direction,
        entry_price: f64,
        quantity: f64,
        leverage: f64,
        stop_loss: f64,
        take_profit: f64,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            symbol,
            direction,
            entry_price,
            current_price: entry_price,
            quantity,
            leverage,
            stop_loss,
            take_profit,
            status: PositionStatus::Open,
            opened_at,
            closed_at: None,
            close_reason: None,
            realized_pnl: None,
        }
    }
}

/// Ephemeral message handed to the execution collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseInstruction {
    pub position_id: Uuid,
    pub reason: CloseReason,
    pub requested_at: DateTime<Utc>,
}

impl CloseInstruction {
    pub fn new(position_id: Uuid, reason: CloseReason) -> Self {
        Self {
            position_id,
            reason,
            requested_at: Utc::now(),
        }
    }
}
