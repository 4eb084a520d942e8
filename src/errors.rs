//! Engine error taxonomy

use crate::models::signal::RejectReason;
use thiserror::Error;
use uuid::Uuid;

/// Boxed error type used at job-handler and collaborator boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the signal and supervision core.
///
/// None of these are fatal to the process: `InsufficientData` means the
/// caller should wait for more bars, `SignalRejected` is an expected
/// outcome that is always recorded, `ExecutionFailure` triggers a rollback
/// and `StaleReadRace` means the position changed under us and is skipped
/// for the current cycle.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("insufficient data: have {have} bars, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("signal rejected: {0}")]
    SignalRejected(RejectReason),

    #[error("execution failure: {0}")]
    ExecutionFailure(String),

    #[error("stale read race on position {0}")]
    StaleReadRace(Uuid),

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
}
