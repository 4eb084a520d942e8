//! Job queue system for signal evaluation and position supervision

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use types::{AdmitSignalJob, EvaluateSignalJob, FetchCandlesJob, SupervisePositionsJob};
