//! Signal scoring and admission

pub mod admission;
pub mod candidates;
pub mod scorer;
pub mod sources;

pub use admission::{AdmissionGate, AdmissionOutcome};
pub use scorer::{ScorerConfig, SignalScorer};
pub use sources::SourceRegistry;
