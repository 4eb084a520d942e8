//! Job context for dependency injection

use crate::config::EngineConfig;
use crate::metrics::Metrics;
use crate::positions::store::PositionStore;
use crate::positions::supervisor::PositionSupervisor;
use crate::execution::ExecutionProvider;
use crate::services::market_data::MarketDataProvider;
use crate::signals::admission::AdmissionGate;
use crate::signals::candidates::CandidateQueue;
use crate::signals::scorer::SignalScorer;
use std::sync::Arc;

/// Context passed to job handlers via the Apalis Data<T> pattern.
///
/// Jobs only read market data that an upstream collector has already
/// written; they never open market connections of their own.
pub struct JobContext {
    pub data_provider: Arc<dyn MarketDataProvider>,
    pub scorer: Arc<SignalScorer>,
    pub gate: Arc<AdmissionGate>,
    pub supervisor: Arc<PositionSupervisor>,
    pub position_store: Arc<dyn PositionStore>,
    pub executor: Arc<dyn ExecutionProvider>,
    pub candidates: Arc<CandidateQueue>,
    pub config: EngineConfig,
    pub metrics: Option<Arc<Metrics>>,
}
