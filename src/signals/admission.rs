use crate::config::EngineConfig;
use crate::db::SignalStore;
use crate::models::signal::{RejectReason, RejectedSignal, Signal};
use crate::signals::sources::SourceRegistry;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of one admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Accepted,
    Rejected(RejectReason),
    Duplicate,
}

/// Final gate between scored signals and execution.
///
/// Checks run in a fixed order so a signal failing several rules is always
/// reported with the same reason: freshness, confidence, symbol allow-list,
/// then source reliability. Re-admission of an already accepted signal id
/// is a no-op.
pub struct AdmissionGate {
    config: EngineConfig,
    sources: Arc<SourceRegistry>,
    store: Arc<dyn SignalStore>,
    admitted: RwLock<HashSet<Uuid>>,
}

impl AdmissionGate {
    pub fn new(
        config: EngineConfig,
        sources: Arc<SourceRegistry>,
        store: Arc<dyn SignalStore>,
    ) -> Self {
        Self {
            config,
            sources,
            store,
            admitted: RwLock::new(HashSet::new()),
        }
    }

    pub async fn admit(&self, signal: &Signal, now: DateTime<Utc>) -> AdmissionOutcome {
        if self.admitted.read().await.contains(&signal.id) {
            return AdmissionOutcome::Duplicate;
        }

        if let Some(reason) = self.check(signal, now) {
            self.record_rejection(signal, reason, now).await;
            return AdmissionOutcome::Rejected(reason);
        }

        {
            let mut admitted = self.admitted.write().await;
            if !admitted.insert(signal.id) {
                return AdmissionOutcome::Duplicate;
            }
        }

        if let Err(e) = self.store.insert_signal(signal).await {
            warn!(
                signal_id = %signal.id,
                error = %e,
                "Failed to persist admitted signal"
            );
        }
        info!(
            signal_id = %signal.id,
            symbol = %signal.symbol,
            direction = signal.direction.as_str(),
            confidence = signal.confidence,
            source = %signal.source,
            "Signal admitted"
        );
        AdmissionOutcome::Accepted
    }

    fn check(&self, signal: &Signal, now: DateTime<Utc>) -> Option<RejectReason> {
        let age_ms = signal.age_ms(now);
        if age_ms > self.config.freshness_window_secs as i64 * 1000 {
            return Some(RejectReason::Stale);
        }
        if signal.confidence < self.config.min_confidence {
            return Some(RejectReason::LowConfidence);
        }
        if !self
            .config
            .allowed_symbols
            .iter()
            .any(|s| s == &signal.symbol)
        {
            return Some(RejectReason::BadSymbol);
        }
        if self.sources.reliability(&signal.source) < self.config.min_source_reliability {
            return Some(RejectReason::UnreliableSource);
        }
        None
    }

    async fn record_rejection(&self, signal: &Signal, reason: RejectReason, now: DateTime<Utc>) {
        let rejected = RejectedSignal {
            signal_id: signal.id,
            symbol: signal.symbol.clone(),
            reason,
            confidence: signal.confidence,
            age_ms: signal.age_ms(now),
            rejected_at: now,
        };
        info!(
            signal_id = %signal.id,
            symbol = %signal.symbol,
            reason = reason.as_str(),
            age_ms = rejected.age_ms,
            "Signal rejected"
        );
        if let Err(e) = self.store.insert_rejected(&rejected).await {
            warn!(
                signal_id = %signal.id,
                error = %e,
                "Failed to persist rejection audit record"
            );
        }
    }
}
