//! Persistence for signals, rejection audits, and positions

pub mod postgres;

pub use postgres::PgStore;

use crate::errors::BoxError;
use crate::models::signal::{RejectedSignal, Signal};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Audit sink for admitted and rejected signals.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn insert_signal(&self, signal: &Signal) -> Result<(), BoxError>;

    async fn insert_rejected(&self, rejected: &RejectedSignal) -> Result<(), BoxError>;
}

/// Vec-backed store used by tests and single-process runs.
#[derive(Default)]
pub struct InMemorySignalStore {
    pub signals: RwLock<Vec<Signal>>,
    pub rejected: RwLock<Vec<RejectedSignal>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn insert_signal(&self, signal: &Signal) -> Result<(), BoxError> {
        self.signals.write().await.push(signal.clone());
        Ok(())
    }

    async fn insert_rejected(&self, rejected: &RejectedSignal) -> Result<(), BoxError> {
        self.rejected.write().await.push(rejected.clone());
        Ok(())
    }
}
