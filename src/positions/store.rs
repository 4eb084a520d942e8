use crate::errors::BoxError;
use crate::models::position::{CloseReason, Direction, Position, PositionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage behind position supervision.
///
/// `transition` is the only way to change a position's status. It applies
/// compare-and-swap semantics: the update happens only if the stored status
/// still equals `from`, and the return value says whether this caller won.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn insert(&self, position: &Position) -> Result<(), BoxError>;

    async fn get(&self, id: Uuid) -> Result<Option<Position>, BoxError>;

    async fn list_open(&self) -> Result<Vec<Position>, BoxError>;

    async fn list_open_by_direction(&self, direction: Direction)
        -> Result<Vec<Position>, BoxError>;

    async fn update_mark(&self, id: Uuid, current_price: f64) -> Result<(), BoxError>;

    async fn transition(
        &self,
        id: Uuid,
        from: PositionStatus,
        to: PositionStatus,
    ) -> Result<bool, BoxError>;

    /// Finalize a close that already holds the `Closing` status. Writes the
    /// terminal fields atomically with the status flip to `Closed`.
    async fn finalize_close(
        &self,
        id: Uuid,
        reason: CloseReason,
        exit_price: f64,
        realized_pnl: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, BoxError>;
}

/// Map-backed store used by tests and single-process runs.
pub struct InMemoryPositionStore {
    positions: RwLock<HashMap<Uuid, Position>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPositionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn insert(&self, position: &Position) -> Result<(), BoxError> {
        self.positions
            .write()
            .await
            .insert(position.id, position.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Position>, BoxError> {
        Ok(self.positions.read().await.get(&id).cloned())
    }

    async fn list_open(&self) -> Result<Vec<Position>, BoxError> {
        Ok(self
            .positions
            .read()
            .await
            .values()
            .filter(|p| p.status == PositionStatus::Open)
            .cloned()
            .collect())
    }

    async fn list_open_by_direction(
        &self,
        direction: Direction,
    ) -> Result<Vec<Position>, BoxError> {
        Ok(self
            .positions
            .read()
            .await
            .values()
            .filter(|p| p.status == PositionStatus::Open && p.direction == direction)
            .cloned()
            .collect())
    }

    async fn update_mark(&self, id: Uuid, current_price: f64) -> Result<(), BoxError> {
        if let Some(position) = self.positions.write().await.get_mut(&id) {
            position.current_price = current_price;
        }
        Ok(())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: PositionStatus,
        to: PositionStatus,
    ) -> Result<bool, BoxError> {
        let mut positions = self.positions.write().await;
        match positions.get_mut(&id) {
            Some(position) if position.status == from => {
                position.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn finalize_close(
        &self,
        id: Uuid,
        reason: CloseReason,
        exit_price: f64,
        realized_pnl: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, BoxError> {
        let mut positions = self.positions.write().await;
        match positions.get_mut(&id) {
            Some(position) if position.status == PositionStatus::Closing => {
                position.status = PositionStatus::Closed;
                position.close_reason = Some(reason);
                position.current_price = exit_price;
                position.realized_pnl = Some(realized_pnl);
                position.closed_at = Some(closed_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
