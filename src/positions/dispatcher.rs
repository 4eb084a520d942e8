use crate::errors::BoxError;
use crate::models::position::{CloseReason, Direction};
use crate::positions::store::PositionStore;
use crate::positions::supervisor::{CloseOutcome, PositionSupervisor};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Outcome of a directional close-all request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CloseAllReport {
    pub positions_found: usize,
    pub instructions_issued: usize,
}

/// Closes every open position on one side of the book.
///
/// Idempotent by construction: positions already in `Closing` or `Closed`
/// lose the status compare-and-swap inside the supervisor and are counted
/// as found but not issued.
pub struct DirectionalCloseDispatcher {
    store: Arc<dyn PositionStore>,
    supervisor: Arc<PositionSupervisor>,
}

impl DirectionalCloseDispatcher {
    pub fn new(store: Arc<dyn PositionStore>, supervisor: Arc<PositionSupervisor>) -> Self {
        Self { store, supervisor }
    }

    pub async fn close_all(&self, direction: Direction) -> Result<CloseAllReport, BoxError> {
        let positions = self.store.list_open_by_direction(direction).await?;
        let positions_found = positions.len();
        let mut instructions_issued = 0;

        for position in &positions {
            let outcome = self
                .supervisor
                .close_position(position, CloseReason::DirectionalSignal)
                .await?;
            match outcome {
                CloseOutcome::Confirmed | CloseOutcome::RolledBack => instructions_issued += 1,
                CloseOutcome::Skipped => {}
            }
        }

        info!(
            direction = direction.as_str(),
            positions_found = positions_found,
            instructions_issued = instructions_issued,
            "Directional close-all completed"
        );
        Ok(CloseAllReport {
            positions_found,
            instructions_issued,
        })
    }
}
