//! Execution collaborator interface and its REST implementation

use crate::errors::BoxError;
use crate::models::position::{CloseInstruction, Direction};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request to open a position.
#[derive(Debug, Clone, Serialize)]
pub struct OpenOrder {
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub leverage: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Execution venue's answer to an open or close request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExecutionReport {
    pub filled: bool,
    pub fill_price: f64,
}

/// Collaborator that actually touches the market. The engine itself never
/// opens exchange connections.
#[async_trait]
pub trait ExecutionProvider: Send + Sync {
    async fn open(&self, order: &OpenOrder) -> Result<ExecutionReport, BoxError>;

    async fn close(&self, instruction: &CloseInstruction) -> Result<ExecutionReport, BoxError>;
}

/// HTTP client for the execution service.
pub struct RestExecutionProvider {
    client: reqwest::Client,
    base_url: String,
}

impl RestExecutionProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn post_order<B: Serialize>(
        &self,
        url: String,
        body: &B,
    ) -> Result<ExecutionReport, BoxError> {
        let send = || async {
            let response = self.client.post(&url).json(body).send().await?;
            response
                .error_for_status()?
                .json::<ExecutionReport>()
                .await
        };
        let report = send
            .retry(ExponentialBuilder::default().with_max_times(2))
            .notify(|err, duration| {
                warn!(
                    url = %url,
                    error = %err,
                    backoff_ms = duration.as_millis() as u64,
                    "Execution request failed, retrying"
                );
            })
            .await?;
        Ok(report)
    }
}

#[async_trait]
impl ExecutionProvider for RestExecutionProvider {
    async fn open(&self, order: &OpenOrder) -> Result<ExecutionReport, BoxError> {
        debug!(symbol = %order.symbol, direction = order.direction.as_str(), "Submitting open order");
        self.post_order(format!("{}/orders", self.base_url), order)
            .await
    }

    async fn close(&self, instruction: &CloseInstruction) -> Result<ExecutionReport, BoxError> {
        debug!(
            position_id = %instruction.position_id,
            reason = instruction.reason.as_str(),
            "Submitting close instruction"
        );
        self.post_order(
            format!("{}/orders/{}/close", self.base_url, instruction.position_id),
            instruction,
        )
        .await
    }
}
