use crate::cache::redis::RedisCache;
use crate::errors::BoxError;
use crate::models::signal::RawCandidate;
use std::sync::Arc;
use tracing::debug;

/// Hand-off queue for external signal candidates.
///
/// The API server writes one candidate per symbol into Redis; the worker
/// consumes it on the next evaluation cycle. Entries expire after the
/// freshness window, so a candidate nobody evaluates simply ages out.
pub struct CandidateQueue {
    cache: Arc<RedisCache>,
    ttl_secs: u64,
}

impl CandidateQueue {
    pub fn new(cache: Arc<RedisCache>, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }

    fn key(symbol: &str) -> String {
        format!("candidate:{}", symbol)
    }

    pub async fn publish(&self, candidate: &RawCandidate) -> Result<(), BoxError> {
        debug!(
            symbol = %candidate.symbol,
            source = %candidate.source,
            "Publishing signal candidate"
        );
        self.cache
            .set_json(&Self::key(&candidate.symbol), candidate, Some(self.ttl_secs))
            .await
    }

    /// Pop the pending candidate for `symbol`, if any. Consumed at most once.
    pub async fn take(&self, symbol: &str) -> Result<Option<RawCandidate>, BoxError> {
        let key = Self::key(symbol);
        let candidate: Option<RawCandidate> = self.cache.get_json(&key).await?;
        if candidate.is_some() {
            self.cache.delete(&key).await?;
        }
        Ok(candidate)
    }
}
