use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

/// Reliability assigned to a source nobody has rated yet.
pub const DEFAULT_RELIABILITY: f64 = 0.5;

/// Per-source reliability scores consulted by the admission gate.
///
/// The internal "technical" source is seeded at full reliability so signals
/// produced by the indicator pipeline are never filtered on source grounds.
pub struct SourceRegistry {
    scores: RwLock<HashMap<String, f64>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        let mut scores = HashMap::new();
        scores.insert("technical".to_string(), 1.0);
        Self {
            scores: RwLock::new(scores),
        }
    }

    /// Reliability for `source`, falling back to [`DEFAULT_RELIABILITY`]
    /// for unknown sources.
    pub fn reliability(&self, source: &str) -> f64 {
        self.scores
            .read()
            .map(|scores| scores.get(source).copied().unwrap_or(DEFAULT_RELIABILITY))
            .unwrap_or(DEFAULT_RELIABILITY)
    }

    pub fn set_reliability(&self, source: &str, reliability: f64) {
        if let Ok(mut scores) = self.scores.write() {
            info!(
                source = source,
                reliability = reliability,
                "Updated source reliability"
            );
            scores.insert(source.to_string(), reliability.clamp(0.0, 1.0));
        }
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
