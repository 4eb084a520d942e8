use crate::models::indicators::{Candle, IndicatorSnapshot};
use crate::models::signal::{RawCandidate, Signal, SignalDirection, SignalReason};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Tunables for the rule-based scorer.
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub candidate_weight: f64,
    pub timeframe: String,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            max_confidence: 0.95,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.04,
            candidate_weight: 0.2,
            timeframe: "1m".to_string(),
        }
    }
}

/// Proposed direction plus accumulated confidence.
struct Proposal {
    direction: Option<SignalDirection>,
    confidence: f64,
    reasons: Vec<SignalReason>,
    candidate_source: Option<String>,
}

impl Proposal {
    fn new() -> Self {
        Self {
            direction: None,
            confidence: 0.5,
            reasons: Vec::new(),
            candidate_source: None,
        }
    }

    /// Apply a directional vote. The first fired rule sets the direction;
    /// later rules add only when they agree and are skipped otherwise, so
    /// the vote magnitudes are always additive.
    fn vote(&mut self, direction: SignalDirection, description: &str, weight: f64) {
        match self.direction {
            None => self.direction = Some(direction),
            Some(proposed) if proposed != direction => return,
            Some(_) => {}
        }
        self.confidence += weight;
        self.reasons.push(SignalReason {
            description: description.to_string(),
            weight,
        });
    }

    /// Non-directional confirmation; only meaningful once a direction exists.
    fn confirm(&mut self, description: &str, weight: f64) {
        if self.direction.is_some() {
            self.confidence += weight;
            self.reasons.push(SignalReason {
                description: description.to_string(),
                weight,
            });
        }
    }
}

/// Deterministic rule-based signal scorer.
///
/// Rules fire in a fixed priority order: RSI extremes (contrarian), then
/// Bollinger touch, MACD cross, moving-average trend alignment, volume
/// confirmation, and finally an optional external candidate. Confidence
/// starts at a neutral 0.5, accumulates fixed increments, and is capped at
/// 0.95 so admission always retains a veto. "Hold" is never emitted: a
/// cycle with no fired rule produces no signal.
pub struct SignalScorer {
    config: ScorerConfig,
}

impl SignalScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        symbol: &str,
        snapshot: &IndicatorSnapshot,
        candles: &[Candle],
        candidate: Option<&RawCandidate>,
    ) -> Option<Signal> {
        let mut proposal = Proposal::new();
        let price = snapshot.price;

        // RSI extremes read as exhaustion: oversold proposes a buy even in
        // a falling market, overbought proposes a sell.
        if snapshot.rsi < 30.0 {
            proposal.vote(SignalDirection::Buy, "rsi_oversold", 0.2);
        } else if snapshot.rsi > 70.0 {
            proposal.vote(SignalDirection::Sell, "rsi_overbought", 0.2);
        }

        if price <= snapshot.bb_lower {
            proposal.vote(SignalDirection::Buy, "bollinger_lower_touch", 0.15);
        } else if price >= snapshot.bb_upper {
            proposal.vote(SignalDirection::Sell, "bollinger_upper_touch", 0.15);
        }

        if snapshot.macd > snapshot.macd_signal {
            let weight = if snapshot.macd > 0.0 { 0.15 } else { 0.1 };
            proposal.vote(SignalDirection::Buy, "macd_bullish_cross", weight);
        } else if snapshot.macd < snapshot.macd_signal {
            let weight = if snapshot.macd < 0.0 { 0.15 } else { 0.1 };
            proposal.vote(SignalDirection::Sell, "macd_bearish_cross", weight);
        }

        if price > snapshot.sma20 && snapshot.sma20 > snapshot.sma50 {
            proposal.vote(SignalDirection::Buy, "uptrend_alignment", 0.1);
        } else if price < snapshot.sma20 && snapshot.sma20 < snapshot.sma50 {
            proposal.vote(SignalDirection::Sell, "downtrend_alignment", 0.1);
        }

        if let Some(last) = candles.last() {
            let lookback = 20.min(candles.len());
            let mean_volume = candles[candles.len() - lookback..]
                .iter()
                .map(|c| c.volume)
                .sum::<f64>()
                / lookback as f64;
            if last.volume > mean_volume {
                proposal.confirm("volume_confirmation", 0.05);
            }
        }

        if let Some(candidate) = candidate {
            let weight = self.config.candidate_weight * candidate.confidence.clamp(0.0, 1.0);
            let had_direction = proposal.direction;
            proposal.vote(candidate.direction, "external_candidate", weight);
            // The candidate's source labels the signal only when its side
            // actually carried: it either set the direction or agreed.
            if had_direction.is_none() || had_direction == Some(candidate.direction) {
                proposal.candidate_source = Some(candidate.source.clone());
            }
        }

        let direction = match proposal.direction {
            Some(direction) => direction,
            None => {
                debug!(symbol = symbol, "No rule fired, no signal");
                return None;
            }
        };

        let confidence = proposal.confidence.min(self.config.max_confidence);
        if confidence < self.config.min_confidence {
            debug!(
                symbol = symbol,
                confidence = confidence,
                "Signal below confidence floor, dropped"
            );
            return None;
        }

        let (stop_loss, take_profit) = match direction {
            SignalDirection::Buy => (
                price * (1.0 - self.config.stop_loss_pct),
                price * (1.0 + self.config.take_profit_pct),
            ),
            SignalDirection::Sell => (
                price * (1.0 + self.config.stop_loss_pct),
                price * (1.0 - self.config.take_profit_pct),
            ),
        };

        let source = proposal
            .candidate_source
            .clone()
            .unwrap_or_else(|| "technical".to_string());

        debug!(
            symbol = symbol,
            direction = direction.as_str(),
            confidence = confidence,
            source = %source,
            "Scored signal"
        );

        Some(Signal {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            direction,
            source,
            confidence,
            entry_price: price,
            stop_loss,
            take_profit,
            timeframe: self.config.timeframe.clone(),
            created_at: Utc::now(),
            reasons: proposal.reasons,
            snapshot: snapshot.clone(),
        })
    }
}
