use analysis_core::{
    AnalysisError, EarningsOutcome, SentimentInputs, SentimentLabel, SentimentResult,
    SentimentScorer,
};
use async_trait::async_trait;

/// Weight of the analyst recommendation mean in the composite score
const MEAN_WEIGHT: f64 = 40.0;
/// Weight of the short-interest component
const SHORT_WEIGHT: f64 = 30.0;
/// Weight of the earnings beat record
const BEAT_WEIGHT: f64 = 30.0;

/// Short float at or above this fraction scores zero
const SHORT_FLOAT_CEILING: f64 = 0.20;

/// Earnings surprise fraction beyond which a quarter counts as a clear
/// beat or miss rather than in-line
const SURPRISE_THRESHOLD: f64 = 0.05;

pub struct SentimentScoringEngine;

impl SentimentScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Composite sentiment score in [0, 100]. Three sub-scores are each
    /// clamped independently before summation, then the sum is clamped
    /// and rounded. A missing input defaults to the midpoint of its
    /// component's range so absence never reads as an extreme.
    pub fn score_inputs(&self, inputs: &SentimentInputs) -> SentimentResult {
        let mean_score = inputs
            .recommendation_mean
            .map(|mean| (((5.0 - mean) / 4.0) * MEAN_WEIGHT).clamp(0.0, MEAN_WEIGHT))
            .unwrap_or(MEAN_WEIGHT / 2.0);

        let short_score = inputs
            .short_float_pct
            .map(|short| ((1.0 - short / SHORT_FLOAT_CEILING) * SHORT_WEIGHT).clamp(0.0, SHORT_WEIGHT))
            .unwrap_or(SHORT_WEIGHT / 2.0);

        // Unknown quarters leave the denominator; in-line quarters stay
        let counted = inputs
            .earnings_record
            .iter()
            .filter(|o| **o != EarningsOutcome::Unknown)
            .count();
        let beats = inputs
            .earnings_record
            .iter()
            .filter(|o| **o == EarningsOutcome::Beat)
            .count();
        let beat_score = if counted > 0 {
            beats as f64 / counted as f64 * BEAT_WEIGHT
        } else {
            BEAT_WEIGHT / 2.0
        };

        let score = (mean_score + short_score + beat_score).clamp(0.0, 100.0).round() as u32;

        SentimentResult {
            score,
            label: SentimentLabel::from_score(score),
        }
    }
}

#[async_trait]
impl SentimentScorer for SentimentScoringEngine {
    async fn score(&self, inputs: &SentimentInputs) -> Result<SentimentResult, AnalysisError> {
        Ok(self.score_inputs(inputs))
    }
}

impl Default for SentimentScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a reported quarter by its surprise fraction against the
/// consensus estimate. A missing surprise is unclassifiable and excluded
/// from the beat-rate denominator.
pub fn classify_surprise(surprise: Option<f64>) -> EarningsOutcome {
    match surprise {
        None => EarningsOutcome::Unknown,
        Some(s) if s > SURPRISE_THRESHOLD => EarningsOutcome::Beat,
        Some(s) if s < -SURPRISE_THRESHOLD => EarningsOutcome::Miss,
        Some(_) => EarningsOutcome::InLine,
    }
}

/// Consensus label for an analyst recommendation mean
pub fn consensus_label(mean: Option<f64>) -> &'static str {
    match mean {
        None => "N/A",
        Some(m) if m <= 1.5 => "Strong Buy",
        Some(m) if m <= 2.5 => "Buy",
        Some(m) if m <= 3.5 => "Hold",
        Some(m) if m <= 4.5 => "Sell",
        Some(_) => "Strong Sell",
    }
}
