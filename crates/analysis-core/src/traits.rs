use crate::{
    AnalysisError, Bar, CompanyFacts, IndicatorReport, MetricSeries, PriceQuote, SentimentInputs,
    SentimentResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for technical indicator engines. `generated_at` is passed in
/// explicitly so a report is reproducible without mocking the clock.
#[async_trait]
pub trait TechnicalAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        quote: Option<PriceQuote>,
        generated_at: DateTime<Utc>,
    ) -> Result<IndicatorReport, AnalysisError>;
}

/// Trait for regulatory-fact normalizers. Absent concepts yield an empty
/// series, not an error.
#[async_trait]
pub trait FundamentalAnalyzer: Send + Sync {
    /// Flow-type figures (revenue, net income): quarterly and annual
    /// observations classified by period length.
    async fn flow_series(
        &self,
        facts: &CompanyFacts,
        concept: &str,
        unit: &str,
    ) -> Result<MetricSeries, AnalysisError>;

    /// Point-in-time figures (cash, debt, shares): one observation per
    /// period end, restatements resolved by filing date.
    async fn point_in_time_series(
        &self,
        facts: &CompanyFacts,
        concept: &str,
        unit: &str,
    ) -> Result<MetricSeries, AnalysisError>;
}

/// Trait for sentiment scoring engines
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, inputs: &SentimentInputs) -> Result<SentimentResult, AnalysisError>;
}
