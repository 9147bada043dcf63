use analysis_core::{
    AnalysisError, CompanyFacts, FormType, FundamentalAnalyzer, MetricPoint, MetricSeries,
};
use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use std::collections::BTreeMap;

/// Longest period, in days, accepted as a single fiscal quarter in a 10-Q.
/// Excludes cumulative year-to-date figures co-filed in 10-Qs.
const MAX_QUARTER_DAYS: i64 = 110;

/// Shortest period, in days, accepted as a full fiscal year in a 10-K.
/// Excludes partial-year stub periods.
const MIN_ANNUAL_DAYS: i64 = 300;

/// Trailing window measured from the reference date against period end.
const LOOKBACK_MONTHS: u32 = 60;

/// Normalizes raw regulatory facts into clean, time-ordered metric series.
/// The reference date is an explicit field so extraction is reproducible
/// without mocking the clock.
pub struct FactNormalizerEngine {
    as_of: NaiveDate,
}

impl FactNormalizerEngine {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    fn cutoff(&self) -> NaiveDate {
        self.as_of
            .checked_sub_months(Months::new(LOOKBACK_MONTHS))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Flow-type figures (revenue, net income, R&D). Keeps 10-K and 10-Q
    /// filings inside the lookback window, classified by period length:
    /// a 10-Q must cover a single fiscal quarter, a 10-K a full fiscal
    /// year. Does not deduplicate by period end: a concept may
    /// legitimately report both a 10-K and a 10-Q value ending on the
    /// same date across different filings.
    pub fn extract_metric(&self, facts: &CompanyFacts, concept: &str, unit: &str) -> MetricSeries {
        let Some(observations) = facts.observations(concept, unit) else {
            tracing::debug!("Concept {} ({}) absent from facts document", concept, unit);
            return Vec::new();
        };

        let cutoff = self.cutoff();
        let mut series: MetricSeries = observations
            .iter()
            .filter(|f| matches!(f.form, FormType::TenK | FormType::TenQ))
            .filter(|f| f.end >= cutoff)
            .filter(|f| {
                // A fact without a period start cannot be classified
                let Some(start) = f.start else {
                    return false;
                };
                let days = (f.end - start).num_days();
                match f.form {
                    FormType::TenQ => days < MAX_QUARTER_DAYS,
                    FormType::TenK => days > MIN_ANNUAL_DAYS,
                    FormType::Other(_) => false,
                }
            })
            .map(|f| MetricPoint {
                period_end: f.end,
                form: f.form.clone(),
                value: f.val,
            })
            .collect();

        // Stable sort: a 10-K and 10-Q sharing an end date both stay, in
        // filing order
        series.sort_by_key(|p| p.period_end);
        series
    }

    /// Point-in-time figures (cash, debt, shares outstanding). Filters to
    /// the lookback window only, then keeps one observation per period
    /// end: the latest filed, so restatements and amendments supersede
    /// the original filing.
    pub fn extract_latest_by_period(
        &self,
        facts: &CompanyFacts,
        concept: &str,
        unit: &str,
    ) -> MetricSeries {
        let Some(observations) = facts.observations(concept, unit) else {
            tracing::debug!("Concept {} ({}) absent from facts document", concept, unit);
            return Vec::new();
        };

        let cutoff = self.cutoff();
        let mut by_period: BTreeMap<NaiveDate, &analysis_core::RegulatoryFact> = BTreeMap::new();
        for fact in observations {
            if fact.end < cutoff {
                continue;
            }
            match by_period.get(&fact.end) {
                Some(existing) if existing.filed >= fact.filed => {}
                _ => {
                    by_period.insert(fact.end, fact);
                }
            }
        }

        by_period
            .into_values()
            .map(|f| MetricPoint {
                period_end: f.end,
                form: f.form.clone(),
                value: f.val,
            })
            .collect()
    }
}

#[async_trait]
impl FundamentalAnalyzer for FactNormalizerEngine {
    async fn flow_series(
        &self,
        facts: &CompanyFacts,
        concept: &str,
        unit: &str,
    ) -> Result<MetricSeries, AnalysisError> {
        Ok(self.extract_metric(facts, concept, unit))
    }

    async fn point_in_time_series(
        &self,
        facts: &CompanyFacts,
        concept: &str,
        unit: &str,
    ) -> Result<MetricSeries, AnalysisError> {
        Ok(self.extract_latest_by_period(facts, concept, unit))
    }
}

/// The quarterly (10-Q) observations of a series, order preserved
pub fn quarterly(series: &MetricSeries) -> MetricSeries {
    series
        .iter()
        .filter(|p| p.form == FormType::TenQ)
        .cloned()
        .collect()
}

/// The annual (10-K) observations of a series, order preserved
pub fn annual(series: &MetricSeries) -> MetricSeries {
    series
        .iter()
        .filter(|p| p.form == FormType::TenK)
        .cloned()
        .collect()
}

/// Value for an exact period end and form, for joining metrics across
/// concepts (e.g. net income against revenue for the same fiscal year)
pub fn lookup(series: &MetricSeries, period_end: NaiveDate, form: &FormType) -> Option<f64> {
    series
        .iter()
        .find(|p| p.period_end == period_end && p.form == *form)
        .map(|p| p.value)
}

/// Year-over-year growth in percent; undefined against a zero prior
pub fn yoy_growth(current: f64, prior: f64) -> Option<f64> {
    if prior == 0.0 {
        None
    } else {
        Some((current - prior) / prior.abs() * 100.0)
    }
}
