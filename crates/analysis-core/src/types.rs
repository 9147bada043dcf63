use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OHLCV bar data. Fields other than the timestamp are nullable because
/// daily feeds report non-trading gaps (holidays, halts) as nulls; window
/// computations must filter those out rather than treat them as zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Authoritative current price / previous close pair from the quote feed.
/// When absent, the indicator engine derives both from the last two bars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceQuote {
    pub current: f64,
    pub previous_close: f64,
}

/// Current price and day-over-day change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSummary {
    pub current: f64,
    pub change: f64,
    pub change_pct: Option<f64>,
}

/// 20/50/200-period simple moving averages, each null when the series is
/// shorter than its window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
}

/// MACD(12,26,9) at the latest point of the series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger Bands(20, 2) at the latest point of the series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Latest volume against its 20-day average
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeStats {
    pub today: Option<f64>,
    pub avg_20: Option<f64>,
    pub ratio: Option<f64>,
}

/// 52-week price range over the supplied window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRange {
    pub high_52: Option<f64>,
    pub low_52: Option<f64>,
    pub pct_from_high: Option<f64>,
}

/// How a signal counts toward the overall outlook vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// One derived technical signal: display text plus an explicit direction
/// tag, so classification never depends on inspecting the text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub text: String,
    pub direction: SignalDirection,
}

impl Signal {
    pub fn new(text: impl Into<String>, direction: SignalDirection) -> Self {
        Self {
            text: text.into(),
            direction,
        }
    }
}

/// Overall technical classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outlook {
    Bullish,
    Bearish,
    Neutral,
}

impl Outlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::Bullish => "BULLISH",
            Outlook::Bearish => "BEARISH",
            Outlook::Neutral => "NEUTRAL",
        }
    }
}

/// Immutable technical snapshot for one symbol, derived from a single bar
/// series. Recomputing on identical inputs (including `generated_at`)
/// yields an identical report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub price: PriceSummary,
    pub moving_averages: MovingAverages,
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub bollinger_bands: Option<BollingerBands>,
    pub volume: VolumeStats,
    pub year_range: YearRange,
    pub signals: Vec<Signal>,
    pub overall: Outlook,
}

/// Regulatory filing form type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormType {
    TenK,
    TenQ,
    Other(String),
}

impl FormType {
    pub fn as_str(&self) -> &str {
        match self {
            FormType::TenK => "10-K",
            FormType::TenQ => "10-Q",
            FormType::Other(s) => s,
        }
    }
}

impl Serialize for FormType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "10-K" => FormType::TenK,
            "10-Q" => FormType::TenQ,
            _ => FormType::Other(s),
        })
    }
}

/// One reported value for a single GAAP concept, as filed. Raw facts for a
/// concept may contain multiple filings covering overlapping or restated
/// periods; the normalizer resolves those downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryFact {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub filed: NaiveDate,
    pub form: FormType,
    pub val: f64,
}

/// All filed observations for one concept, keyed by reporting unit
/// (e.g. "USD", "USD/shares", "shares")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptFacts {
    pub units: HashMap<String, Vec<RegulatoryFact>>,
}

/// A company facts document: GAAP concept name -> unit -> observations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyFacts {
    #[serde(flatten)]
    pub concepts: HashMap<String, ConceptFacts>,
}

impl CompanyFacts {
    /// Observations for a concept/unit pair; `None` when either is absent
    pub fn observations(&self, concept: &str, unit: &str) -> Option<&[RegulatoryFact]> {
        self.concepts
            .get(concept)?
            .units
            .get(unit)
            .map(Vec::as_slice)
    }
}

/// One normalized metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub period_end: NaiveDate,
    pub form: FormType,
    pub value: f64,
}

/// Normalized metric observations ordered ascending by period end
pub type MetricSeries = Vec<MetricPoint>;

/// Outcome of one reported quarter against the consensus estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EarningsOutcome {
    Beat,
    Miss,
    InLine,
    Unknown,
}

/// Inputs to the sentiment scorer. `recommendation_mean` runs 1 (strong
/// buy) to 5 (strong sell); `short_float_pct` is a fraction of float.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentInputs {
    pub recommendation_mean: Option<f64>,
    pub short_float_pct: Option<f64>,
    pub earnings_record: Vec<EarningsOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Bullish")]
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Very Bearish")]
    VeryBearish,
}

impl SentimentLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 75 => SentimentLabel::VeryBullish,
            s if s >= 55 => SentimentLabel::Bullish,
            s if s >= 40 => SentimentLabel::Neutral,
            s if s >= 20 => SentimentLabel::Bearish,
            _ => SentimentLabel::VeryBearish,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryBullish => "Very Bullish",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::VeryBearish => "Very Bearish",
        }
    }
}

/// Composite sentiment score with its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub score: u32,
    pub label: SentimentLabel,
}
