use analysis_core::{
    AnalysisError, Bar, IndicatorReport, MovingAverages, Outlook, PriceQuote, PriceSummary,
    Signal, SignalDirection, TechnicalAnalyzer, VolumeStats, YearRange,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::indicators::{bollinger_bands, macd, rsi, sma};

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BB_PERIOD: usize = 20;
const BB_STD_DEV: f64 = 2.0;

pub struct TechnicalAnalysisEngine;

/// Filtered per-field series from one bar feed. Only bars with a close
/// survive; the other arrays come from those bars, dropping any remaining
/// nulls.
struct FilteredSeries {
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    volumes: Vec<f64>,
}

impl FilteredSeries {
    fn from_bars(bars: &[Bar]) -> Self {
        let traded: Vec<&Bar> = bars.iter().filter(|b| b.close.is_some()).collect();
        Self {
            closes: traded.iter().filter_map(|b| b.close).collect(),
            highs: traded.iter().filter_map(|b| b.high).collect(),
            lows: traded.iter().filter_map(|b| b.low).collect(),
            volumes: traded.iter().filter_map(|b| b.volume).collect(),
        }
    }
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the full indicator report for one symbol. Pure over its
    /// inputs: the same bars, quote and timestamp produce the same report.
    pub fn analyze_bars(
        &self,
        symbol: &str,
        bars: &[Bar],
        quote: Option<PriceQuote>,
        generated_at: DateTime<Utc>,
    ) -> Result<IndicatorReport, AnalysisError> {
        let series = FilteredSeries::from_bars(bars);
        let closes = &series.closes;

        tracing::debug!(
            "Filtered bar series for {}: {} valid of {} total",
            symbol,
            closes.len(),
            bars.len()
        );

        if closes.is_empty() {
            return Err(AnalysisError::InvalidData(format!(
                "no valid closes in bar feed for {symbol}"
            )));
        }
        if closes.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 valid bars for {symbol}, got {}",
                closes.len()
            )));
        }

        let (current, previous_close) = match quote {
            Some(q) => (q.current, q.previous_close),
            None => (closes[closes.len() - 1], closes[closes.len() - 2]),
        };

        let change = current - previous_close;
        let change_pct = if previous_close != 0.0 {
            Some(change / previous_close * 100.0)
        } else {
            None
        };

        let moving_averages = MovingAverages {
            sma_20: sma(closes, 20),
            sma_50: sma(closes, 50),
            sma_200: sma(closes, 200),
        };

        let rsi_value = rsi(closes, RSI_PERIOD);
        let macd_value = macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let bands = bollinger_bands(closes, BB_PERIOD, BB_STD_DEV);

        let today_volume = series.volumes.last().copied();
        let avg_20_volume = sma(&series.volumes, 20);
        let volume_ratio = match (today_volume, avg_20_volume) {
            (Some(today), Some(avg)) if avg > 0.0 => Some(today / avg),
            _ => None,
        };

        let high_52 = series.highs.iter().copied().reduce(f64::max);
        let low_52 = series.lows.iter().copied().reduce(f64::min);
        let pct_from_high = match high_52 {
            Some(high) if high != 0.0 => Some((current - high) / high * 100.0),
            _ => None,
        };

        // Ordered signal derivation. A step whose inputs are undefined
        // appends nothing.
        let mut signals: Vec<Signal> = Vec::new();

        if let Some(s20) = moving_averages.sma_20 {
            if current > s20 {
                signals.push(Signal::new(
                    "Price above 20-day MA (bullish)",
                    SignalDirection::Bullish,
                ));
            } else {
                signals.push(Signal::new(
                    "Price below 20-day MA (bearish)",
                    SignalDirection::Bearish,
                ));
            }
        }

        if let (Some(s20), Some(s50)) = (moving_averages.sma_20, moving_averages.sma_50) {
            if s20 > s50 {
                signals.push(Signal::new(
                    "20 MA above 50 MA (golden cross zone)",
                    SignalDirection::Bullish,
                ));
            } else {
                signals.push(Signal::new(
                    "20 MA below 50 MA (death cross zone)",
                    SignalDirection::Bearish,
                ));
            }
        }

        if let Some(r) = rsi_value {
            if r > 70.0 {
                signals.push(Signal::new("RSI overbought (>70)", SignalDirection::Bearish));
            } else if r < 30.0 {
                // Oversold never joined the vote in the reference
                // classifier; the tag keeps that count.
                signals.push(Signal::new("RSI oversold (<30)", SignalDirection::Neutral));
            } else {
                signals.push(Signal::new(
                    format!("RSI neutral ({r:.1})"),
                    SignalDirection::Neutral,
                ));
            }
        }

        if let Some(m) = &macd_value {
            if m.histogram > 0.0 {
                signals.push(Signal::new("MACD bullish crossover", SignalDirection::Bullish));
            } else {
                signals.push(Signal::new("MACD bearish crossover", SignalDirection::Bearish));
            }
        }

        if let Some(bb) = &bands {
            // Band position carries no vote.
            if current < bb.upper && current > bb.lower {
                signals.push(Signal::new(
                    "Price within Bollinger Bands",
                    SignalDirection::Neutral,
                ));
            } else if current >= bb.upper {
                signals.push(Signal::new(
                    "Price above upper Bollinger Band",
                    SignalDirection::Neutral,
                ));
            } else {
                signals.push(Signal::new(
                    "Price below lower Bollinger Band",
                    SignalDirection::Neutral,
                ));
            }
        }

        let overall = classify(&signals);

        Ok(IndicatorReport {
            symbol: symbol.to_string(),
            generated_at,
            price: PriceSummary {
                current,
                change,
                change_pct,
            },
            moving_averages,
            rsi: rsi_value,
            macd: macd_value,
            bollinger_bands: bands,
            volume: VolumeStats {
                today: today_volume,
                avg_20: avg_20_volume,
                ratio: volume_ratio,
            },
            year_range: YearRange {
                high_52,
                low_52,
                pct_from_high,
            },
            signals,
            overall,
        })
    }
}

/// Majority vote over signal directions. Neutral signals count toward
/// neither side; ties resolve to Neutral.
pub fn classify(signals: &[Signal]) -> Outlook {
    let bullish = signals
        .iter()
        .filter(|s| s.direction == SignalDirection::Bullish)
        .count();
    let bearish = signals
        .iter()
        .filter(|s| s.direction == SignalDirection::Bearish)
        .count();

    if bullish > bearish {
        Outlook::Bullish
    } else if bearish > bullish {
        Outlook::Bearish
    } else {
        Outlook::Neutral
    }
}

#[async_trait]
impl TechnicalAnalyzer for TechnicalAnalysisEngine {
    async fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        quote: Option<PriceQuote>,
        generated_at: DateTime<Utc>,
    ) -> Result<IndicatorReport, AnalysisError> {
        self.analyze_bars(symbol, bars, quote, generated_at)
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
