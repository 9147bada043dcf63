use super::analyzer::{classify, TechnicalAnalysisEngine};
use analysis_core::{AnalysisError, Bar, Outlook, PriceQuote, Signal, SignalDirection};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

fn bars_from_closes(closes: &[Option<f64>]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| Bar {
            timestamp: base_time() + Duration::days(i as i64),
            open: *close,
            high: close.map(|c| c + 1.0),
            low: close.map(|c| c - 1.0),
            close: *close,
            volume: close.map(|_| 1_000_000.0),
        })
        .collect()
}

fn uptrend_bars(n: usize) -> Vec<Bar> {
    let closes: Vec<Option<f64>> = (0..n).map(|i| Some(100.0 + i as f64)).collect();
    bars_from_closes(&closes)
}

#[test]
fn test_monotonic_uptrend_classifies_bullish() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(60);
    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert!(report.moving_averages.sma_20.is_some());
    assert!(report.moving_averages.sma_50.is_some());
    // 60 bars cannot fill a 200-period window
    assert!(report.moving_averages.sma_200.is_none());
    assert!((report.rsi.unwrap() - 100.0).abs() < 0.001);
    assert!(report.macd.as_ref().unwrap().histogram > 0.0);
    assert_eq!(report.overall, Outlook::Bullish);
}

#[test]
fn test_macd_signal_text_matches_histogram_sign() {
    let engine = TechnicalAnalysisEngine::new();

    let up = engine
        .analyze_bars("UP", &uptrend_bars(60), None, base_time())
        .unwrap();
    assert!(up.macd.as_ref().unwrap().histogram > 0.0);
    assert!(up.signals.iter().any(|s| s.text == "MACD bullish crossover"
        && s.direction == SignalDirection::Bullish));

    let closes: Vec<Option<f64>> = (0..60).map(|i| Some(200.0 - i as f64)).collect();
    let down = engine
        .analyze_bars("DOWN", &bars_from_closes(&closes), None, base_time())
        .unwrap();
    assert!(down.macd.as_ref().unwrap().histogram <= 0.0);
    assert!(down.signals.iter().any(|s| s.text == "MACD bearish crossover"
        && s.direction == SignalDirection::Bearish));
}

#[test]
fn test_null_closes_are_filtered() {
    let engine = TechnicalAnalysisEngine::new();
    let mut closes: Vec<Option<f64>> = (0..25).map(|i| Some(100.0 + i as f64)).collect();
    // Non-trading gaps interleaved with real bars
    closes.insert(5, None);
    closes.insert(12, None);
    closes.push(None);

    let report = engine
        .analyze_bars("TEST", &bars_from_closes(&closes), None, base_time())
        .unwrap();

    // 25 valid closes remain; last valid close is 124
    assert!((report.price.current - 124.0).abs() < 0.001);
    assert!(report.moving_averages.sma_20.is_some());
    assert!(report.moving_averages.sma_50.is_none());
}

#[test]
fn test_no_valid_closes_is_invalid_data() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = bars_from_closes(&[None, None, None]);

    let err = engine
        .analyze_bars("TEST", &bars, None, base_time())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidData(_)));
}

#[test]
fn test_single_bar_is_insufficient() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = bars_from_closes(&[Some(100.0)]);

    let err = engine
        .analyze_bars("TEST", &bars, None, base_time())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData(_)));
}

#[test]
fn test_quote_overrides_bar_closes() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(30);
    let quote = PriceQuote {
        current: 250.0,
        previous_close: 200.0,
    };

    let report = engine
        .analyze_bars("TEST", &bars, Some(quote), base_time())
        .unwrap();

    assert!((report.price.current - 250.0).abs() < 0.001);
    assert!((report.price.change - 50.0).abs() < 0.001);
    assert!((report.price.change_pct.unwrap() - 25.0).abs() < 0.001);
}

#[test]
fn test_change_derived_from_last_two_closes() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(30);

    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert!((report.price.current - 129.0).abs() < 0.001);
    assert!((report.price.change - 1.0).abs() < 0.001);
}

#[test]
fn test_zero_previous_close_guards_change_pct() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(30);
    let quote = PriceQuote {
        current: 100.0,
        previous_close: 0.0,
    };

    let report = engine
        .analyze_bars("TEST", &bars, Some(quote), base_time())
        .unwrap();

    assert!(report.price.change_pct.is_none());
}

#[test]
fn test_volume_ratio_against_flat_average() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(30);

    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert!((report.volume.today.unwrap() - 1_000_000.0).abs() < 0.001);
    assert!((report.volume.avg_20.unwrap() - 1_000_000.0).abs() < 0.001);
    assert!((report.volume.ratio.unwrap() - 1.0).abs() < 0.001);
}

#[test]
fn test_zero_average_volume_guards_ratio() {
    let engine = TechnicalAnalysisEngine::new();
    let mut bars = uptrend_bars(30);
    for bar in &mut bars {
        bar.volume = Some(0.0);
    }

    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert!(report.volume.ratio.is_none());
}

#[test]
fn test_year_range() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(60);

    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    // Highs run close + 1, lows close - 1
    assert!((report.year_range.high_52.unwrap() - 160.0).abs() < 0.001);
    assert!((report.year_range.low_52.unwrap() - 99.0).abs() < 0.001);
    let expected = (159.0 - 160.0) / 160.0 * 100.0;
    assert!((report.year_range.pct_from_high.unwrap() - expected).abs() < 0.001);
}

#[test]
fn test_short_history_degrades_to_null_fields() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(10);

    let report = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert!(report.moving_averages.sma_20.is_none());
    assert!(report.rsi.is_none());
    assert!(report.bollinger_bands.is_none());
    assert!(report.volume.avg_20.is_none());
    // MACD only needs two closes
    assert!(report.macd.is_some());
}

#[test]
fn test_report_is_idempotent() {
    let engine = TechnicalAnalysisEngine::new();
    let bars = uptrend_bars(60);

    let a = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();
    let b = engine.analyze_bars("TEST", &bars, None, base_time()).unwrap();

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_classify_majority_and_ties() {
    let bull = || Signal::new("up", SignalDirection::Bullish);
    let bear = || Signal::new("down", SignalDirection::Bearish);
    let flat = || Signal::new("flat", SignalDirection::Neutral);

    assert_eq!(classify(&[bull(), bull(), bear()]), Outlook::Bullish);
    assert_eq!(classify(&[bear(), bear(), bull()]), Outlook::Bearish);
    // Ties favor neutral; neutral signals join neither count
    assert_eq!(classify(&[bull(), bear(), flat(), flat()]), Outlook::Neutral);
    assert_eq!(classify(&[flat(), flat()]), Outlook::Neutral);
    assert_eq!(classify(&[]), Outlook::Neutral);
}
