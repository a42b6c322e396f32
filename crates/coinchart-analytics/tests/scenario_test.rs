//! 대표 시나리오 테스트
//!
//! 상승 시리즈, 데이터 부족, 고정 기대값(피벗/피보나치), 전체 분석 패스 검증

mod common;

use coinchart_analytics::indicators::{MovingAverageKind, MovingAverages, SuperTrendIndicator, SuperTrendParams};
use coinchart_analytics::levels::{classic_pivots, fibonacci_levels, SwingParams, SwingPointDetector};
use coinchart_analytics::{AnalysisEngine, IndicatorKind, IndicatorOutput};
use coinchart_core::{AnalysisConfig, Candle, CandleSeries, SignalKind, SwingKind};
use common::{rising_series, series_from_closes, ts};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_rising_series_scenario() {
    let series = rising_series(30);

    let sma = MovingAverages::new()
        .calculate(&series, 20, MovingAverageKind::Sma)
        .unwrap();
    assert_eq!(sma.len(), 11);
    assert!(sma.last().unwrap().value > sma.first().unwrap().value);

    let supertrend = SuperTrendIndicator::new()
        .calculate(&series, SuperTrendParams::default())
        .unwrap();
    assert!(supertrend.last().unwrap().is_uptrend);

    for sensitivity in [1, 5, 10, 14] {
        let detector = SwingPointDetector::new(SwingParams {
            sensitivity,
            ..Default::default()
        })
        .unwrap();
        let swings = detector.detect(&series);

        assert_eq!(swings.iter().filter(|s| s.kind == SwingKind::High).count(), 0);
        let lows: Vec<_> = swings.iter().filter(|s| s.kind == SwingKind::Low).collect();
        assert_eq!(lows.len(), 1, "sensitivity {}", sensitivity);
        assert_eq!(lows[0].index, 0);
    }
}

#[test]
fn test_swing_detection_requires_full_window() {
    let series = rising_series(30);
    let detector = SwingPointDetector::new(SwingParams {
        sensitivity: 15,
        ..Default::default()
    })
    .unwrap();

    assert!(detector.detect(&series).is_empty());
}

#[test]
fn test_insufficient_data_returns_empty() {
    let series = rising_series(5);

    for kind in [
        MovingAverageKind::Sma,
        MovingAverageKind::Ema,
        MovingAverageKind::Wma,
        MovingAverageKind::Hull,
    ] {
        let result = MovingAverages::new().calculate(&series, 20, kind).unwrap();
        assert!(result.is_empty(), "{} should be empty", kind);
    }
}

#[test]
fn test_classic_pivot_values() {
    let candles = vec![
        Candle::new(ts(0), dec!(95), dec!(110), dec!(90), dec!(100), dec!(1000)),
        Candle::new(ts(1), dec!(100), dec!(104), dec!(99), dec!(103), dec!(1000)),
    ];
    let series = CandleSeries::new(candles).unwrap();
    let pivots = classic_pivots(&series).unwrap();

    assert_eq!(pivots.pp, dec!(100));
    assert_eq!(pivots.r1, dec!(110));
    assert_eq!(pivots.s1, dec!(90));
    assert_eq!(pivots.r2, dec!(120));
    assert_eq!(pivots.s2, dec!(80));
}

#[test]
fn test_fibonacci_reference_levels() {
    let series = series_from_closes(&[dec!(150), dec!(200), dec!(100), dec!(140)]);
    let fib = fibonacci_levels(&series).unwrap();

    assert_eq!(fib.retracement(dec!(0.5)), Some(dec!(150)));
    assert_eq!(fib.retracement(dec!(0)), Some(dec!(200)));
    assert_eq!(fib.retracement(dec!(1)), Some(dec!(100)));
}

#[test]
fn test_engine_rising_series_leans_bullish() {
    let series = rising_series(120);
    let report = AnalysisEngine::default().analyze(&series);

    assert_eq!(report.last_close, Some(dec!(219)));
    assert!(report.skipped.is_empty());
    assert!(report.signals[&IndicatorKind::Sma].is_bullish());
    assert!(report.signals[&IndicatorKind::SuperTrend].is_bullish());
    assert_eq!(report.overall_bias(), SignalKind::Bullish);
}

#[test]
fn test_engine_selected_kinds_only() {
    let series = rising_series(60);
    let report = AnalysisEngine::default().analyze_selected(
        &series,
        &[IndicatorKind::ZigZag, IndicatorKind::Fibonacci, IndicatorKind::ZigZag],
    );

    assert_eq!(report.outputs.len(), 2);
    assert!(matches!(report.outputs[&IndicatorKind::Fibonacci], IndicatorOutput::Fibonacci(Some(_))));
}

#[test]
fn test_engine_failing_indicator_does_not_abort_pass() {
    let mut config = AnalysisConfig::default();
    config.zigzag.deviation_pct = dec!(0);
    config.swing.sensitivity = 0;

    let report = AnalysisEngine::new(config).analyze(&rising_series(60));

    assert!(report.skipped.contains_key(&IndicatorKind::ZigZag));
    assert!(report.skipped.contains_key(&IndicatorKind::SupportResistance));
    assert!(report.skipped.contains_key(&IndicatorKind::TrendLines));
    assert_eq!(report.outputs.len() + report.skipped.len(), IndicatorKind::ALL.len());
}

#[test]
fn test_free_function_entry_points() {
    let series = rising_series(30);

    let swings = coinchart_analytics::find_swing_points(&series, 5).unwrap();
    assert_eq!(swings.len(), 1);
    assert_eq!(swings[0].kind, SwingKind::Low);
    assert!(coinchart_analytics::find_swing_points(&series, 0).is_err());

    let pivots = coinchart_analytics::zigzag(&series, dec!(3.5)).unwrap();
    assert!(pivots.iter().all(|p| p.index < series.len()));
    assert!(coinchart_analytics::zigzag(&series, Decimal::ZERO).is_err());
}
