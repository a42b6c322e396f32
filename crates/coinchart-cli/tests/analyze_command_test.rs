//! 파일 로딩부터 보고서 출력까지의 통합 테스트.

use std::fs;
use std::path::PathBuf;

use coinchart_analytics::IndicatorKind;
use coinchart_cli::commands::analyze::{run_analyze, AnalyzeConfig};
use coinchart_cli::commands::OutputFormat;
use coinchart_core::{AppConfig, SignalKind};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("coinchart-{}-{}", std::process::id(), name))
}

/// 1시간 간격의 상승 캔들 CSV (epoch 초).
fn rising_csv(count: i64) -> String {
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for i in 0..count {
        let close = 100 + i;
        csv.push_str(&format!(
            "{},{},{},{},{},1000\n",
            1_700_000_000 + i * 3600,
            close - 1,
            close + 1,
            close - 2,
            close
        ));
    }
    csv
}

#[test]
fn test_analyze_csv_writes_json_report() {
    let input = scratch_path("rising.csv");
    let output = scratch_path("rising-report.json");
    fs::write(&input, rising_csv(120)).unwrap();

    let config = AnalyzeConfig {
        input: input.to_string_lossy().into_owned(),
        format: OutputFormat::Json,
        only: vec![IndicatorKind::Sma, IndicatorKind::SuperTrend],
        symbol: Some("TEST/USDT".to_string()),
        output: Some(output.to_string_lossy().into_owned()),
    };

    let report = run_analyze(&AppConfig::default(), &config).unwrap();
    assert_eq!(report.candle_count, 120);
    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.overall_bias(), SignalKind::Bullish);

    let written = fs::read_to_string(&output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["symbol"], "TEST/USDT");
    assert_eq!(value["candle_count"], 120);
    assert_eq!(value["summary"]["bullish"], 2);
    assert!(value["outputs"]["super_trend"].is_object());

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_analyze_wrapped_json_uses_file_symbol() {
    let input = scratch_path("wrapped.json");
    let output = scratch_path("wrapped-report.txt");
    let candles: Vec<String> = (0..30)
        .map(|i| {
            format!(
                r#"{{"timestamp":{},"open":"100","high":"101","low":"99","close":"100","volume":"10"}}"#,
                1_700_000_000_000_i64 + i * 60_000
            )
        })
        .collect();
    fs::write(
        &input,
        format!(r#"{{"symbol":"FLAT/KRW","candles":[{}]}}"#, candles.join(",")),
    )
    .unwrap();

    let config = AnalyzeConfig {
        input: input.to_string_lossy().into_owned(),
        format: OutputFormat::Table,
        only: vec![],
        symbol: None,
        output: Some(output.to_string_lossy().into_owned()),
    };

    let report = run_analyze(&AppConfig::default(), &config).unwrap();
    assert_eq!(report.candle_count, 30);

    let table = fs::read_to_string(&output).unwrap();
    assert!(table.contains("FLAT/KRW"));
    assert!(table.contains("INDICATOR"));

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_analyze_rejects_malformed_candle() {
    let input = scratch_path("broken.csv");
    // high < low
    fs::write(
        &input,
        "timestamp,open,high,low,close,volume\n1700000000,100,90,95,100,1\n",
    )
    .unwrap();

    let config = AnalyzeConfig {
        input: input.to_string_lossy().into_owned(),
        format: OutputFormat::Json,
        only: vec![],
        symbol: None,
        output: None,
    };

    assert!(run_analyze(&AppConfig::default(), &config).is_err());
    fs::remove_file(&input).ok();
}

#[test]
fn test_analyze_missing_file_fails() {
    let config = AnalyzeConfig {
        input: scratch_path("does-not-exist.csv").to_string_lossy().into_owned(),
        format: OutputFormat::Table,
        only: vec![],
        symbol: None,
        output: None,
    };
    assert!(run_analyze(&AppConfig::default(), &config).is_err());
}
