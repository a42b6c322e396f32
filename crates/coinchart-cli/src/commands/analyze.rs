//! 분석 실행 및 보고서 출력.

use anyhow::{Context, Result};
use coinchart_analytics::{AnalysisEngine, AnalysisReport, IndicatorKind};
use coinchart_core::{analysis_span, AppConfig, DecimalExt, SignalKind};
use serde::Serialize;

use super::load::load_candles;
use super::{write_output, OutputFormat};

/// 표에서 근거 문자열 최대 표시 길이.
const RATIONALE_WIDTH: usize = 72;

/// 분석 명령 설정.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// 캔들 파일 경로 (.json / .csv)
    pub input: String,
    pub format: OutputFormat,
    /// 계산할 지표 (비어 있으면 전체)
    pub only: Vec<IndicatorKind>,
    /// 보고서에 표시할 심볼 (파일의 심볼보다 우선)
    pub symbol: Option<String>,
    pub output: Option<String>,
}

/// `--only` 인자를 파싱합니다 (쉼표 구분).
pub fn parse_kinds(s: &str) -> Result<Vec<IndicatorKind>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<IndicatorKind>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

#[derive(Serialize)]
struct Summary {
    bullish: usize,
    bearish: usize,
    neutral: usize,
    overall_bias: SignalKind,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'a str>,
    summary: Summary,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// 분석 명령을 실행합니다.
pub fn run_analyze(app: &AppConfig, config: &AnalyzeConfig) -> Result<AnalysisReport> {
    let loaded = load_candles(&config.input)?;
    let symbol = config
        .symbol
        .clone()
        .or(loaded.symbol)
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let _span = analysis_span!("analyze", symbol, loaded.series.len()).entered();

    let engine = AnalysisEngine::new(app.analysis.clone());
    let report = if config.only.is_empty() {
        engine.analyze(&loaded.series)
    } else {
        engine.analyze_selected(&loaded.series, &config.only)
    };

    let content = render_report(&report, Some(&symbol), config.format)?;
    write_output(&content, config.output.as_deref())?;

    Ok(report)
}

/// 보고서를 지정한 형식의 문자열로 만듭니다.
pub fn render_report(report: &AnalysisReport, symbol: Option<&str>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(report, symbol)),
        OutputFormat::Json => format_json(report, symbol),
    }
}

fn format_json(report: &AnalysisReport, symbol: Option<&str>) -> Result<String> {
    let json = JsonReport {
        symbol,
        summary: Summary {
            bullish: report.bullish_count(),
            bearish: report.bearish_count(),
            neutral: report.neutral_count(),
            overall_bias: report.overall_bias(),
        },
        report,
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize to JSON")
}

fn format_table(report: &AnalysisReport, symbol: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Symbol: {}   Candles: {}   Last close: {}\n\n",
        symbol.unwrap_or("-"),
        report.candle_count,
        report
            .last_close
            .map(|c| c.round_display(8).to_string())
            .unwrap_or_else(|| "-".to_string())
    ));

    // 헤더
    output.push_str(&format!(
        "{:<20} {:<8} {:>7}  {}\n",
        "INDICATOR", "SIGNAL", "POINTS", "RATIONALE"
    ));
    output.push_str(&"-".repeat(110));
    output.push('\n');

    // 데이터
    for (kind, signal) in &report.signals {
        let points = report.outputs.get(kind).map(|o| o.len()).unwrap_or(0);
        let mut rationale = signal.rationale.iter();
        output.push_str(&format!(
            "{:<20} {:<8} {:>7}  {}\n",
            kind.display_name(),
            signal.kind.to_string(),
            points,
            truncate(rationale.next().map(String::as_str).unwrap_or(""), RATIONALE_WIDTH)
        ));
        for line in rationale {
            output.push_str(&format!("{:<38}{}\n", "", truncate(line, RATIONALE_WIDTH)));
        }
        output.push_str(&format!("{:<38}-> {}\n", "", signal.recommendation));
    }

    if !report.skipped.is_empty() {
        output.push_str("\nSkipped:\n");
        for (kind, reason) in &report.skipped {
            output.push_str(&format!("  {}: {}\n", kind.display_name(), reason));
        }
    }

    // 요약
    output.push('\n');
    output.push_str(&format!(
        "Bullish: {}  Bearish: {}  Neutral: {}  Overall: {}",
        report.bullish_count(),
        report.bearish_count(),
        report.neutral_count(),
        report.overall_bias()
    ));

    output
}

/// 문자열 자르기 (UTF-8 안전).
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
