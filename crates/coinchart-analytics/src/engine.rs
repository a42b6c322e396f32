//! 분석 엔진.
//!
//! 하나의 캔들 시리즈에 대해 선택된 모든 지표를 계산하고, 지표별 신호를 분류하여
//! `AnalysisReport`로 묶습니다. 한 지표의 실패는 경고 로그를 남기고 해당 지표만
//! 제외하며 패스 전체를 중단하지 않습니다.

use coinchart_core::{
    AnalysisConfig, Band, CandleSeries, LinePoint, Price, Signal, SignalKind, SwingPoint, Zone,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::indicators::{
    IchimokuIndicator, IchimokuPoint, IndicatorError, IndicatorResult, MomentumCalculator,
    MovingAverageKind, MovingAverageSet, MovingAverages, ParabolicSar, SarPoint, SuperTrendIndicator,
    SuperTrendPoint, VolatilityIndicators,
};
use crate::levels::{
    classic_pivots, fibonacci_levels, range_statistics, support_resistance_zones,
    FibonacciLevels, PivotSet, RangeStatistics, SwingPointDetector, TrendLineAnalysis,
    TrendLineDetector, ZigZag,
};
use crate::signals::SignalClassifier;

/// 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Wma,
    HullMa,
    Envelope,
    Bollinger,
    Keltner,
    SuperTrend,
    ParabolicSar,
    Ichimoku,
    Rsi,
    ZigZag,
    SupportResistance,
    TrendLines,
    Fibonacci,
    Pivots,
    RangeStatistics,
}

impl IndicatorKind {
    /// 모든 지표 종류.
    pub const ALL: [IndicatorKind; 17] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Wma,
        IndicatorKind::HullMa,
        IndicatorKind::Envelope,
        IndicatorKind::Bollinger,
        IndicatorKind::Keltner,
        IndicatorKind::SuperTrend,
        IndicatorKind::ParabolicSar,
        IndicatorKind::Ichimoku,
        IndicatorKind::Rsi,
        IndicatorKind::ZigZag,
        IndicatorKind::SupportResistance,
        IndicatorKind::TrendLines,
        IndicatorKind::Fibonacci,
        IndicatorKind::Pivots,
        IndicatorKind::RangeStatistics,
    ];

    /// 설정/CLI에서 쓰는 식별자.
    pub fn id(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Wma => "wma",
            IndicatorKind::HullMa => "hull_ma",
            IndicatorKind::Envelope => "envelope",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Keltner => "keltner",
            IndicatorKind::SuperTrend => "super_trend",
            IndicatorKind::ParabolicSar => "parabolic_sar",
            IndicatorKind::Ichimoku => "ichimoku",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::ZigZag => "zig_zag",
            IndicatorKind::SupportResistance => "support_resistance",
            IndicatorKind::TrendLines => "trend_lines",
            IndicatorKind::Fibonacci => "fibonacci",
            IndicatorKind::Pivots => "pivots",
            IndicatorKind::RangeStatistics => "range_statistics",
        }
    }

    /// 사람이 읽는 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Wma => "WMA",
            IndicatorKind::HullMa => "Hull MA",
            IndicatorKind::Envelope => "MA Envelope",
            IndicatorKind::Bollinger => "Bollinger Bands",
            IndicatorKind::Keltner => "Keltner Channel",
            IndicatorKind::SuperTrend => "SuperTrend",
            IndicatorKind::ParabolicSar => "Parabolic SAR",
            IndicatorKind::Ichimoku => "Ichimoku",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::ZigZag => "ZigZag",
            IndicatorKind::SupportResistance => "Support/Resistance",
            IndicatorKind::TrendLines => "Trend Lines",
            IndicatorKind::Fibonacci => "Fibonacci",
            IndicatorKind::Pivots => "Pivot Points",
            IndicatorKind::RangeStatistics => "Range Statistics",
        }
    }

    /// 스윙 포인트를 입력으로 쓰는 지표인지 여부.
    pub fn needs_swing_points(&self) -> bool {
        matches!(self, IndicatorKind::SupportResistance | IndicatorKind::TrendLines)
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for IndicatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let kind = match normalized.as_str() {
            "hma" | "hull" => IndicatorKind::HullMa,
            "supertrend" => IndicatorKind::SuperTrend,
            "psar" | "sar" => IndicatorKind::ParabolicSar,
            "zigzag" => IndicatorKind::ZigZag,
            "sr" | "zones" => IndicatorKind::SupportResistance,
            "trendlines" => IndicatorKind::TrendLines,
            "fib" => IndicatorKind::Fibonacci,
            "pivot" => IndicatorKind::Pivots,
            "range" => IndicatorKind::RangeStatistics,
            other => {
                return IndicatorKind::ALL
                    .iter()
                    .copied()
                    .find(|k| k.id() == other)
                    .ok_or_else(|| format!("Unknown indicator: {}", s))
            }
        };
        Ok(kind)
    }
}

/// 지표 계산 결과 (종류별 태그 유니온).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IndicatorOutput {
    Line(Vec<LinePoint>),
    /// 단기/중기/장기 이동평균
    MovingAverages(MovingAverageSet),
    Bands(Vec<Band>),
    SuperTrend(Vec<SuperTrendPoint>),
    ParabolicSar(Vec<SarPoint>),
    Ichimoku(Vec<IchimokuPoint>),
    SwingPoints(Vec<SwingPoint>),
    Zones(Vec<Zone>),
    TrendLines(TrendLineAnalysis),
    Fibonacci(Option<FibonacciLevels>),
    Pivots(Option<PivotSet>),
    RangeStatistics(Option<RangeStatistics>),
}

impl IndicatorOutput {
    /// 결과 항목 수.
    pub fn len(&self) -> usize {
        match self {
            IndicatorOutput::Line(v) => v.len(),
            IndicatorOutput::MovingAverages(set) => set.len(),
            IndicatorOutput::Bands(v) => v.len(),
            IndicatorOutput::SuperTrend(v) => v.len(),
            IndicatorOutput::ParabolicSar(v) => v.len(),
            IndicatorOutput::Ichimoku(v) => v.len(),
            IndicatorOutput::SwingPoints(v) => v.len(),
            IndicatorOutput::Zones(v) => v.len(),
            IndicatorOutput::TrendLines(a) => a.lines.len() + a.breakouts.len(),
            IndicatorOutput::Fibonacci(v) => usize::from(v.is_some()),
            IndicatorOutput::Pivots(v) => usize::from(v.is_some()),
            IndicatorOutput::RangeStatistics(v) => usize::from(v.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_line(&self) -> Option<&[LinePoint]> {
        match self {
            IndicatorOutput::Line(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_moving_averages(&self) -> Option<&MovingAverageSet> {
        match self {
            IndicatorOutput::MovingAverages(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_bands(&self) -> Option<&[Band]> {
        match self {
            IndicatorOutput::Bands(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_supertrend(&self) -> Option<&[SuperTrendPoint]> {
        match self {
            IndicatorOutput::SuperTrend(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_parabolic_sar(&self) -> Option<&[SarPoint]> {
        match self {
            IndicatorOutput::ParabolicSar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ichimoku(&self) -> Option<&[IchimokuPoint]> {
        match self {
            IndicatorOutput::Ichimoku(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_swing_points(&self) -> Option<&[SwingPoint]> {
        match self {
            IndicatorOutput::SwingPoints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_zones(&self) -> Option<&[Zone]> {
        match self {
            IndicatorOutput::Zones(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_trend_lines(&self) -> Option<&TrendLineAnalysis> {
        match self {
            IndicatorOutput::TrendLines(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_fibonacci(&self) -> Option<&FibonacciLevels> {
        match self {
            IndicatorOutput::Fibonacci(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn as_pivots(&self) -> Option<&PivotSet> {
        match self {
            IndicatorOutput::Pivots(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn as_range_statistics(&self) -> Option<&RangeStatistics> {
        match self {
            IndicatorOutput::RangeStatistics(v) => v.as_ref(),
            _ => None,
        }
    }
}

/// 한 번의 분석 패스 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub candle_count: usize,
    pub last_close: Option<Price>,
    pub outputs: BTreeMap<IndicatorKind, IndicatorOutput>,
    pub signals: BTreeMap<IndicatorKind, Signal>,
    /// 파라미터/계산 오류로 제외된 지표와 사유
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skipped: BTreeMap<IndicatorKind, String>,
}

impl AnalysisReport {
    fn count(&self, kind: SignalKind) -> usize {
        self.signals.values().filter(|s| s.kind == kind).count()
    }

    pub fn bullish_count(&self) -> usize {
        self.count(SignalKind::Bullish)
    }

    pub fn bearish_count(&self) -> usize {
        self.count(SignalKind::Bearish)
    }

    pub fn neutral_count(&self) -> usize {
        self.count(SignalKind::Neutral)
    }

    /// 강세/약세 신호 수를 비교한 전체 편향.
    pub fn overall_bias(&self) -> SignalKind {
        match self.bullish_count().cmp(&self.bearish_count()) {
            std::cmp::Ordering::Greater => SignalKind::Bullish,
            std::cmp::Ordering::Less => SignalKind::Bearish,
            std::cmp::Ordering::Equal => SignalKind::Neutral,
        }
    }
}

/// 통합 분석 엔진.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    classifier: SignalClassifier,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AnalysisEngine {
    /// 설정으로 엔진을 생성합니다.
    pub fn new(config: AnalysisConfig) -> Self {
        let classifier = SignalClassifier::new((&config.classifier).into());
        Self { config, classifier }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 모든 지표를 계산합니다.
    pub fn analyze(&self, series: &CandleSeries) -> AnalysisReport {
        self.analyze_selected(series, &IndicatorKind::ALL)
    }

    /// 선택한 지표만 계산합니다. 중복은 한 번만 계산됩니다.
    pub fn analyze_selected(&self, series: &CandleSeries, kinds: &[IndicatorKind]) -> AnalysisReport {
        let started = Instant::now();
        let kinds: BTreeSet<IndicatorKind> = kinds.iter().copied().collect();

        // 스윙 포인트는 패스당 한 번만 계산하여 공유
        let swings = kinds
            .iter()
            .any(IndicatorKind::needs_swing_points)
            .then(|| SwingPointDetector::new((&self.config.swing).into()).map(|d| d.detect(series)));

        let mut report = AnalysisReport {
            candle_count: series.len(),
            last_close: series.last().map(|c| c.close),
            ..Default::default()
        };

        for kind in kinds {
            match self.compute(kind, series, swings.as_ref()) {
                Ok(output) => {
                    debug!(indicator = %kind, points = output.len(), "Indicator computed");
                    let signal = self.classifier.classify(kind, &output, series);
                    report.signals.insert(kind, signal);
                    report.outputs.insert(kind, output);
                }
                Err(e) => {
                    warn!(indicator = %kind, error = %e, "Indicator skipped");
                    report.skipped.insert(kind, e.to_string());
                }
            }
        }

        info!(
            candles = report.candle_count,
            indicators = report.outputs.len(),
            skipped = report.skipped.len(),
            bias = %report.overall_bias(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis pass completed"
        );

        report
    }

    /// 단일 지표를 계산합니다.
    pub fn compute(
        &self,
        kind: IndicatorKind,
        series: &CandleSeries,
        swings: Option<&IndicatorResult<Vec<SwingPoint>>>,
    ) -> IndicatorResult<IndicatorOutput> {
        let cfg = &self.config;
        let ma_periods = [
            cfg.moving_average.period,
            cfg.moving_average.medium_period,
            cfg.moving_average.long_period,
        ];
        let moving_averages = |kind: MovingAverageKind| -> IndicatorResult<IndicatorOutput> {
            Ok(IndicatorOutput::MovingAverages(
                MovingAverages::new().calculate_periods(series, &ma_periods, kind)?,
            ))
        };

        let output = match kind {
            IndicatorKind::Sma => moving_averages(MovingAverageKind::Sma)?,
            IndicatorKind::Ema => moving_averages(MovingAverageKind::Ema)?,
            IndicatorKind::Wma => moving_averages(MovingAverageKind::Wma)?,
            IndicatorKind::HullMa => moving_averages(MovingAverageKind::Hull)?,
            IndicatorKind::Envelope => {
                IndicatorOutput::Bands(MovingAverages::new().envelope(series, (&cfg.envelope).into())?)
            }
            IndicatorKind::Bollinger => IndicatorOutput::Bands(
                VolatilityIndicators::new().bollinger_bands(series, (&cfg.bollinger).into())?,
            ),
            IndicatorKind::Keltner => IndicatorOutput::Bands(
                VolatilityIndicators::new().keltner_channel(series, (&cfg.keltner).into())?,
            ),
            IndicatorKind::SuperTrend => IndicatorOutput::SuperTrend(
                SuperTrendIndicator::new().calculate(series, (&cfg.supertrend).into())?,
            ),
            IndicatorKind::ParabolicSar => IndicatorOutput::ParabolicSar(
                ParabolicSar::new().calculate(series, (&cfg.parabolic_sar).into())?,
            ),
            IndicatorKind::Ichimoku => IndicatorOutput::Ichimoku(
                IchimokuIndicator::new().calculate(series, (&cfg.ichimoku).into())?,
            ),
            IndicatorKind::Rsi => {
                IndicatorOutput::Line(MomentumCalculator::new().rsi(series, (&cfg.rsi).into())?)
            }
            IndicatorKind::ZigZag => IndicatorOutput::SwingPoints(
                ZigZag::new((&cfg.zigzag).into(), (&cfg.swing).into())?.calculate(series),
            ),
            IndicatorKind::SupportResistance => {
                IndicatorOutput::Zones(support_resistance_zones(shared_swings(swings)?))
            }
            IndicatorKind::TrendLines => IndicatorOutput::TrendLines(
                TrendLineDetector::new((&cfg.channel).into(), (&cfg.breakout).into())?
                    .analyze(series, shared_swings(swings)?),
            ),
            IndicatorKind::Fibonacci => IndicatorOutput::Fibonacci(fibonacci_levels(series)),
            IndicatorKind::Pivots => IndicatorOutput::Pivots(classic_pivots(series)),
            IndicatorKind::RangeStatistics => {
                IndicatorOutput::RangeStatistics(range_statistics(series)?)
            }
        };

        Ok(output)
    }
}

fn shared_swings(swings: Option<&IndicatorResult<Vec<SwingPoint>>>) -> IndicatorResult<&[SwingPoint]> {
    match swings {
        Some(Ok(points)) => Ok(points),
        Some(Err(e)) => Err(e.clone()),
        None => Err(IndicatorError::CalculationError(
            "스윙 포인트가 계산되지 않았습니다".to_string(),
        )),
    }
}

/// 설정으로 한 번의 분석 패스를 실행하는 편의 함수.
pub fn analyze(series: &CandleSeries, config: &AnalysisConfig) -> AnalysisReport {
    AnalysisEngine::new(config.clone()).analyze(series)
}
