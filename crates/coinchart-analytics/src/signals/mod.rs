//! 지표 출력의 정성적 신호 분류.
//!
//! `IndicatorKind`별 규칙으로 마지막 종가와 지표 출력을 비교하여
//! 강세/약세/중립 신호와 근거, 권고, 핵심 수치를 만듭니다.
//!
//! # 규칙 구성
//!
//! - [`trend`] - 이동평균, SuperTrend, Parabolic SAR, 일목균형표, RSI
//! - [`bands`] - MA Envelope, 볼린저 밴드, 켈트너 채널
//! - [`levels`] - ZigZag, 지지/저항, 추세선, 피보나치, 피봇, 범위 통계
//!
//! 출력이 비어 있거나 종류와 출력 형태가 맞지 않으면 데이터 부족 중립 신호를 반환합니다.

pub mod bands;
pub mod levels;
pub mod trend;

use coinchart_core::{CandleSeries, ClassifierConfig, DecimalExt, Percentage, Signal, SignalKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::{IndicatorKind, IndicatorOutput};

/// 분류 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// 선과의 거리가 이 값(%)을 넘으면 확장 경고
    pub extension_threshold_pct: Percentage,
    /// 레벨 근접 거리 (%)
    pub level_proximity_pct: Percentage,
    /// 스퀴즈 밴드 폭 (%)
    pub squeeze_bandwidth_pct: Percentage,
    pub rsi_overbought: Decimal,
    pub rsi_oversold: Decimal,
    /// 최근 돌파로 보는 캔들 수
    pub breakout_lookback: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        (&ClassifierConfig::default()).into()
    }
}

impl From<&ClassifierConfig> for ClassifierParams {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            extension_threshold_pct: config.extension_threshold_pct,
            level_proximity_pct: config.level_proximity_pct,
            squeeze_bandwidth_pct: config.squeeze_bandwidth_pct,
            rsi_overbought: config.rsi_overbought,
            rsi_oversold: config.rsi_oversold,
            breakout_lookback: config.breakout_lookback,
        }
    }
}

/// 규칙 기반 신호 분류기.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier {
    params: ClassifierParams,
}

impl SignalClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    /// 지표 출력을 분류합니다.
    pub fn classify(&self, kind: IndicatorKind, output: &IndicatorOutput, series: &CandleSeries) -> Signal {
        let Some(close) = series.last().map(|c| c.close) else {
            return Signal::insufficient_data();
        };
        if output.is_empty() {
            return Signal::insufficient_data();
        }

        let p = &self.params;
        let signal = match kind {
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Wma | IndicatorKind::HullMa => output
                .as_moving_averages()
                .and_then(|set| trend::moving_average_set(kind.display_name(), set, close, p)),
            IndicatorKind::Rsi => output.as_line().and_then(|points| trend::rsi(points, p)),
            IndicatorKind::SuperTrend => output
                .as_supertrend()
                .and_then(|points| trend::supertrend(points, close, p)),
            IndicatorKind::ParabolicSar => output
                .as_parabolic_sar()
                .and_then(|points| trend::parabolic_sar(points, close, p)),
            IndicatorKind::Ichimoku => output
                .as_ichimoku()
                .and_then(|points| trend::ichimoku(points, series.len(), close)),
            IndicatorKind::Envelope | IndicatorKind::Bollinger => output
                .as_bands()
                .and_then(|bands| bands::mean_reversion(kind.display_name(), bands, close, p)),
            IndicatorKind::Keltner => output
                .as_bands()
                .and_then(|bands| bands::keltner(bands, close, p)),
            IndicatorKind::ZigZag => output
                .as_swing_points()
                .and_then(|points| levels::zigzag(points, close)),
            IndicatorKind::SupportResistance => output
                .as_zones()
                .and_then(|zones| levels::support_resistance(zones, close, p)),
            IndicatorKind::TrendLines => output
                .as_trend_lines()
                .and_then(|analysis| levels::trend_lines(analysis, series, p)),
            IndicatorKind::Fibonacci => output.as_fibonacci().and_then(|fib| levels::fibonacci(fib, close)),
            IndicatorKind::Pivots => output.as_pivots().map(|pivots| levels::pivots(pivots, close)),
            IndicatorKind::RangeStatistics => output
                .as_range_statistics()
                .map(|stats| levels::range_position(stats, close)),
        };

        signal.unwrap_or_else(Signal::insufficient_data)
    }
}

/// 근거 목록으로 신호를 조립합니다.
pub(crate) fn compose(kind: SignalKind, reasons: Vec<String>, recommendation: &str) -> Signal {
    let mut reasons = reasons.into_iter();
    let first = reasons
        .next()
        .unwrap_or_else(|| "No qualifying condition was met".to_string());
    reasons.fold(Signal::new(kind, first, recommendation), |signal, reason| {
        signal.with_reason(reason)
    })
}

/// 표시용 가격 문자열.
pub(crate) fn fmt_price(value: Decimal) -> String {
    value.round_display(4).to_string()
}

/// 표시용 퍼센트 문자열.
pub(crate) fn fmt_pct(value: Percentage) -> String {
    format!("{}%", value.round_display(2))
}
