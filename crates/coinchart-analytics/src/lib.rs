//! 차트 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (이동평균, 밴드, 추세 추종, 모멘텀)
//! - 가격 레벨 탐지 (스윙 포인트, 지그재그, 지지/저항, 추세선, 피보나치, 피벗, 범위 통계)
//! - 지표별 정성적 신호 분류
//! - 한 번의 패스로 전체 지표를 계산하는 분석 엔진
//! - 실시간 갱신용 증분 지표
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 계산기와 파라미터
//! - [`levels`]: 레벨 탐지기
//! - [`signals`]: 신호 분류기
//! - [`engine`]: `AnalysisEngine`, `AnalysisReport`

pub mod engine;
pub mod indicators;
pub mod levels;
pub mod signals;
pub mod streaming;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{analyze, AnalysisEngine, AnalysisReport, IndicatorKind, IndicatorOutput};
pub use indicators::{
    moving_average, AtrParams, BollingerParams, EnvelopeParams, IchimokuIndicator,
    IchimokuParams, IchimokuPoint, IndicatorError, IndicatorResult, KeltnerParams,
    MomentumCalculator, MovingAverageKind, MovingAverageSet, MovingAverages, ParabolicSar, ParabolicSarParams,
    RsiParams, SarPoint, SuperTrendIndicator, SuperTrendParams, SuperTrendPoint,
    VolatilityIndicators,
};
pub use levels::{
    classic_pivots, fibonacci_levels, find_swing_points, range_statistics,
    support_resistance_zones, zigzag, Breakout, BreakoutDirection, BreakoutParams, Channel,
    ChannelParams, FibonacciLevel, FibonacciLevels, PivotSet, RangeStatistics, SwingParams,
    SwingPointDetector, TrendLineAnalysis, TrendLineDetector, ZigZag, ZigZagParams,
};
pub use signals::{ClassifierParams, SignalClassifier};
pub use streaming::{StreamingAtr, StreamingEma, StreamingIndicator};
