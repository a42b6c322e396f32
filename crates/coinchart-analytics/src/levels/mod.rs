//! 가격 레벨 탐지 모듈.
//!
//! 스윙 포인트 탐지기를 중심으로 한 구조적 레벨과 정적 레벨 계산을 제공합니다.
//!
//! - **swing**: 스윙 고점/저점 탐지 및 강도 점수 (공유 컴포넌트)
//! - **zigzag**: 편차 기반 지그재그 피벗
//! - **support_resistance**: 스윙 포인트 기반 지지/저항 존
//! - **trendlines**: 추세선, 평행 채널, 거래량 돌파
//! - **fibonacci**: 피보나치 되돌림/확장
//! - **pivot**: 클래식 피벗 포인트
//! - **range_stats**: 가격 범위 통계 및 활성 가격대

pub mod fibonacci;
pub mod pivot;
pub mod range_stats;
pub mod support_resistance;
pub mod swing;
pub mod trendlines;
pub mod zigzag;

pub use fibonacci::{fibonacci_levels, FibonacciLevel, FibonacciLevels};
pub use pivot::{classic_pivots, PivotSet};
pub use range_stats::{range_statistics, ActiveRange, Percentiles, RangeStatistics};
pub use support_resistance::support_resistance_zones;
pub use swing::{find_swing_points, SwingParams, SwingPointDetector};
pub use trendlines::{
    Breakout, BreakoutDirection, BreakoutParams, Channel, ChannelParams, TrendLineAnalysis,
    TrendLineDetector,
};
pub use zigzag::{zigzag, ZigZag, ZigZagParams};
