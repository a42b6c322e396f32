//! 기술적 지표 모듈.
//!
//! 검증된 캔들 시리즈에서 차트 오버레이를 계산합니다.
//!
//! # 지원 지표
//!
//! ## 이동평균 (Moving Averages)
//! - **SMA / EMA / WMA**: 단순/지수/가중 이동평균
//! - **Hull MA**: 지연을 줄인 가중 이동평균 조합
//! - **MA Envelope**: SMA 기준 고정 비율 밴드
//!
//! ## 변동성 (Volatility)
//! - **Bollinger Bands**: SMA ± k·σ (모집단 표준편차)
//! - **ATR**: Wilder 평활 평균 실제 범위
//! - **Keltner Channel**: EMA ± k·ATR
//!
//! ## 추세 추종 (Trend Following)
//! - **SuperTrend**, **Parabolic SAR**, **Ichimoku**
//!
//! ## 모멘텀 (Momentum)
//! - **RSI**: Wilder 상대강도지수
//!
//! 모든 계산기는 데이터가 부족하면 빈 결과를 반환하고,
//! 잘못된 파라미터(기간 0, 음수 배수)에 대해서만 에러를 반환합니다.

pub mod ichimoku;
pub mod momentum;
pub mod moving_average;
pub mod parabolic_sar;
pub mod supertrend;
pub mod volatility;

mod math;

use thiserror::Error;

pub use ichimoku::{IchimokuIndicator, IchimokuParams, IchimokuPoint};
pub use momentum::{MomentumCalculator, RsiParams, RSI_MAX};
pub use moving_average::{
    moving_average, EnvelopeParams, MovingAverageKind, MovingAverageSet, MovingAverages,
};
pub use parabolic_sar::{ParabolicSar, ParabolicSarParams, SarPoint};
pub use supertrend::{SuperTrendIndicator, SuperTrendParams, SuperTrendPoint};
pub use volatility::{AtrParams, BollingerParams, KeltnerParams, VolatilityIndicators};

pub(crate) use math::{
    checked_add, checked_mul, checked_sub, ema_multiplier, ema_values, mean, population_std_dev,
    sma_values, wilder_atr, wma_values,
};

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 기간이 0이면 `InvalidParameter`를 반환합니다.
pub(crate) fn ensure_period(name: &str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{}은(는) 0보다 커야 합니다",
            name
        )));
    }
    Ok(())
}

/// 배수/비율이 음수이면 `InvalidParameter`를 반환합니다.
pub(crate) fn ensure_non_negative(name: &str, value: rust_decimal::Decimal) -> IndicatorResult<()> {
    if value < rust_decimal::Decimal::ZERO {
        return Err(IndicatorError::InvalidParameter(format!(
            "{}은(는) 음수일 수 없습니다: {}",
            name, value
        )));
    }
    Ok(())
}
