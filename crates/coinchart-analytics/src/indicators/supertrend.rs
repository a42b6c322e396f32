//! SuperTrend 지표.
//!
//! SuperTrend는 ATR 기반 추세 추종 지표입니다.
//!
//! ## 계산 방식
//! 1. 기본 밴드 = (고가 + 저가) / 2 ± (배수 × ATR)
//! 2. 최종 상단 밴드는 내려가기만 하고 최종 하단 밴드는 올라가기만 함 (추세 전환 시 제외)
//! 3. 종가가 직전 활성 값을 돌파하면 추세 전환
//!
//! ## 활성 값
//! - 상승 추세: 하단 밴드
//! - 하락 추세: 상단 밴드

use chrono::{DateTime, Utc};
use coinchart_core::{CandleSeries, LinePoint, SuperTrendConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, ensure_period, wilder_atr, IndicatorResult};

/// SuperTrend 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuperTrendParams {
    /// ATR 기간 (기본: 10).
    pub atr_period: usize,
    /// ATR 배수 (기본: 3.0).
    pub multiplier: Decimal,
}

impl Default for SuperTrendParams {
    fn default() -> Self {
        Self {
            atr_period: 10,
            multiplier: dec!(3.0),
        }
    }
}

impl From<&SuperTrendConfig> for SuperTrendParams {
    fn from(config: &SuperTrendConfig) -> Self {
        Self {
            atr_period: config.atr_period,
            multiplier: config.multiplier,
        }
    }
}

/// SuperTrend 한 시점의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperTrendPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// 활성 값 (상승 추세: 하단 밴드, 하락 추세: 상단 밴드).
    pub value: Decimal,
    /// 추세 방향 (true: 상승, false: 하락).
    pub is_uptrend: bool,
    /// 현재 추세가 유지된 캔들 수 (1부터 시작).
    pub trend_periods: usize,
    /// 이 캔들에서 추세가 전환되었는지 여부.
    pub flipped: bool,
    /// 최종 상단 밴드.
    pub upper_band: Decimal,
    /// 최종 하단 밴드.
    pub lower_band: Decimal,
}

impl SuperTrendPoint {
    pub fn line_point(&self) -> LinePoint {
        LinePoint::new(self.timestamp, self.value)
    }
}

/// SuperTrend 계산기.
#[derive(Debug, Default)]
pub struct SuperTrendIndicator;

impl SuperTrendIndicator {
    /// 새로운 SuperTrend 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// SuperTrend 계산.
    ///
    /// 첫 ATR이 준비되는 캔들(`atr_period - 1`)부터 출력하며, 그 시점의 초기 추세는
    /// `종가 > (고가 + 저가) / 2`이면 상승입니다. 캔들당 최대 한 번만 전환됩니다.
    ///
    /// # 반환
    /// 인덱스 `atr_period - 1`부터의 결과. 데이터가 부족하면 빈 벡터.
    pub fn calculate(
        &self,
        series: &CandleSeries,
        params: SuperTrendParams,
    ) -> IndicatorResult<Vec<SuperTrendPoint>> {
        ensure_period("ATR 기간", params.atr_period)?;
        ensure_non_negative("ATR 배수", params.multiplier)?;

        let atr = wilder_atr(series.candles(), params.atr_period)?;
        let mut result: Vec<SuperTrendPoint> = Vec::with_capacity(series.len());

        for (candle, atr) in series.iter().zip(atr) {
            let Some(atr) = atr else { continue };

            let hl2 = candle.median_price();
            let basic_upper = hl2 + params.multiplier * atr;
            let basic_lower = hl2 - params.multiplier * atr;

            let point = match result.last() {
                None => SuperTrendPoint {
                    timestamp: candle.timestamp,
                    value: Decimal::ZERO,
                    is_uptrend: candle.close > hl2,
                    trend_periods: 1,
                    flipped: false,
                    upper_band: basic_upper,
                    lower_band: basic_lower,
                },
                Some(prev) => {
                    let flips = if prev.is_uptrend {
                        candle.close < prev.value
                    } else {
                        candle.close > prev.value
                    };

                    if flips {
                        // 새로 활성화되는 밴드는 기본값으로 리셋
                        SuperTrendPoint {
                            timestamp: candle.timestamp,
                            value: Decimal::ZERO,
                            is_uptrend: !prev.is_uptrend,
                            trend_periods: 1,
                            flipped: true,
                            upper_band: basic_upper,
                            lower_band: basic_lower,
                        }
                    } else {
                        SuperTrendPoint {
                            timestamp: candle.timestamp,
                            value: Decimal::ZERO,
                            is_uptrend: prev.is_uptrend,
                            trend_periods: prev.trend_periods + 1,
                            flipped: false,
                            upper_band: basic_upper.min(prev.upper_band),
                            lower_band: basic_lower.max(prev.lower_band),
                        }
                    }
                }
            };

            let value = if point.is_uptrend {
                point.lower_band
            } else {
                point.upper_band
            };
            result.push(SuperTrendPoint { value, ..point });
        }

        Ok(result)
    }
}
