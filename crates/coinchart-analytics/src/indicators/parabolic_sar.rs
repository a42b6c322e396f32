//! Parabolic SAR (Stop and Reverse).
//!
//! 가속 계수(AF)가 새 극값마다 증가하며 가격을 추격하는 추세 추종 지표입니다.
//!
//! ## 규칙
//! - 초기 방향: 처음 5개 캔들의 종가 변화 중 다수 방향 (동률이면 상승)
//! - 상승 추세에서 SAR은 직전 두 캔들의 저가를 넘지 않음 (하락은 고가 대칭)
//! - 가격이 SAR을 관통하면 전환: SAR = 직전 극값(EP), AF 초기화

use chrono::{DateTime, Utc};
use coinchart_core::{CandleSeries, LinePoint, ParabolicSarConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, IndicatorError, IndicatorResult};

/// 초기 방향 판단에 사용하는 캔들 수 (최소 필요 데이터).
pub const SAR_WARMUP: usize = 5;

/// Parabolic SAR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParabolicSarParams {
    /// 초기 AF (기본: 0.02).
    pub initial_af: Decimal,
    /// AF 증가폭 (기본: 0.02).
    pub af_step: Decimal,
    /// 최대 AF (기본: 0.2).
    pub max_af: Decimal,
}

impl Default for ParabolicSarParams {
    fn default() -> Self {
        Self {
            initial_af: dec!(0.02),
            af_step: dec!(0.02),
            max_af: dec!(0.2),
        }
    }
}

impl From<&ParabolicSarConfig> for ParabolicSarParams {
    fn from(config: &ParabolicSarConfig) -> Self {
        Self {
            initial_af: config.initial_af,
            af_step: config.af_step,
            max_af: config.max_af,
        }
    }
}

/// SAR 한 시점의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
    pub is_uptrend: bool,
    /// 현재 가속 계수
    pub acceleration: Decimal,
    /// 현재 추세의 극값 (상승: 최고가, 하락: 최저가)
    pub extreme_point: Decimal,
}

/// Parabolic SAR 계산기.
#[derive(Debug, Default)]
pub struct ParabolicSar;

impl ParabolicSar {
    /// 새로운 Parabolic SAR 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// Parabolic SAR 계산.
    ///
    /// # 반환
    /// 캔들마다 하나의 점. 캔들이 5개 미만이면 빈 벡터.
    pub fn calculate(
        &self,
        series: &CandleSeries,
        params: ParabolicSarParams,
    ) -> IndicatorResult<Vec<SarPoint>> {
        ensure_non_negative("초기 AF", params.initial_af)?;
        ensure_non_negative("AF 증가폭", params.af_step)?;
        if params.max_af < params.initial_af {
            return Err(IndicatorError::InvalidParameter(format!(
                "최대 AF({})는 초기 AF({})보다 작을 수 없습니다",
                params.max_af, params.initial_af
            )));
        }

        let candles = series.candles();
        if candles.len() < SAR_WARMUP {
            return Ok(Vec::new());
        }

        let (ups, downs) = candles[..SAR_WARMUP]
            .windows(2)
            .fold((0usize, 0usize), |(up, down), w| {
                if w[1].close > w[0].close {
                    (up + 1, down)
                } else if w[1].close < w[0].close {
                    (up, down + 1)
                } else {
                    (up, down)
                }
            });

        let mut is_uptrend = ups >= downs;
        let first = &candles[0];
        let mut sar = if is_uptrend { first.low } else { first.high };
        let mut ep = if is_uptrend { first.high } else { first.low };
        let mut af = params.initial_af;

        let mut result = Vec::with_capacity(candles.len());
        result.push(SarPoint {
            timestamp: first.timestamp,
            value: sar,
            is_uptrend,
            acceleration: af,
            extreme_point: ep,
        });

        for i in 1..candles.len() {
            let candle = &candles[i];
            let mut next = sar + af * (ep - sar);

            if is_uptrend {
                next = next.min(candles[i - 1].low);
                if i >= 2 {
                    next = next.min(candles[i - 2].low);
                }

                if candle.low < next {
                    is_uptrend = false;
                    next = ep;
                    ep = candle.low;
                    af = params.initial_af;
                } else if candle.high > ep {
                    ep = candle.high;
                    af = (af + params.af_step).min(params.max_af);
                }
            } else {
                next = next.max(candles[i - 1].high);
                if i >= 2 {
                    next = next.max(candles[i - 2].high);
                }

                if candle.high > next {
                    is_uptrend = true;
                    next = ep;
                    ep = candle.high;
                    af = params.initial_af;
                } else if candle.low < ep {
                    ep = candle.low;
                    af = (af + params.af_step).min(params.max_af);
                }
            }

            sar = next;
            result.push(SarPoint {
                timestamp: candle.timestamp,
                value: sar,
                is_uptrend,
                acceleration: af,
                extreme_point: ep,
            });
        }

        Ok(result)
    }

    /// SAR 값을 라인으로 변환합니다.
    pub fn line(points: &[SarPoint]) -> Vec<LinePoint> {
        points
            .iter()
            .map(|p| LinePoint::new(p.timestamp, p.value))
            .collect()
    }
}
