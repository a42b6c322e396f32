//! ZigZag 지표.
//!
//! 현재 방향의 극값을 추적하다가 가격이 그 극값에서 `deviation_pct` 이상 되돌리면
//! 극값을 피벗으로 확정하고 방향을 바꿉니다.
//!
//! - 방향이 정해지기 전에는 최고가/최저가를 모두 추적하고 첫 확정 움직임이 방향을 결정
//! - 같은 캔들에서 새 극값 갱신이 반전보다 우선
//! - 진행 중인 마지막 극값은 직전 확정 피벗과 다를 때만 추가
//! - 연속된 두 피벗은 항상 종류가 다름

use coinchart_core::{CandleSeries, Percentage, Price, SwingKind, SwingPoint, ZigZagConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::swing::{max_volume, SwingParams, SwingPointDetector};
use crate::indicators::{IndicatorError, IndicatorResult};

/// ZigZag 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZigZagParams {
    /// 반전 확정 되돌림 % (기본: 3.5).
    pub deviation_pct: Percentage,
}

impl Default for ZigZagParams {
    fn default() -> Self {
        Self {
            deviation_pct: dec!(3.5),
        }
    }
}

impl From<&ZigZagConfig> for ZigZagParams {
    fn from(config: &ZigZagConfig) -> Self {
        Self {
            deviation_pct: config.deviation_pct,
        }
    }
}

/// 추적 중인 극값.
#[derive(Debug, Clone, Copy)]
struct Extreme {
    index: usize,
    price: Price,
}

#[derive(Debug, Clone, Copy)]
enum State {
    /// 방향 미정: 최고가와 최저가를 모두 추적
    Undetermined { high: Extreme, low: Extreme },
    /// 상승 중: 최고가 추적
    Rising(Extreme),
    /// 하락 중: 최저가 추적
    Falling(Extreme),
}

/// ZigZag 계산기.
///
/// 피벗 강도는 공유 스윙 탐지기의 점수 규칙으로 매깁니다.
#[derive(Debug, Clone, Copy)]
pub struct ZigZag {
    params: ZigZagParams,
    scoring: SwingPointDetector,
}

impl ZigZag {
    /// 파라미터를 검증하여 계산기를 생성합니다.
    pub fn new(params: ZigZagParams, scoring: SwingParams) -> IndicatorResult<Self> {
        if params.deviation_pct <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(format!(
                "ZigZag 편차는 0보다 커야 합니다: {}",
                params.deviation_pct
            )));
        }
        Ok(Self {
            params,
            scoring: SwingPointDetector::new(scoring)?,
        })
    }

    /// 교대하는 피벗 목록을 계산합니다. 캔들이 2개 미만이면 빈 벡터.
    pub fn calculate(&self, series: &CandleSeries) -> Vec<SwingPoint> {
        let candles = series.candles();
        if candles.len() < 2 {
            return Vec::new();
        }

        let up_factor = Decimal::ONE + self.params.deviation_pct / Decimal::ONE_HUNDRED;
        let down_factor = Decimal::ONE - self.params.deviation_pct / Decimal::ONE_HUNDRED;
        let max_volume = max_volume(series);
        let mut pivots: Vec<SwingPoint> = Vec::new();

        let confirm = |extreme: Extreme, kind: SwingKind, pivots: &mut Vec<SwingPoint>| {
            pivots.push(
                self.scoring
                    .point_at(series, extreme.index, extreme.price, kind, max_volume),
            );
        };

        let first = Extreme {
            index: 0,
            price: candles[0].high,
        };
        let mut state = State::Undetermined {
            high: first,
            low: Extreme {
                index: 0,
                price: candles[0].low,
            },
        };

        for (i, candle) in candles.iter().enumerate().skip(1) {
            state = match state {
                State::Undetermined { mut high, mut low } => {
                    if candle.high > high.price {
                        high = Extreme { index: i, price: candle.high };
                    }
                    if candle.low < low.price {
                        low = Extreme { index: i, price: candle.low };
                    }

                    if high.index > low.index && high.price >= low.price * up_factor {
                        confirm(low, SwingKind::Low, &mut pivots);
                        State::Rising(high)
                    } else if low.index > high.index && low.price <= high.price * down_factor {
                        confirm(high, SwingKind::High, &mut pivots);
                        State::Falling(low)
                    } else {
                        State::Undetermined { high, low }
                    }
                }
                State::Rising(extreme) => {
                    if candle.high > extreme.price {
                        State::Rising(Extreme { index: i, price: candle.high })
                    } else if candle.low <= extreme.price * down_factor {
                        confirm(extreme, SwingKind::High, &mut pivots);
                        State::Falling(Extreme { index: i, price: candle.low })
                    } else {
                        State::Rising(extreme)
                    }
                }
                State::Falling(extreme) => {
                    if candle.low < extreme.price {
                        State::Falling(Extreme { index: i, price: candle.low })
                    } else if candle.high >= extreme.price * up_factor {
                        confirm(extreme, SwingKind::Low, &mut pivots);
                        State::Rising(Extreme { index: i, price: candle.high })
                    } else {
                        State::Falling(extreme)
                    }
                }
            };
        }

        let pending = match state {
            State::Undetermined { .. } => None,
            State::Rising(extreme) => Some((extreme, SwingKind::High)),
            State::Falling(extreme) => Some((extreme, SwingKind::Low)),
        };
        if let (Some((extreme, kind)), Some(last)) = (pending, pivots.last().copied()) {
            if extreme.index != last.index && extreme.price != last.price {
                confirm(extreme, kind, &mut pivots);
            }
        }

        tracing::debug!(
            candles = candles.len(),
            deviation_pct = %self.params.deviation_pct,
            pivots = pivots.len(),
            "ZigZag calculated"
        );

        pivots
    }
}

/// 기본 스윙 점수 규칙으로 ZigZag 피벗을 계산합니다.
pub fn zigzag(series: &CandleSeries, deviation_pct: Percentage) -> IndicatorResult<Vec<SwingPoint>> {
    let zigzag = ZigZag::new(ZigZagParams { deviation_pct }, SwingParams::default())?;
    Ok(zigzag.calculate(series))
}
