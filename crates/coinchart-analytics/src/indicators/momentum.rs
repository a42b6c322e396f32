//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index), Wilder 평활

use coinchart_core::{CandleSeries, LinePoint, RsiConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{checked_add, checked_mul, checked_sub, ensure_period, IndicatorResult};

/// RSI 포화값 (평균 하락폭이 0일 때).
pub const RSI_MAX: Decimal = dec!(100);

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl From<&RsiConfig> for RsiParams {
    fn from(config: &RsiConfig) -> Self {
        Self {
            period: config.period,
        }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 첫 평균은 처음 `period`개 변화량의 단순 평균이며, 이후 Wilder 평활
    /// `avg = (prev × (period - 1) + 현재) / period`을 적용합니다.
    /// 평균 하락폭이 0이면 100으로 포화됩니다.
    ///
    /// # 반환
    /// 인덱스 `period`부터의 RSI 값. 캔들이 `period + 1`개 미만이면 빈 벡터.
    pub fn rsi(&self, series: &CandleSeries, params: RsiParams) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("RSI 기간", params.period)?;

        let period = params.period;
        let closes = series.closes();
        if closes.len() < period + 1 {
            return Ok(Vec::new());
        }

        let changes = closes
            .windows(2)
            .map(|w| checked_sub(w[1], w[0], "RSI"))
            .collect::<IndicatorResult<Vec<Decimal>>>()?;
        let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = changes
            .into_iter()
            .map(|change| {
                if change > Decimal::ZERO {
                    (change, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -change)
                }
            })
            .unzip();

        let p = Decimal::from(period);
        let seed = |values: &[Decimal]| -> IndicatorResult<Decimal> {
            let sum = values
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, *v, "RSI"))?;
            Ok(sum / p)
        };
        let smooth = |avg: Decimal, value: Decimal| -> IndicatorResult<Decimal> {
            let weighted = checked_mul(avg, p - Decimal::ONE, "RSI")?;
            Ok(checked_add(weighted, value, "RSI")? / p)
        };
        let mut avg_gain = seed(&gains[..period])?;
        let mut avg_loss = seed(&losses[..period])?;

        let mut result = Vec::with_capacity(closes.len() - period);
        result.push(LinePoint::new(
            series.candles()[period].timestamp,
            rsi_value(avg_gain, avg_loss),
        ));

        // gains[i]는 캔들 i+1의 변화량
        for i in period..gains.len() {
            avg_gain = smooth(avg_gain, gains[i])?;
            avg_loss = smooth(avg_loss, losses[i])?;
            result.push(LinePoint::new(
                series.candles()[i + 1].timestamp,
                rsi_value(avg_gain, avg_loss),
            ));
        }

        Ok(result)
    }
}

/// RS가 Decimal 범위를 넘을 만큼 크면 포화값으로 취급합니다.
fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return RSI_MAX;
    }
    match avg_gain
        .checked_div(avg_loss)
        .and_then(|rs| rs.checked_add(Decimal::ONE))
    {
        Some(denominator) => RSI_MAX - RSI_MAX / denominator,
        None => RSI_MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_series, rising_series, series_from_closes};

    #[test]
    fn test_rsi_saturates_in_rising_market() {
        let series = rising_series(20);
        let rsi = MomentumCalculator::new().rsi(&series, RsiParams::default()).unwrap();

        assert_eq!(rsi.len(), 6);
        assert!(rsi.iter().all(|p| p.value == dec!(100)));
        assert_eq!(rsi[0].timestamp, series.get(14).unwrap().timestamp);
    }

    #[test]
    fn test_rsi_flat_market_saturates() {
        let series = constant_series(20, dec!(10));
        let rsi = MomentumCalculator::new().rsi(&series, RsiParams::default()).unwrap();
        assert!(rsi.iter().all(|p| p.value == dec!(100)));
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // +1, -1 반복 -> 평균 상승 = 평균 하락 -> RSI 50
        let closes = [dec!(10), dec!(11), dec!(10), dec!(11), dec!(10)];
        let series = series_from_closes(&closes);
        let rsi = MomentumCalculator::new().rsi(&series, RsiParams { period: 4 }).unwrap();

        assert_eq!(rsi.len(), 1);
        assert_eq!(rsi[0].value, dec!(50));
    }

    #[test]
    fn test_rsi_bounds() {
        let closes: Vec<Decimal> = [10, 12, 11, 15, 9, 8, 13, 14, 10, 11, 12, 7, 9, 16, 15, 14]
            .iter()
            .map(|v| Decimal::from(*v))
            .collect();
        let series = series_from_closes(&closes);
        let rsi = MomentumCalculator::new().rsi(&series, RsiParams { period: 5 }).unwrap();

        assert_eq!(rsi.len(), 11);
        for p in rsi {
            assert!(p.value >= Decimal::ZERO && p.value <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_tiny_loss_saturates_instead_of_overflowing() {
        assert_eq!(rsi_value(Decimal::MAX, Decimal::new(1, 28)), RSI_MAX);
        assert_eq!(rsi_value(dec!(1), dec!(1)), dec!(50));
    }

    #[test]
    fn test_rsi_overflowing_change_is_calculation_error() {
        let closes = [Decimal::MIN, Decimal::MAX, Decimal::MAX];
        let series = series_from_closes(&closes);
        let err = MomentumCalculator::new().rsi(&series, RsiParams { period: 1 }).unwrap_err();

        assert!(matches!(err, crate::indicators::IndicatorError::CalculationError(_)));
    }

    #[test]
    fn test_insufficient_data() {
        let series = rising_series(14);
        assert!(MomentumCalculator::new().rsi(&series, RsiParams::default()).unwrap().is_empty());
    }
}
