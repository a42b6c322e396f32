//! 스윙 포인트 탐지기.
//!
//! ZigZag, 지지/저항 존, 추세선, 채널이 공유하는 단일 구현입니다.
//!
//! ## 규칙
//! - 캔들 `i`의 고가보다 엄격하게 높은 고가가 `±sensitivity` 범위에 없으면 스윙 고점
//!   (동률은 허용, 저점은 대칭)
//! - 시리즈 시작은 하드 경계: 앞쪽 캔들은 존재하는 만큼만 비교
//! - 마지막 `sensitivity`개 캔들은 확인 구간이 없어 후보가 아님
//! - `n < 2 × sensitivity + 1`이면 빈 결과
//!
//! ## 강도
//! `min(1, 0.7 × 거래량/최대거래량 + 0.3 × 터치 횟수)`

use coinchart_core::{
    CandleSeries, DecimalExt, Percentage, Price, SwingConfig, SwingKind, SwingPoint,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::indicators::{ensure_non_negative, ensure_period, IndicatorResult};

const VOLUME_WEIGHT: Decimal = dec!(0.7);
const TOUCH_WEIGHT: Decimal = dec!(0.3);

/// 스윙 포인트 탐지 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwingParams {
    /// 좌우 비교 캔들 수 (기본: 10).
    pub sensitivity: usize,
    /// 터치 인정 근접도 % (기본: 0.3).
    pub touch_threshold_pct: Percentage,
}

impl Default for SwingParams {
    fn default() -> Self {
        Self {
            sensitivity: 10,
            touch_threshold_pct: dec!(0.3),
        }
    }
}

impl From<&SwingConfig> for SwingParams {
    fn from(config: &SwingConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            touch_threshold_pct: config.touch_threshold_pct,
        }
    }
}

/// 스윙 포인트 탐지기.
#[derive(Debug, Clone, Copy)]
pub struct SwingPointDetector {
    params: SwingParams,
}

impl SwingPointDetector {
    /// 파라미터를 검증하여 탐지기를 생성합니다.
    pub fn new(params: SwingParams) -> IndicatorResult<Self> {
        ensure_period("스윙 민감도", params.sensitivity)?;
        ensure_non_negative("터치 근접도", params.touch_threshold_pct)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> SwingParams {
        self.params
    }

    /// 스윙 고점/저점을 시간순으로 탐지합니다.
    ///
    /// 같은 캔들이 고점이자 저점일 수 있으며, 이 경우 고점이 먼저 나옵니다.
    pub fn detect(&self, series: &CandleSeries) -> Vec<SwingPoint> {
        let s = self.params.sensitivity;
        let candles = series.candles();
        let n = candles.len();
        if n < 2 * s + 1 {
            return Vec::new();
        }

        let max_volume = max_volume(series);
        let mut points = Vec::new();

        for i in 0..n - s {
            let window = &candles[i.saturating_sub(s)..=i + s];
            let candle = &candles[i];

            if window.iter().all(|c| c.high <= candle.high) {
                points.push(self.point_at(series, i, candle.high, SwingKind::High, max_volume));
            }
            if window.iter().all(|c| c.low >= candle.low) {
                points.push(self.point_at(series, i, candle.low, SwingKind::Low, max_volume));
            }
        }

        tracing::debug!(
            candles = n,
            sensitivity = s,
            swings = points.len(),
            "Swing points detected"
        );

        points
    }

    /// 주어진 캔들/가격으로 스윙 포인트를 만들고 강도를 매깁니다.
    pub fn point_at(
        &self,
        series: &CandleSeries,
        index: usize,
        price: Price,
        kind: SwingKind,
        max_volume: Decimal,
    ) -> SwingPoint {
        let timestamp = series
            .get(index)
            .map(|c| c.timestamp)
            .unwrap_or_default();
        SwingPoint {
            index,
            timestamp,
            price,
            kind,
            strength: self.strength_at(series, index, price, max_volume),
        }
    }

    /// 스윙 강도: `min(1, 0.7 × volume[i]/max_volume + 0.3 × touch_count)`.
    ///
    /// 최대 거래량이 0이면 거래량 항은 0입니다.
    pub fn strength_at(
        &self,
        series: &CandleSeries,
        index: usize,
        price: Price,
        max_volume: Decimal,
    ) -> Decimal {
        let volume = series.get(index).map(|c| c.volume).unwrap_or_default();
        let volume_term = volume.safe_div(max_volume).unwrap_or(Decimal::ZERO) * VOLUME_WEIGHT;
        let touch_term = Decimal::from(self.touch_count(series, index, price)) * TOUCH_WEIGHT;
        (volume_term + touch_term).min(Decimal::ONE)
    }

    /// 이후 캔들이 스윙 가격 근처를 다시 찾은 횟수.
    ///
    /// 고가 또는 저가가 가격의 `touch_threshold_pct` 이내이면 터치이며,
    /// 직전에 센 터치(처음에는 스윙 자신)와 `sensitivity`개 이상 떨어져야 합니다.
    pub fn touch_count(&self, series: &CandleSeries, index: usize, price: Price) -> usize {
        if price.is_zero() {
            return 0;
        }
        let threshold = self.params.touch_threshold_pct;
        let near = |p: Price| {
            (p - price)
                .abs()
                .safe_div(price.abs())
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                .is_some_and(|pct| pct <= threshold)
        };

        let mut count = 0;
        let mut last = index;
        for (j, candle) in series.iter().enumerate().skip(index + 1) {
            if j - last < self.params.sensitivity {
                continue;
            }
            if near(candle.high) || near(candle.low) {
                count += 1;
                last = j;
            }
        }
        count
    }
}

/// 기본 터치 근접도로 스윙 포인트를 탐지합니다.
pub fn find_swing_points(series: &CandleSeries, sensitivity: usize) -> IndicatorResult<Vec<SwingPoint>> {
    let params = SwingParams {
        sensitivity,
        ..SwingParams::default()
    };
    Ok(SwingPointDetector::new(params)?.detect(series))
}

/// 시리즈의 최대 거래량.
pub fn max_volume(series: &CandleSeries) -> Decimal {
    series
        .iter()
        .map(|c| c.volume)
        .max()
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{rising_series, series_from_ohlcv};

    fn detector(sensitivity: usize) -> SwingPointDetector {
        SwingPointDetector::new(SwingParams {
            sensitivity,
            touch_threshold_pct: dec!(0.3),
        })
        .unwrap()
    }

    #[test]
    fn test_rising_series_single_low_at_start() {
        let series = rising_series(30);
        let swings = detector(10).detect(&series);

        assert_eq!(swings.len(), 1);
        assert_eq!(swings[0].kind, SwingKind::Low);
        assert_eq!(swings[0].index, 0);
    }

    #[test]
    fn test_requires_two_sided_window() {
        let series = rising_series(20);
        assert!(detector(10).detect(&series).is_empty());
    }

    #[test]
    fn test_peak_detection_with_ties() {
        // 고가 10, 12, 15, 15, 11, 9, 8
        let rows = [
            (dec!(10), dec!(10), dec!(9), dec!(10), dec!(100)),
            (dec!(12), dec!(12), dec!(10), dec!(11), dec!(100)),
            (dec!(14), dec!(15), dec!(12), dec!(14), dec!(300)),
            (dec!(14), dec!(15), dec!(13), dec!(14), dec!(100)),
            (dec!(11), dec!(11), dec!(10), dec!(10), dec!(100)),
            (dec!(9), dec!(9), dec!(8), dec!(8), dec!(100)),
            (dec!(8), dec!(8), dec!(7), dec!(7), dec!(100)),
        ];
        let series = series_from_ohlcv(&rows);
        let highs: Vec<usize> = detector(2)
            .detect(&series)
            .into_iter()
            .filter(|p| p.is_high())
            .map(|p| p.index)
            .collect();

        // 동률은 실격 사유가 아님: 두 캔들 모두 고점
        assert_eq!(highs, vec![2, 3]);
    }

    #[test]
    fn test_strength_volume_component() {
        let rows = [
            (dec!(10), dec!(10), dec!(9), dec!(10), dec!(100)),
            (dec!(12), dec!(12), dec!(10), dec!(11), dec!(100)),
            (dec!(14), dec!(20), dec!(12), dec!(14), dec!(400)),
            (dec!(14), dec!(15), dec!(13), dec!(14), dec!(200)),
            (dec!(11), dec!(11), dec!(10), dec!(10), dec!(100)),
        ];
        let series = series_from_ohlcv(&rows);
        let swings = detector(2).detect(&series);
        let peak = swings.iter().find(|p| p.is_high()).unwrap();

        assert_eq!(peak.index, 2);
        assert_eq!(peak.strength, dec!(0.7));
    }

    #[test]
    fn test_touch_count_respects_spacing() {
        // 인덱스 0의 저점 100을 1, 2, 3, 4에서 다시 터치
        let rows: Vec<_> = (0..6)
            .map(|_| (dec!(100.1), dec!(101), dec!(100), dec!(100.5), dec!(10)))
            .collect();
        let series = series_from_ohlcv(&rows);

        assert_eq!(detector(1).touch_count(&series, 0, dec!(100)), 5);
        assert_eq!(detector(2).touch_count(&series, 0, dec!(100)), 2);
    }

    #[test]
    fn test_zero_volume_strength() {
        let rows: Vec<_> = (0..6)
            .map(|i| {
                let base = dec!(100) + Decimal::from(i);
                (base, base + dec!(1), base - dec!(1), base, Decimal::ZERO)
            })
            .collect();
        let series = series_from_ohlcv(&rows);
        let swings = detector(2).detect(&series);
        assert!(swings.iter().all(|p| p.strength == Decimal::ZERO));
    }

    #[test]
    fn test_zero_sensitivity_is_invalid() {
        assert!(SwingPointDetector::new(SwingParams {
            sensitivity: 0,
            touch_threshold_pct: dec!(0.3),
        })
        .is_err());
    }
}
