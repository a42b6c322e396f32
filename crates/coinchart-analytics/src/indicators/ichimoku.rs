//! 일목균형표 (Ichimoku Kinko Hyo).
//!
//! - 전환선 (Tenkan-sen): 9기간 (최고가 + 최저가) / 2
//! - 기준선 (Kijun-sen): 26기간 (최고가 + 최저가) / 2
//! - 선행스팬 A (Senkou Span A): (전환선 + 기준선) / 2, 26기간 앞으로 이동
//! - 선행스팬 B (Senkou Span B): 52기간 (최고가 + 최저가) / 2, 26기간 앞으로 이동
//! - 후행스팬 (Chikou Span): 종가, 26기간 뒤로 이동
//!
//! 출력 길이는 `n + displacement`이며, 마지막 `displacement`개 시점은
//! 캔들 간격으로 외삽한 미래 타임스탬프입니다.

use chrono::{DateTime, Utc};
use coinchart_core::{Candle, CandleSeries, IchimokuConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorError, IndicatorResult};

/// 일목균형표 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IchimokuParams {
    pub tenkan_period: usize,
    pub kijun_period: usize,
    pub senkou_b_period: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            displacement: 26,
        }
    }
}

impl From<&IchimokuConfig> for IchimokuParams {
    fn from(config: &IchimokuConfig) -> Self {
        Self {
            tenkan_period: config.tenkan_period,
            kijun_period: config.kijun_period,
            senkou_b_period: config.senkou_b_period,
            displacement: config.displacement,
        }
    }
}

/// 일목균형표 한 시점의 값. 정의되지 않은 선은 `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IchimokuPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub tenkan: Option<Decimal>,
    pub kijun: Option<Decimal>,
    pub senkou_a: Option<Decimal>,
    pub senkou_b: Option<Decimal>,
    pub chikou: Option<Decimal>,
}

impl IchimokuPoint {
    /// 구름 상단 (두 선행스팬 중 큰 값).
    pub fn cloud_top(&self) -> Option<Decimal> {
        Some(self.senkou_a?.max(self.senkou_b?))
    }

    /// 구름 하단 (두 선행스팬 중 작은 값).
    pub fn cloud_bottom(&self) -> Option<Decimal> {
        Some(self.senkou_a?.min(self.senkou_b?))
    }

    /// 양운(선행스팬 A >= B)인지 여부.
    pub fn is_bullish_cloud(&self) -> Option<bool> {
        Some(self.senkou_a? >= self.senkou_b?)
    }
}

/// 일목균형표 계산기.
#[derive(Debug, Default)]
pub struct IchimokuIndicator;

impl IchimokuIndicator {
    /// 새로운 일목균형표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 일목균형표 계산.
    ///
    /// # 반환
    /// 길이 `n + displacement`의 시점 목록. `n < senkou_b_period`이면 빈 벡터.
    pub fn calculate(
        &self,
        series: &CandleSeries,
        params: IchimokuParams,
    ) -> IndicatorResult<Vec<IchimokuPoint>> {
        ensure_period("전환선 기간", params.tenkan_period)?;
        ensure_period("기준선 기간", params.kijun_period)?;
        ensure_period("선행스팬 B 기간", params.senkou_b_period)?;
        ensure_period("이동 기간", params.displacement)?;

        let candles = series.candles();
        let n = candles.len();
        if n < params.senkou_b_period {
            return Ok(Vec::new());
        }

        let tenkan = midpoints(candles, params.tenkan_period);
        let kijun = midpoints(candles, params.kijun_period);
        let span_b = midpoints(candles, params.senkou_b_period);
        let d = params.displacement;

        let mut result = Vec::with_capacity(n + d);
        for t in 0..n + d {
            let timestamp = if t < n {
                candles[t].timestamp
            } else {
                series.project_timestamp(t - n + 1).ok_or_else(|| {
                    IndicatorError::CalculationError("미래 타임스탬프를 계산할 수 없습니다".to_string())
                })?
            };

            let source = t.checked_sub(d);
            let senkou_a = source.and_then(|s| Some((tenkan[s]? + kijun[s]?) / Decimal::TWO));
            let senkou_b = source.and_then(|s| span_b[s]);

            result.push(IchimokuPoint {
                timestamp,
                tenkan: tenkan.get(t).copied().flatten(),
                kijun: kijun.get(t).copied().flatten(),
                senkou_a,
                senkou_b,
                chikou: candles.get(t + d).map(|c| c.close),
            });
        }

        Ok(result)
    }
}

/// 각 인덱스에서 `period`기간 (최고가 + 최저가) / 2. 준비 전 구간은 `None`.
fn midpoints(candles: &[Candle], period: usize) -> Vec<Option<Decimal>> {
    (0..candles.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &candles[i + 1 - period..=i];
            let high = window.iter().map(|c| c.high).max()?;
            let low = window.iter().map(|c| c.low).min()?;
            Some((high + low) / Decimal::TWO)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_series, rising_series};
    use rust_decimal_macros::dec;

    #[test]
    fn test_ichimoku_length_and_projection() {
        let series = rising_series(60);
        let points = IchimokuIndicator::new()
            .calculate(&series, IchimokuParams::default())
            .unwrap();

        assert_eq!(points.len(), 86);
        let interval = series.interval().unwrap();
        assert_eq!(points[60].timestamp, series.last().unwrap().timestamp + interval);
        assert_eq!(points[85].timestamp, series.last().unwrap().timestamp + interval * 26);
    }

    #[test]
    fn test_ichimoku_shifts() {
        let series = rising_series(60);
        let points = IchimokuIndicator::new()
            .calculate(&series, IchimokuParams::default())
            .unwrap();

        // 전환선은 인덱스 8부터
        assert!(points[7].tenkan.is_none());
        assert!(points[8].tenkan.is_some());
        // 선행스팬 A는 기준선이 준비된 25 + 26 = 51부터
        assert!(points[50].senkou_a.is_none());
        assert_eq!(
            points[51].senkou_a,
            Some((points[25].tenkan.unwrap() + points[25].kijun.unwrap()) / dec!(2))
        );
        // 선행스팬 B는 51 + 26 = 77부터
        assert!(points[76].senkou_b.is_none());
        assert!(points[77].senkou_b.is_some());
        // 후행스팬은 26 뒤의 종가
        assert_eq!(points[0].chikou, Some(series.get(26).unwrap().close));
        assert!(points[34].chikou.is_none());
        // 미래 구간에는 전환선/기준선 없음
        assert!(points[70].tenkan.is_none());
    }

    #[test]
    fn test_constant_series_flat_cloud() {
        let series = constant_series(60, dec!(10));
        let points = IchimokuIndicator::new()
            .calculate(&series, IchimokuParams::default())
            .unwrap();
        let last = points.last().unwrap();
        assert_eq!(last.cloud_top(), Some(dec!(10)));
        assert_eq!(last.is_bullish_cloud(), Some(true));
    }

    #[test]
    fn test_requires_senkou_b_period() {
        let series = rising_series(51);
        let points = IchimokuIndicator::new()
            .calculate(&series, IchimokuParams::default())
            .unwrap();
        assert!(points.is_empty());
    }
}
