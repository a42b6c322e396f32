//! 검증된 캔들 시리즈.

use crate::domain::Candle;
use crate::error::ValidationError;
use crate::types::Price;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시간 오름차순으로 정렬된 불변 캔들 시퀀스.
///
/// `CandleSeries::new`를 통해서만 생성되며, 생성 시점에 다음을 보장합니다:
/// - 모든 캔들의 OHLC 관계가 유효함
/// - 타임스탬프가 순증가함 (중복 없음)
/// - 거래량이 음수가 아님
///
/// 빈 시리즈도 유효합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Candle>", into = "Vec<Candle>")]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// 캔들 목록을 검증하여 시리즈를 생성합니다.
    ///
    /// # 에러
    ///
    /// 첫 번째로 발견된 위반 사항을 해당 캔들 인덱스와 함께 반환합니다.
    pub fn new(candles: Vec<Candle>) -> Result<Self, ValidationError> {
        for (index, candle) in candles.iter().enumerate() {
            if !candle.has_valid_ohlc() {
                return Err(ValidationError::InvalidOhlc { index });
            }
            if candle.volume < Decimal::ZERO {
                return Err(ValidationError::NegativeVolume { index });
            }
            if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
                return Err(ValidationError::NonMonotonicTimestamp { index });
            }
        }

        Ok(Self { candles })
    }

    /// 캔들 슬라이스를 반환합니다.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Price> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// 시리즈 전체의 최고가.
    pub fn highest_high(&self) -> Option<Price> {
        self.candles.iter().map(|c| c.high).max()
    }

    /// 시리즈 전체의 최저가.
    pub fn lowest_low(&self) -> Option<Price> {
        self.candles.iter().map(|c| c.low).min()
    }

    /// 마지막 두 캔들 사이의 간격. 캔들이 2개 미만이면 `None`.
    pub fn interval(&self) -> Option<Duration> {
        let n = self.candles.len();
        if n < 2 {
            return None;
        }
        Some(self.candles[n - 1].timestamp - self.candles[n - 2].timestamp)
    }

    /// 마지막 캔들로부터 `steps` 간격 뒤의 타임스탬프 (미래 투영용).
    pub fn project_timestamp(&self, steps: usize) -> Option<DateTime<Utc>> {
        let last = self.last()?.timestamp;
        let interval = self.interval()?;
        let steps = i32::try_from(steps).ok()?;
        last.checked_add_signed(interval * steps)
    }

    /// `index` 위치의 캔들을 제외한 새 시리즈를 반환합니다.
    ///
    /// 남은 캔들은 이미 검증된 순서를 유지하므로 불변식이 그대로 성립합니다.
    pub fn without(&self, index: usize) -> Self {
        let candles = self
            .candles
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, c)| c.clone())
            .collect();
        Self { candles }
    }
}

impl TryFrom<Vec<Candle>> for CandleSeries {
    type Error = ValidationError;

    fn try_from(candles: Vec<Candle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}

impl From<CandleSeries> for Vec<Candle> {
    fn from(series: CandleSeries) -> Self {
        series.candles
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn candle_at(minute: i64, close: Decimal) -> Candle {
        Candle::new(
            Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            close,
            close + dec!(1),
            close - dec!(1),
            close,
            dec!(10),
        )
    }

    #[test]
    fn test_valid_series() {
        let series = CandleSeries::new(vec![candle_at(0, dec!(100)), candle_at(1, dec!(101))]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![dec!(100), dec!(101)]);
        assert_eq!(series.interval(), Some(Duration::minutes(1)));
        assert_eq!(
            series.project_timestamp(3),
            Some(Utc.timestamp_opt(1_700_000_000 + 4 * 60, 0).unwrap())
        );
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = CandleSeries::new(vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.interval(), None);
        assert_eq!(series.project_timestamp(1), None);
    }

    #[test]
    fn test_rejects_duplicate_timestamp() {
        let err = CandleSeries::new(vec![candle_at(0, dec!(100)), candle_at(0, dec!(101))]).unwrap_err();
        assert_eq!(err, ValidationError::NonMonotonicTimestamp { index: 1 });
    }

    #[test]
    fn test_rejects_invalid_ohlc() {
        let mut bad = candle_at(1, dec!(100));
        bad.high = dec!(99);
        let err = CandleSeries::new(vec![candle_at(0, dec!(100)), bad]).unwrap_err();
        assert_eq!(err, ValidationError::InvalidOhlc { index: 1 });
    }

    #[test]
    fn test_rejects_negative_volume() {
        let mut bad = candle_at(2, dec!(100));
        bad.volume = dec!(-1);
        let err = CandleSeries::new(vec![candle_at(0, dec!(100)), candle_at(1, dec!(100)), bad]).unwrap_err();
        assert_eq!(err, ValidationError::NegativeVolume { index: 2 });
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[
            {"timestamp": 2000, "open": "1", "high": "2", "low": "0.5", "close": "1.5", "volume": "3"},
            {"timestamp": 1000, "open": "1", "high": "2", "low": "0.5", "close": "1.5", "volume": "3"}
        ]"#;
        let result: Result<CandleSeries, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_without_keeps_order() {
        let series = CandleSeries::new(vec![
            candle_at(0, dec!(100)),
            candle_at(1, dec!(101)),
            candle_at(2, dec!(102)),
        ])
        .unwrap();
        let trimmed = series.without(1);
        assert_eq!(trimmed.closes(), vec![dec!(100), dec!(102)]);
    }
}
