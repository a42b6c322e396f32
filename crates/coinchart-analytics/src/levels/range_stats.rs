//! 가격 범위 통계.
//!
//! - 캔들 범위(고가 − 저가)의 평균/최소/최대
//! - 고가·저가·종가를 합친 집합의 모집단 표준편차와 백분위수 (선형 보간)
//! - 활성 가격대: 종가 범위의 1% 폭 구간 중 캔들이 가장 많이 지나간 상위 3개

use coinchart_core::{CandleSeries, Price};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::indicators::{mean, population_std_dev, IndicatorResult};

/// 활성 가격대 구간 폭 (종가 범위 대비).
const BIN_FRACTION: Decimal = dec!(0.01);

/// 보고할 활성 가격대 수.
const TOP_RANGES: usize = 3;

/// 백분위수 (5/25/50/75/95).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: Price,
    pub p25: Price,
    pub p50: Price,
    pub p75: Price,
    pub p95: Price,
}

/// 캔들이 많이 지나간 가격 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRange {
    pub low: Price,
    pub high: Price,
    /// 이 구간에 걸친 캔들 수
    pub candle_count: usize,
}

/// 범위 통계 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeStatistics {
    pub average_range: Decimal,
    pub min_range: Decimal,
    pub max_range: Decimal,
    pub std_dev: Decimal,
    pub percentiles: Percentiles,
    pub active_ranges: Vec<ActiveRange>,
}

/// 범위 통계를 계산합니다. 빈 시리즈는 `None`.
///
/// 합산 중 `Decimal` 범위를 넘으면 `CalculationError`를 반환합니다.
pub fn range_statistics(series: &CandleSeries) -> IndicatorResult<Option<RangeStatistics>> {
    if series.is_empty() {
        return Ok(None);
    }

    let ranges: Vec<Decimal> = series.iter().map(|c| c.range()).collect();
    let mut pooled: Vec<Price> = series
        .iter()
        .flat_map(|c| [c.high, c.low, c.close])
        .collect();
    let pooled_mean = mean(&pooled)?;
    let std_dev = population_std_dev(&pooled, pooled_mean)?;
    let average_range = mean(&ranges)?;
    pooled.sort();

    let percentiles = || -> Option<Percentiles> {
        Some(Percentiles {
            p5: percentile(&pooled, dec!(5))?,
            p25: percentile(&pooled, dec!(25))?,
            p50: percentile(&pooled, dec!(50))?,
            p75: percentile(&pooled, dec!(75))?,
            p95: percentile(&pooled, dec!(95))?,
        })
    };
    let (Some(min_range), Some(max_range), Some(percentiles)) = (
        ranges.iter().copied().min(),
        ranges.iter().copied().max(),
        percentiles(),
    ) else {
        return Ok(None);
    };

    Ok(Some(RangeStatistics {
        average_range,
        min_range,
        max_range,
        std_dev,
        percentiles,
        active_ranges: active_ranges(series),
    }))
}

/// 정렬된 값에서 선형 보간 백분위수.
///
/// 순위 `p/100 × (n − 1)`의 양쪽 값을 보간합니다.
pub fn percentile(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p / Decimal::ONE_HUNDRED * Decimal::from(last);
    let lower = rank.floor().to_usize()?.min(last);
    let upper = (lower + 1).min(last);
    let fraction = rank - Decimal::from(lower);
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// 상위 활성 가격대.
///
/// 구간은 최저가에서 시작하며 폭은 종가 범위의 1%입니다. 각 캔들은
/// [저가, 고가]가 걸치는 모든 구간에 1씩 더합니다 (차분 배열 스윕).
/// 동률이면 낮은 가격이 먼저 옵니다. 종가 범위가 0이면 전체를 하나의 구간으로 봅니다.
pub fn active_ranges(series: &CandleSeries) -> Vec<ActiveRange> {
    let (Some(base), Some(top)) = (series.lowest_low(), series.highest_high()) else {
        return Vec::new();
    };
    let closes = series.closes();
    let close_span = match (closes.iter().max(), closes.iter().min()) {
        (Some(max), Some(min)) => max.saturating_sub(*min),
        _ => Decimal::ZERO,
    };

    // 종가 범위가 극히 작으면 1% 폭이 0으로 반올림될 수 있음
    let bin = close_span * BIN_FRACTION;
    if bin.is_zero() {
        return vec![ActiveRange {
            low: base,
            high: top,
            candle_count: series.len(),
        }];
    }

    let bin_of = |price: Price| {
        price
            .saturating_sub(base)
            .checked_div(bin)
            .and_then(|offset| offset.floor().to_i64())
            .unwrap_or(i64::MAX)
    };

    // 차분 배열: 시작 구간 +1, 끝 구간 다음 -1
    let mut deltas: BTreeMap<i64, i64> = BTreeMap::new();
    for candle in series {
        let first = bin_of(candle.low);
        let last = bin_of(candle.high);
        *deltas.entry(first).or_insert(0) += 1;
        *deltas.entry(last.saturating_add(1)).or_insert(0) -= 1;
    }

    // 구간 [start, end)는 같은 카운트를 가짐
    let mut segments: Vec<(i64, i64, i64)> = Vec::new();
    let mut running = 0i64;
    let keys: Vec<(i64, i64)> = deltas.into_iter().collect();
    for (pos, (start, delta)) in keys.iter().enumerate() {
        running += delta;
        if running > 0 {
            if let Some((end, _)) = keys.get(pos + 1) {
                segments.push((*start, *end, running));
            }
        }
    }

    segments.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    let mut result = Vec::with_capacity(TOP_RANGES);
    'outer: for (start, end, count) in segments {
        for k in start..end {
            if result.len() == TOP_RANGES {
                break 'outer;
            }
            let low = base + bin * Decimal::from(k);
            result.push(ActiveRange {
                low,
                high: low + bin,
                candle_count: count as usize,
            });
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_series, series_from_ohlc};

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        assert_eq!(percentile(&sorted, dec!(50)), Some(dec!(3)));
        assert_eq!(percentile(&sorted, dec!(25)), Some(dec!(2)));
        assert_eq!(percentile(&sorted, dec!(95)), Some(dec!(4.8)));
        assert_eq!(percentile(&sorted, dec!(5)), Some(dec!(1.2)));
        assert_eq!(percentile(&[], dec!(50)), None);
        assert_eq!(percentile(&[dec!(7)], dec!(95)), Some(dec!(7)));
    }

    #[test]
    fn test_range_statistics() {
        let series = series_from_ohlc(&[
            (dec!(100), dec!(110), dec!(95), dec!(105)),
            (dec!(105), dec!(108), dec!(100), dec!(102)),
            (dec!(102), dec!(120), dec!(101), dec!(118)),
        ]);
        let stats = range_statistics(&series).unwrap().unwrap();

        assert_eq!(stats.average_range, dec!(14));
        assert_eq!(stats.min_range, dec!(8));
        assert_eq!(stats.max_range, dec!(19));
        assert!(stats.percentiles.p5 <= stats.percentiles.p50);
        assert!(stats.percentiles.p50 <= stats.percentiles.p95);
        assert!(stats.std_dev > Decimal::ZERO);
        assert_eq!(stats.active_ranges.len(), 3);
    }

    #[test]
    fn test_active_ranges_pick_most_visited_lowest_first() {
        // 종가 범위 100 -> 구간 폭 1, 기준가 = 최저가 100
        let series = series_from_ohlc(&[
            (dec!(100), dec!(100.5), dec!(100), dec!(100)),
            (dec!(105), dec!(106), dec!(104), dec!(105)),
            (dec!(105), dec!(105.5), dec!(104.5), dec!(105)),
            (dec!(200), dec!(200), dec!(199.5), dec!(200)),
        ]);
        let ranges = active_ranges(&series);

        assert_eq!(ranges.len(), 3);
        // 104~105, 105~106 구간에 캔들 2개씩
        assert_eq!(ranges[0].low, dec!(104));
        assert_eq!(ranges[0].candle_count, 2);
        assert_eq!(ranges[1].low, dec!(105));
        assert_eq!(ranges[1].candle_count, 2);
        // 나머지 동률(1개) 중 가장 낮은 가격
        assert_eq!(ranges[2].low, dec!(100));
        assert_eq!(ranges[2].candle_count, 1);
    }

    #[test]
    fn test_zero_close_span_single_range() {
        let series = constant_series(10, dec!(50));
        let ranges = active_ranges(&series);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].candle_count, 10);
    }

    #[test]
    fn test_empty_series() {
        assert!(range_statistics(&CandleSeries::default()).unwrap().is_none());
    }

    #[test]
    fn test_tiny_close_span_single_range() {
        // 종가 차이 1e-28: 구간 폭이 0으로 반올림됨
        let series = series_from_ohlc(&[
            (dec!(1), dec!(1), dec!(1), dec!(1)),
            (
                dec!(1.0000000000000000000000000001),
                dec!(1.0000000000000000000000000001),
                dec!(1),
                dec!(1.0000000000000000000000000001),
            ),
        ]);
        let ranges = active_ranges(&series);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].candle_count, 2);

        let stats = range_statistics(&series).unwrap().unwrap();
        assert_eq!(stats.active_ranges, ranges);
    }

    #[test]
    fn test_overflowing_prices_are_calculation_error() {
        let big = Decimal::from(1_000_000_000_000_000_i64);
        let small = Decimal::from(100_000_000_000_000_i64);
        let series = series_from_ohlc(&[(big, big, big, big), (small, small, small, small)]);
        assert!(matches!(
            range_statistics(&series),
            Err(crate::indicators::IndicatorError::CalculationError(_))
        ));
    }
}
