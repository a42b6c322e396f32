//! 피보나치 되돌림/확장 레벨.
//!
//! - 되돌림: `high − r × (high − low)`, r ∈ {0, 0.236, 0.382, 0.5, 0.618, 0.786, 1}
//! - 확장: `low + r × (high − low)`, r ∈ {0, 0.618, 1, 1.272, 1.414, 1.618, 2}

use coinchart_core::{CandleSeries, Price};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 되돌림 비율.
pub const RETRACEMENT_RATIOS: [Decimal; 7] = [
    dec!(0),
    dec!(0.236),
    dec!(0.382),
    dec!(0.5),
    dec!(0.618),
    dec!(0.786),
    dec!(1),
];

/// 확장 비율.
pub const EXTENSION_RATIOS: [Decimal; 7] = [
    dec!(0),
    dec!(0.618),
    dec!(1),
    dec!(1.272),
    dec!(1.414),
    dec!(1.618),
    dec!(2),
];

/// 하나의 피보나치 레벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: Decimal,
    pub price: Price,
}

/// 시리즈 전체 고가/저가 기준 피보나치 레벨.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: Price,
    pub low: Price,
    pub retracements: Vec<FibonacciLevel>,
    pub extensions: Vec<FibonacciLevel>,
}

impl FibonacciLevels {
    /// 고가/저가로부터 레벨을 계산합니다.
    pub fn from_range(high: Price, low: Price) -> Self {
        let range = high - low;
        Self {
            high,
            low,
            retracements: RETRACEMENT_RATIOS
                .iter()
                .map(|&ratio| FibonacciLevel {
                    ratio,
                    price: high - ratio * range,
                })
                .collect(),
            extensions: EXTENSION_RATIOS
                .iter()
                .map(|&ratio| FibonacciLevel {
                    ratio,
                    price: low + ratio * range,
                })
                .collect(),
        }
    }

    /// 주어진 비율의 되돌림 가격.
    pub fn retracement(&self, ratio: Decimal) -> Option<Price> {
        self.retracements
            .iter()
            .find(|l| l.ratio == ratio)
            .map(|l| l.price)
    }

    /// 가격을 감싸는 인접 되돌림 레벨 쌍 (위, 아래).
    ///
    /// 가격이 범위 밖이면 `None`.
    pub fn enclosing_retracements(&self, price: Price) -> Option<(FibonacciLevel, FibonacciLevel)> {
        // 되돌림 가격은 비율 순으로 내림차순
        self.retracements
            .windows(2)
            .find(|w| price <= w[0].price && price >= w[1].price)
            .map(|w| (w[0], w[1]))
    }
}

/// 시리즈 전체 최고가/최저가로 피보나치 레벨을 계산합니다. 빈 시리즈는 `None`.
pub fn fibonacci_levels(series: &CandleSeries) -> Option<FibonacciLevels> {
    let high = series.highest_high()?;
    let low = series.lowest_low()?;
    Some(FibonacciLevels::from_range(high, low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_ohlc;

    #[test]
    fn test_retracement_levels() {
        let levels = FibonacciLevels::from_range(dec!(200), dec!(100));

        assert_eq!(levels.retracement(dec!(0)), Some(dec!(200)));
        assert_eq!(levels.retracement(dec!(0.5)), Some(dec!(150)));
        assert_eq!(levels.retracement(dec!(0.618)), Some(dec!(138.2)));
        assert_eq!(levels.retracement(dec!(1)), Some(dec!(100)));
    }

    #[test]
    fn test_extension_levels() {
        let levels = FibonacciLevels::from_range(dec!(200), dec!(100));
        let prices: Vec<Decimal> = levels.extensions.iter().map(|l| l.price).collect();
        assert_eq!(
            prices,
            vec![dec!(100), dec!(161.8), dec!(200), dec!(227.2), dec!(241.4), dec!(261.8), dec!(300)]
        );
    }

    #[test]
    fn test_enclosing_retracements() {
        let levels = FibonacciLevels::from_range(dec!(200), dec!(100));
        let (upper, lower) = levels.enclosing_retracements(dec!(145)).unwrap();
        assert_eq!(upper.ratio, dec!(0.5));
        assert_eq!(lower.ratio, dec!(0.618));
        assert!(levels.enclosing_retracements(dec!(250)).is_none());
    }

    #[test]
    fn test_uses_global_extremes() {
        let series = series_from_ohlc(&[
            (dec!(150), dec!(160), dec!(140), dec!(155)),
            (dec!(155), dec!(200), dec!(150), dec!(190)),
            (dec!(190), dec!(195), dec!(100), dec!(120)),
        ]);
        let levels = fibonacci_levels(&series).unwrap();
        assert_eq!(levels.high, dec!(200));
        assert_eq!(levels.low, dec!(100));
    }

    #[test]
    fn test_empty_series() {
        assert!(fibonacci_levels(&CandleSeries::default()).is_none());
    }
}
