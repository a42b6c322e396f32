//! 클래식 피벗 포인트.
//!
//! 마지막 캔들 직전 캔들(완성된 이전 기간)의 고가/저가/종가로 계산합니다.
//!
//! ```text
//! PP = (H + L + C) / 3
//! R1 = 2·PP − L    S1 = 2·PP − H
//! R2 = PP + (H − L) S2 = PP − (H − L)
//! R3 = R1 + (H − L) S3 = S1 − (H − L)
//! ```

use coinchart_core::{Candle, CandleSeries, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 피벗 포인트 세트.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotSet {
    pub pp: Price,
    pub r1: Price,
    pub r2: Price,
    pub r3: Price,
    pub s1: Price,
    pub s2: Price,
    pub s3: Price,
}

impl PivotSet {
    /// 단일 캔들로부터 계산합니다.
    pub fn from_candle(candle: &Candle) -> Self {
        Self::from_hlc(candle.high, candle.low, candle.close)
    }

    /// 고가/저가/종가로부터 계산합니다.
    pub fn from_hlc(high: Price, low: Price, close: Price) -> Self {
        let pp = (high + low + close) / Decimal::from(3);
        let range = high - low;
        let r1 = Decimal::TWO * pp - low;
        let s1 = Decimal::TWO * pp - high;
        Self {
            pp,
            r1,
            r2: pp + range,
            r3: r1 + range,
            s1,
            s2: pp - range,
            s3: s1 - range,
        }
    }

    /// 레벨을 (이름, 가격) 목록으로 반환합니다. 높은 가격부터.
    pub fn levels(&self) -> [(&'static str, Price); 7] {
        [
            ("R3", self.r3),
            ("R2", self.r2),
            ("R1", self.r1),
            ("PP", self.pp),
            ("S1", self.s1),
            ("S2", self.s2),
            ("S3", self.s3),
        ]
    }
}

/// 시리즈의 직전 캔들로 피벗을 계산합니다. 캔들이 2개 미만이면 `None`.
pub fn classic_pivots(series: &CandleSeries) -> Option<PivotSet> {
    let n = series.len();
    if n < 2 {
        return None;
    }
    series.get(n - 2).map(PivotSet::from_candle)
}
