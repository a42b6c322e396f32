//! 차트 오버레이 타입 (라인, 밴드).

use crate::types::{DecimalExt, Percentage, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 시계열 라인의 한 점 (SMA, EMA, RSI 등).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

impl LinePoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

/// 상단/중간/하단으로 구성된 밴드의 한 점.
///
/// 불변식: `upper >= middle >= lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub upper: Price,
    pub middle: Price,
    pub lower: Price,
}

impl Band {
    pub fn new(timestamp: DateTime<Utc>, upper: Price, middle: Price, lower: Price) -> Self {
        Self {
            timestamp,
            upper,
            middle,
            lower,
        }
    }

    /// 밴드 폭 (upper - lower).
    pub fn width(&self) -> Decimal {
        self.upper - self.lower
    }

    /// 중간선 대비 밴드 폭(%). 중간선이 0이면 `None`.
    pub fn bandwidth_pct(&self) -> Option<Percentage> {
        self.width()
            .safe_div(self.middle)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    }

    /// 밴드 내 가격 위치 (0 = 하단, 1 = 상단). 폭이 0이면 `None`.
    pub fn percent_b(&self, price: Price) -> Option<Decimal> {
        (price - self.lower).safe_div(self.width())
    }

    /// 밴드 불변식 확인.
    pub fn is_ordered(&self) -> bool {
        self.upper >= self.middle && self.middle >= self.lower
    }
}
