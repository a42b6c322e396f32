//! 가격 레벨 타입.
//!
//! - `SwingPoint` - 스윙 고점/저점 (ZigZag, 지지/저항, 추세선이 공유)
//! - `Zone` - 지지/저항 존
//! - `TrendLine` - 두 앵커 포인트를 잇는 선

use crate::types::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 스윙 포인트 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    /// 반대 종류를 반환합니다.
    pub fn opposite(self) -> Self {
        match self {
            SwingKind::High => SwingKind::Low,
            SwingKind::Low => SwingKind::High,
        }
    }
}

impl std::fmt::Display for SwingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwingKind::High => write!(f, "high"),
            SwingKind::Low => write!(f, "low"),
        }
    }
}

/// 스윙 고점 또는 저점.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// 시리즈 내 캔들 인덱스
    pub index: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub price: Price,
    pub kind: SwingKind,
    /// 강도 (0 ~ 1)
    pub strength: Decimal,
}

impl SwingPoint {
    pub fn is_high(&self) -> bool {
        self.kind == SwingKind::High
    }

    pub fn is_low(&self) -> bool {
        self.kind == SwingKind::Low
    }
}

/// 지지/저항 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Support,
    Resistance,
}

impl From<SwingKind> for ZoneKind {
    fn from(kind: SwingKind) -> Self {
        match kind {
            SwingKind::High => ZoneKind::Resistance,
            SwingKind::Low => ZoneKind::Support,
        }
    }
}

/// 지지/저항 존.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub price: Price,
    pub kind: ZoneKind,
    pub strength: Decimal,
}

/// 추세선의 앵커 포인트.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub price: Price,
}

impl AnchorPoint {
    pub fn new(timestamp: DateTime<Utc>, price: Price) -> Self {
        Self { timestamp, price }
    }
}

/// 두 앵커 포인트를 잇는 라벨이 붙은 선.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLine {
    pub start: AnchorPoint,
    pub end: AnchorPoint,
    pub label: String,
}

impl TrendLine {
    pub fn new(start: AnchorPoint, end: AnchorPoint, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// 초당 가격 변화량. 두 앵커의 시간이 같으면 0.
    pub fn slope_per_second(&self) -> Decimal {
        let secs = (self.end.timestamp - self.start.timestamp).num_seconds();
        if secs == 0 {
            return Decimal::ZERO;
        }
        (self.end.price - self.start.price) / Decimal::from(secs)
    }

    /// 주어진 시각에서 선을 연장한 가격. `Decimal` 범위를 넘으면 경계값으로 포화됩니다.
    pub fn price_at(&self, timestamp: DateTime<Utc>) -> Price {
        let elapsed = (timestamp - self.start.timestamp).num_seconds();
        self.start
            .price
            .saturating_add(self.slope_per_second().saturating_mul(Decimal::from(elapsed)))
    }

    /// 상승 기울기인지 확인합니다.
    pub fn is_rising(&self) -> bool {
        self.end.price > self.start.price
    }

    /// 하락 기울기인지 확인합니다.
    pub fn is_falling(&self) -> bool {
        self.end.price < self.start.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trendline_projection() {
        let t0 = Utc.timestamp_opt(1_000, 0).unwrap();
        let t1 = Utc.timestamp_opt(1_100, 0).unwrap();
        let line = TrendLine::new(AnchorPoint::new(t0, dec!(100)), AnchorPoint::new(t1, dec!(110)), "support");

        assert_eq!(line.slope_per_second(), dec!(0.1));
        assert_eq!(line.price_at(Utc.timestamp_opt(1_200, 0).unwrap()), dec!(120));
        assert!(line.is_rising());
    }

    #[test]
    fn test_zone_kind_from_swing() {
        assert_eq!(ZoneKind::from(SwingKind::High), ZoneKind::Resistance);
        assert_eq!(ZoneKind::from(SwingKind::Low), ZoneKind::Support);
        assert_eq!(SwingKind::High.opposite(), SwingKind::Low);
    }
}
