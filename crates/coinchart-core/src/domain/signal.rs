//! 지표별 정성적 신호.
//!
//! - `SignalKind` - 강세/약세/중립
//! - `Signal` - 근거, 권고 및 핵심 수치가 포함된 분류 결과

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 근거 문자열 최대 개수.
pub const MAX_RATIONALE: usize = 4;

/// 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Bullish => write!(f, "BULLISH"),
            SignalKind::Bearish => write!(f, "BEARISH"),
            SignalKind::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// 하나의 지표 출력에 대한 분류 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// 근거 (1 ~ 4개)
    pub rationale: Vec<String>,
    pub recommendation: String,
    /// 핵심 수치 (표시용 문자열)
    #[serde(default)]
    pub metrics: BTreeMap<String, String>,
}

impl Signal {
    /// 새 신호를 생성합니다.
    pub fn new(kind: SignalKind, reason: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            kind,
            rationale: vec![reason.into()],
            recommendation: recommendation.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// 강세 신호를 생성합니다.
    pub fn bullish(reason: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(SignalKind::Bullish, reason, recommendation)
    }

    /// 약세 신호를 생성합니다.
    pub fn bearish(reason: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(SignalKind::Bearish, reason, recommendation)
    }

    /// 중립 신호를 생성합니다.
    pub fn neutral(reason: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(SignalKind::Neutral, reason, recommendation)
    }

    /// 데이터 부족 시 사용하는 중립 신호.
    pub fn insufficient_data() -> Self {
        Self::neutral(
            "Not enough candles to evaluate this indicator",
            "Wait for more data before acting",
        )
    }

    /// 근거를 추가합니다. 최대 개수를 넘는 근거는 버려집니다.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        if self.rationale.len() < MAX_RATIONALE {
            self.rationale.push(reason.into());
        }
        self
    }

    /// 핵심 수치를 추가합니다.
    pub fn with_metric(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metrics.insert(key.into(), value.to_string());
        self
    }

    pub fn is_bullish(&self) -> bool {
        self.kind == SignalKind::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.kind == SignalKind::Bearish
    }

    pub fn is_neutral(&self) -> bool {
        self.kind == SignalKind::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_builder() {
        let signal = Signal::bullish("price above line", "hold longs")
            .with_reason("trend fresh")
            .with_metric("distance_pct", "1.25");

        assert!(signal.is_bullish());
        assert_eq!(signal.rationale.len(), 2);
        assert_eq!(signal.metrics.get("distance_pct").map(String::as_str), Some("1.25"));
    }

    #[test]
    fn test_rationale_is_capped() {
        let signal = Signal::neutral("a", "r")
            .with_reason("b")
            .with_reason("c")
            .with_reason("d")
            .with_reason("e");
        assert_eq!(signal.rationale.len(), MAX_RATIONALE);
    }

    #[test]
    fn test_insufficient_data_is_neutral() {
        let signal = Signal::insufficient_data();
        assert!(signal.is_neutral());
        assert_eq!(signal.rationale.len(), 1);
    }
}
