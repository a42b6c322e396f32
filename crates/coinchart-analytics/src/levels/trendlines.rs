//! 추세선, 평행 채널, 거래량 돌파.
//!
//! - 추세선: 시간순으로 연속된 같은 종류의 스윙 포인트를 연결
//!   (고점끼리는 저항선, 저점끼리는 지지선)
//! - 채널: 시간이 겹치고 기울기가 거의 같으며 충분히 벌어진 저항선/지지선 쌍
//! - 돌파: 평균 대비 거래량 급증과 큰 종가 변동이 동시에 나타난 캔들

use chrono::{DateTime, Utc};
use coinchart_core::{
    AnchorPoint, BreakoutConfig, CandleSeries, ChannelConfig, DecimalExt, Percentage, Price,
    SwingKind, SwingPoint, TrendLine,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::indicators::{ensure_non_negative, ensure_period, IndicatorResult};

pub const RESISTANCE_LABEL: &str = "resistance";
pub const SUPPORT_LABEL: &str = "support";
pub const BULLISH_BREAKOUT_LABEL: &str = "bullish_breakout";
pub const BEARISH_BREAKOUT_LABEL: &str = "bearish_breakout";

/// 평행 채널 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelParams {
    /// 허용 기울기 차이 % (큰 기울기 크기 대비, 기본: 10).
    pub slope_tolerance_pct: Percentage,
    /// 최소 채널 폭 % (지지선 가격 대비, 기본: 1).
    pub min_width_pct: Percentage,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            slope_tolerance_pct: dec!(10),
            min_width_pct: dec!(1),
        }
    }
}

impl From<&ChannelConfig> for ChannelParams {
    fn from(config: &ChannelConfig) -> Self {
        Self {
            slope_tolerance_pct: config.slope_tolerance_pct,
            min_width_pct: config.min_width_pct,
        }
    }
}

/// 돌파 탐지 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BreakoutParams {
    /// 평균 거래량 구간 (기본: 20).
    pub lookback: usize,
    /// 거래량 배수 (기본: 1.5).
    pub volume_multiplier: Decimal,
    /// 최소 종가 변동 % (기본: 2).
    pub min_move_pct: Percentage,
}

impl Default for BreakoutParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            volume_multiplier: dec!(1.5),
            min_move_pct: dec!(2),
        }
    }
}

impl From<&BreakoutConfig> for BreakoutParams {
    fn from(config: &BreakoutConfig) -> Self {
        Self {
            lookback: config.lookback,
            volume_multiplier: config.volume_multiplier,
            min_move_pct: config.min_move_pct,
        }
    }
}

/// 평행 채널.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// 저항선
    pub upper: TrendLine,
    /// 지지선
    pub lower: TrendLine,
    /// 겹치는 구간 시작 시점의 폭 (지지선 가격 대비 %)
    pub width_pct: Percentage,
}

/// 돌파 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutDirection {
    Bullish,
    Bearish,
}

/// 거래량 동반 돌파.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakout {
    pub index: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub direction: BreakoutDirection,
    /// 돌파 캔들 종가
    pub price: Price,
    /// 직전 캔들 종가
    pub previous_close: Price,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub previous_timestamp: DateTime<Utc>,
    /// 직전 종가 대비 변동 %
    pub change_pct: Percentage,
    /// 평균 거래량 대비 배수 (평균이 0이면 `None`)
    pub volume_ratio: Option<Decimal>,
}

impl Breakout {
    /// 직전 종가에서 돌파 종가까지의 선.
    pub fn as_trend_line(&self) -> TrendLine {
        let label = match self.direction {
            BreakoutDirection::Bullish => BULLISH_BREAKOUT_LABEL,
            BreakoutDirection::Bearish => BEARISH_BREAKOUT_LABEL,
        };
        TrendLine::new(
            AnchorPoint::new(self.previous_timestamp, self.previous_close),
            AnchorPoint::new(self.timestamp, self.price),
            label,
        )
    }
}

/// 추세선 분석 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLineAnalysis {
    pub lines: Vec<TrendLine>,
    pub channels: Vec<Channel>,
    pub breakouts: Vec<Breakout>,
}

impl TrendLineAnalysis {
    /// 추세선과 돌파선을 모두 반환합니다.
    pub fn all_lines(&self) -> Vec<TrendLine> {
        self.lines
            .iter()
            .cloned()
            .chain(self.breakouts.iter().map(Breakout::as_trend_line))
            .collect()
    }

    pub fn resistance_lines(&self) -> impl Iterator<Item = &TrendLine> {
        self.lines.iter().filter(|l| l.label == RESISTANCE_LABEL)
    }

    pub fn support_lines(&self) -> impl Iterator<Item = &TrendLine> {
        self.lines.iter().filter(|l| l.label == SUPPORT_LABEL)
    }
}

/// 추세선/채널/돌파 탐지기.
#[derive(Debug, Clone, Copy)]
pub struct TrendLineDetector {
    channel: ChannelParams,
    breakout: BreakoutParams,
}

impl TrendLineDetector {
    /// 파라미터를 검증하여 탐지기를 생성합니다.
    pub fn new(channel: ChannelParams, breakout: BreakoutParams) -> IndicatorResult<Self> {
        ensure_non_negative("기울기 허용 오차", channel.slope_tolerance_pct)?;
        ensure_non_negative("최소 채널 폭", channel.min_width_pct)?;
        ensure_period("돌파 거래량 구간", breakout.lookback)?;
        ensure_non_negative("거래량 배수", breakout.volume_multiplier)?;
        ensure_non_negative("최소 변동폭", breakout.min_move_pct)?;
        Ok(Self { channel, breakout })
    }

    /// 스윙 포인트와 시리즈로부터 전체 분석을 수행합니다.
    pub fn analyze(&self, series: &CandleSeries, swings: &[SwingPoint]) -> TrendLineAnalysis {
        let lines = trend_lines(swings);
        let channels = self.channels(&lines);
        let breakouts = self.breakouts(series);

        tracing::debug!(
            lines = lines.len(),
            channels = channels.len(),
            breakouts = breakouts.len(),
            "Trend lines analyzed"
        );

        TrendLineAnalysis {
            lines,
            channels,
            breakouts,
        }
    }

    /// 평행 채널을 찾습니다.
    pub fn channels(&self, lines: &[TrendLine]) -> Vec<Channel> {
        let resistance = lines.iter().filter(|l| l.label == RESISTANCE_LABEL);
        let mut channels = Vec::new();

        for upper in resistance {
            for lower in lines.iter().filter(|l| l.label == SUPPORT_LABEL) {
                if let Some(channel) = self.pair_channel(upper, lower) {
                    channels.push(channel);
                }
            }
        }
        channels
    }

    fn pair_channel(&self, upper: &TrendLine, lower: &TrendLine) -> Option<Channel> {
        let overlap_start = upper.start.timestamp.max(lower.start.timestamp);
        let overlap_end = upper.end.timestamp.min(lower.end.timestamp);
        if overlap_start >= overlap_end {
            return None;
        }

        let upper_slope = upper.slope_per_second();
        let lower_slope = lower.slope_per_second();
        let largest = upper_slope.abs().max(lower_slope.abs());
        if !largest.is_zero() {
            let diff_pct = (upper_slope - lower_slope).abs() / largest * Decimal::ONE_HUNDRED;
            if diff_pct >= self.channel.slope_tolerance_pct {
                return None;
            }
        }

        let top = upper.price_at(overlap_start);
        let bottom = lower.price_at(overlap_start);
        let width_pct = (top - bottom)
            .safe_div(bottom.abs())?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        if width_pct <= self.channel.min_width_pct {
            return None;
        }

        Some(Channel {
            upper: upper.clone(),
            lower: lower.clone(),
            width_pct,
        })
    }

    /// 거래량 동반 돌파를 찾습니다.
    ///
    /// 인덱스 `lookback` 이상에서 거래량이 직전 `lookback`개 평균의 배수를 넘고
    /// 종가 변동이 최소 변동폭을 넘는 캔들.
    pub fn breakouts(&self, series: &CandleSeries) -> Vec<Breakout> {
        let candles = series.candles();
        let lookback = self.breakout.lookback;
        let mut breakouts = Vec::new();

        for i in lookback..candles.len() {
            let candle = &candles[i];
            let prev = &candles[i - 1];

            let avg_volume = candles[i - lookback..i]
                .iter()
                .map(|c| c.volume)
                .sum::<Decimal>()
                / Decimal::from(lookback);
            if candle.volume <= avg_volume * self.breakout.volume_multiplier {
                continue;
            }

            let Some(change_pct) = candle.close.pct_change_from(prev.close) else {
                continue;
            };
            if change_pct.abs() <= self.breakout.min_move_pct {
                continue;
            }

            breakouts.push(Breakout {
                index: i,
                timestamp: candle.timestamp,
                direction: if change_pct > Decimal::ZERO {
                    BreakoutDirection::Bullish
                } else {
                    BreakoutDirection::Bearish
                },
                price: candle.close,
                previous_close: prev.close,
                previous_timestamp: prev.timestamp,
                change_pct,
                volume_ratio: candle.volume.safe_div(avg_volume),
            });
        }
        breakouts
    }
}

/// 연속된 같은 종류의 스윙 포인트를 잇는 추세선.
pub fn trend_lines(swings: &[SwingPoint]) -> Vec<TrendLine> {
    let mut lines = Vec::new();
    for (kind, label) in [(SwingKind::High, RESISTANCE_LABEL), (SwingKind::Low, SUPPORT_LABEL)] {
        let points: Vec<&SwingPoint> = swings.iter().filter(|s| s.kind == kind).collect();
        lines.extend(points.windows(2).map(|pair| {
            TrendLine::new(
                AnchorPoint::new(pair[0].timestamp, pair[0].price),
                AnchorPoint::new(pair[1].timestamp, pair[1].price),
                label,
            )
        }));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{series_from_ohlcv, ts};

    fn swing(index: usize, price: Decimal, kind: SwingKind) -> SwingPoint {
        SwingPoint {
            index,
            timestamp: ts(index),
            price,
            kind,
            strength: Decimal::ZERO,
        }
    }

    fn detector() -> TrendLineDetector {
        TrendLineDetector::new(ChannelParams::default(), BreakoutParams::default()).unwrap()
    }

    #[test]
    fn test_trend_lines_join_consecutive_same_kind() {
        let swings = [
            swing(2, dec!(110), SwingKind::High),
            swing(4, dec!(100), SwingKind::Low),
            swing(6, dec!(112), SwingKind::High),
            swing(8, dec!(102), SwingKind::Low),
            swing(10, dec!(114), SwingKind::High),
        ];
        let lines = trend_lines(&swings);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].label, RESISTANCE_LABEL);
        assert_eq!(lines[0].start.price, dec!(110));
        assert_eq!(lines[0].end.price, dec!(112));
        assert_eq!(lines[2].label, SUPPORT_LABEL);
    }

    #[test]
    fn test_parallel_channel_detected() {
        let swings = [
            swing(0, dec!(110), SwingKind::High),
            swing(1, dec!(100), SwingKind::Low),
            swing(10, dec!(120), SwingKind::High),
            swing(11, dec!(110), SwingKind::Low),
        ];
        let lines = trend_lines(&swings);
        let channels = detector().channels(&lines);

        assert_eq!(channels.len(), 1);
        assert!(channels[0].width_pct > dec!(1));
    }

    #[test]
    fn test_diverging_lines_are_not_channel() {
        let swings = [
            swing(0, dec!(110), SwingKind::High),
            swing(1, dec!(100), SwingKind::Low),
            swing(10, dec!(130), SwingKind::High),
            swing(11, dec!(100), SwingKind::Low),
        ];
        let lines = trend_lines(&swings);
        assert!(detector().channels(&lines).is_empty());
    }

    #[test]
    fn test_flat_lines_are_parallel() {
        let swings = [
            swing(0, dec!(110), SwingKind::High),
            swing(1, dec!(100), SwingKind::Low),
            swing(10, dec!(110), SwingKind::High),
            swing(11, dec!(100), SwingKind::Low),
        ];
        let lines = trend_lines(&swings);
        assert_eq!(detector().channels(&lines).len(), 1);
    }

    #[test]
    fn test_narrow_channel_rejected() {
        let swings = [
            swing(0, dec!(100.5), SwingKind::High),
            swing(1, dec!(100), SwingKind::Low),
            swing(10, dec!(100.5), SwingKind::High),
            swing(11, dec!(100), SwingKind::Low),
        ];
        let lines = trend_lines(&swings);
        assert!(detector().channels(&lines).is_empty());
    }

    #[test]
    fn test_volume_breakout() {
        let mut rows: Vec<_> = (0..21)
            .map(|_| (dec!(100), dec!(101), dec!(99), dec!(100), dec!(10)))
            .collect();
        // 평균 거래량 10의 2배, 종가 +3%
        rows.push((dec!(100), dec!(104), dec!(100), dec!(103), dec!(20)));
        // 거래량은 충분하지만 변동 1%
        rows.push((dec!(103), dec!(104.5), dec!(103), dec!(104.03), dec!(40)));
        let series = series_from_ohlcv(&rows);

        let breakouts = detector().breakouts(&series);
        assert_eq!(breakouts.len(), 1);
        assert_eq!(breakouts[0].index, 21);
        assert_eq!(breakouts[0].direction, BreakoutDirection::Bullish);
        assert_eq!(breakouts[0].change_pct, dec!(3));
        assert_eq!(breakouts[0].volume_ratio, Some(dec!(2)));

        let line = breakouts[0].as_trend_line();
        assert_eq!(line.label, BULLISH_BREAKOUT_LABEL);
        assert_eq!(line.start.price, dec!(100));
        assert_eq!(line.end.price, dec!(103));
    }

    #[test]
    fn test_breakout_needs_lookback() {
        let mut rows: Vec<_> = (0..5)
            .map(|_| (dec!(100), dec!(101), dec!(99), dec!(100), dec!(10)))
            .collect();
        rows.push((dec!(100), dec!(110), dec!(100), dec!(110), dec!(100)));
        let series = series_from_ohlcv(&rows);
        assert!(detector().breakouts(&series).is_empty());
    }
}
