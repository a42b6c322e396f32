//! 추세/모멘텀 지표 규칙.

use coinchart_core::{DecimalExt, LinePoint, Price, Signal, SignalKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

use super::{compose, fmt_pct, fmt_price, ClassifierParams};
use crate::indicators::{IchimokuPoint, MovingAverageSet, SarPoint, SuperTrendPoint, RSI_MAX};

/// 기울기 판단에 쓰는 최대 과거 포인트 수.
const SLOPE_LOOKBACK: usize = 5;

const RSI_MIDLINE: Decimal = dec!(50);

fn side(close: Price, line: Price) -> (SignalKind, &'static str) {
    match close.cmp(&line) {
        Ordering::Greater => (SignalKind::Bullish, "above"),
        Ordering::Less => (SignalKind::Bearish, "below"),
        Ordering::Equal => (SignalKind::Neutral, "at"),
    }
}

/// 가격과 이동평균의 위치 및 이동평균 기울기.
pub fn moving_average(name: &str, points: &[LinePoint], close: Price, p: &ClassifierParams) -> Option<Signal> {
    let last = points.last()?;
    let distance = close.pct_change_from(last.value)?;
    let lookback = SLOPE_LOOKBACK.min(points.len() - 1);
    let prior = points[points.len() - 1 - lookback].value;

    let slope = match last.value.cmp(&prior) {
        _ if lookback == 0 => "flat",
        Ordering::Greater => "rising",
        Ordering::Less => "falling",
        Ordering::Equal => "flat",
    };

    let (position, word) = side(close, last.value);
    let kind = match (position, slope) {
        (SignalKind::Bullish, "rising") => SignalKind::Bullish,
        (SignalKind::Bearish, "falling") => SignalKind::Bearish,
        _ => SignalKind::Neutral,
    };

    let mut reasons = vec![
        format!("Price is {} the {} by {}", word, name, fmt_pct(distance.abs())),
        format!("{} slope is {} over the last {} periods", name, slope, lookback),
    ];
    let extended = distance.abs() > p.extension_threshold_pct;
    if extended {
        reasons.push(format!("Price is significantly extended from the {}", name));
    }

    let recommendation = match kind {
        SignalKind::Bullish if extended => "Uptrend intact but stretched; wait for a pullback toward the average",
        SignalKind::Bullish => "Trend favors longs; pullbacks toward the average are buying opportunities",
        SignalKind::Bearish if extended => "Downtrend intact but stretched; avoid chasing shorts here",
        SignalKind::Bearish => "Trend favors shorts; rallies toward the average may be sold",
        SignalKind::Neutral => "Price and slope disagree; wait for them to align",
    };

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("value", fmt_price(last.value))
            .with_metric("distance_pct", fmt_pct(distance))
            .with_metric("slope", slope),
    )
}

/// 단기/중기/장기 이동평균 묶음.
///
/// 데이터가 있는 가장 짧은 기간으로 기본 신호를 만들고, 더 긴 기간에 대한 가격 위치를
/// 근거에 덧붙입니다. 가장 긴 이동평균이 기본 방향과 반대편에 있으면 중립으로 낮춥니다.
pub fn moving_average_set(name: &str, set: &MovingAverageSet, close: Price, p: &ClassifierParams) -> Option<Signal> {
    let available: Vec<(usize, &[LinePoint])> = set
        .lines
        .iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(&period, points)| (period, points.as_slice()))
        .collect();
    let ((base_period, base_points), longer) = available.split_first()?;

    let mut signal = moving_average(&format!("{}({})", name, base_period), base_points, close, p)?;
    for (period, points) in &available {
        if let Some(last) = points.last() {
            signal = signal.with_metric(format!("value_{}", period), fmt_price(last.value));
        }
    }

    let Some((long_period, long_points)) = longer.last() else {
        return Some(signal);
    };
    let positions: Vec<String> = longer
        .iter()
        .filter_map(|(period, points)| {
            let (_, word) = side(close, points.last()?.value);
            Some(format!("{} the {}({})", word, name, period))
        })
        .collect();
    signal = signal.with_reason(format!("Price is {}", positions.join(" and ")));

    let lasts: Vec<Price> = available
        .iter()
        .filter_map(|(_, points)| points.last().map(|l| l.value))
        .collect();
    if lasts.windows(2).all(|w| w[0] > w[1]) {
        signal = signal.with_metric("stacking", "bullish");
    } else if lasts.windows(2).all(|w| w[0] < w[1]) {
        signal = signal.with_metric("stacking", "bearish");
    }

    let (long_side, _) = side(close, long_points.last()?.value);
    if !signal.is_neutral() && long_side != signal.kind {
        signal.kind = SignalKind::Neutral;
        signal.recommendation = format!(
            "Short-term trend runs against the {}({}); wait for the longer average to confirm",
            name, long_period
        );
    }

    Some(signal)
}

/// RSI 과매수/과매도.
pub fn rsi(points: &[LinePoint], p: &ClassifierParams) -> Option<Signal> {
    let last = points.last()?;
    let value = last.value;

    let (kind, first, recommendation) = if value >= p.rsi_overbought {
        (
            SignalKind::Bearish,
            format!("RSI at {} is overbought (>= {})", fmt_price(value), p.rsi_overbought),
            "Momentum is stretched; avoid chasing and watch for a reversal",
        )
    } else if value <= p.rsi_oversold {
        (
            SignalKind::Bullish,
            format!("RSI at {} is oversold (<= {})", fmt_price(value), p.rsi_oversold),
            "Selling looks exhausted; watch for a bounce",
        )
    } else {
        (
            SignalKind::Neutral,
            format!(
                "RSI at {} is between {} and {}",
                fmt_price(value),
                p.rsi_oversold,
                p.rsi_overbought
            ),
            "No momentum extreme; follow the prevailing trend",
        )
    };

    let mut reasons = vec![first];
    // 평균 하락폭이 0이면 횡보 구간에서도 100에 고정되며 과매수로 분류됨
    if value == RSI_MAX {
        reasons.push("RSI is pinned at 100 because no candle closed lower in the averaging window".to_string());
    }
    reasons.push(match value.cmp(&RSI_MIDLINE) {
        Ordering::Greater => "Momentum leans positive (above 50)".to_string(),
        Ordering::Less => "Momentum leans negative (below 50)".to_string(),
        Ordering::Equal => "Momentum is balanced at 50".to_string(),
    });
    if let Some(prev) = points.len().checked_sub(2).and_then(|i| points.get(i)) {
        match value.cmp(&prev.value) {
            Ordering::Greater => reasons.push("RSI is rising".to_string()),
            Ordering::Less => reasons.push("RSI is falling".to_string()),
            Ordering::Equal => {}
        }
    }

    Some(compose(kind, reasons, recommendation).with_metric("rsi", fmt_price(value)))
}

/// 가격과 SuperTrend 선의 위치, 추세 지속 기간, 확장 여부.
pub fn supertrend(points: &[SuperTrendPoint], close: Price, p: &ClassifierParams) -> Option<Signal> {
    let last = points.last()?;
    let distance = close.pct_change_from(last.value)?;
    let (kind, word) = side(close, last.value);
    let direction = if last.is_uptrend { "uptrend" } else { "downtrend" };

    let mut reasons = vec![format!(
        "Price is {} the SuperTrend line at {}",
        word,
        fmt_price(last.value)
    )];
    if last.flipped || last.trend_periods <= 1 {
        reasons.push(format!("Fresh {} signal on the latest candle", direction));
    } else {
        reasons.push(format!("The {} has held for {} periods", direction, last.trend_periods));
    }
    let extended = distance.abs() > p.extension_threshold_pct;
    if extended {
        reasons.push(format!(
            "Price is {} away from the line; the move looks extended",
            fmt_pct(distance.abs())
        ));
    }

    let recommendation = match kind {
        SignalKind::Bullish if extended => "Trend is up but extended; wait for a pullback toward the line before adding",
        SignalKind::Bullish => "Trend is up; hold longs with a stop below the SuperTrend line",
        SignalKind::Bearish if extended => "Trend is down but extended; avoid fresh shorts far from the line",
        SignalKind::Bearish => "Trend is down; the SuperTrend line acts as resistance",
        SignalKind::Neutral => "Price sits on the line; wait for a decisive close",
    };

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("value", fmt_price(last.value))
            .with_metric("distance_pct", fmt_pct(distance))
            .with_metric("trend", direction)
            .with_metric("trend_periods", last.trend_periods),
    )
}

/// 가격과 SAR 점의 위치.
pub fn parabolic_sar(points: &[SarPoint], close: Price, p: &ClassifierParams) -> Option<Signal> {
    let last = points.last()?;
    let distance = close.pct_change_from(last.value)?;
    let (kind, word) = side(close, last.value);
    let direction = if last.is_uptrend { "uptrend" } else { "downtrend" };
    let streak = points
        .iter()
        .rev()
        .take_while(|pt| pt.is_uptrend == last.is_uptrend)
        .count();

    let mut reasons = vec![format!(
        "Price is {} the Parabolic SAR at {}",
        word,
        fmt_price(last.value)
    )];
    if streak <= 1 {
        reasons.push(format!("SAR flipped to a {} on the latest candle", direction));
    } else {
        reasons.push(format!("SAR {} has held for {} periods", direction, streak));
    }
    reasons.push(format!("Acceleration factor is {}", last.acceleration.normalize()));
    if distance.abs() > p.extension_threshold_pct {
        reasons.push(format!("Price is {} away from the SAR", fmt_pct(distance.abs())));
    }

    let recommendation = match kind {
        SignalKind::Bullish => "Trail stops at the SAR level while the dots stay below price",
        SignalKind::Bearish => "Stay defensive while the dots stay above price",
        SignalKind::Neutral => "Price is touching the SAR; a reversal may be forming",
    };

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("value", fmt_price(last.value))
            .with_metric("extreme_point", fmt_price(last.extreme_point))
            .with_metric("acceleration", last.acceleration.normalize())
            .with_metric("trend", direction),
    )
}

/// 구름 대비 가격, 전환선/기준선, 미래 구름 색으로 점수를 매깁니다.
///
/// 점수가 +2 이상이면 강세, −2 이하이면 약세입니다.
pub fn ichimoku(points: &[IchimokuPoint], candle_count: usize, close: Price) -> Option<Signal> {
    let current = points.get(candle_count.checked_sub(1)?)?;
    let future = points.last()?;
    let mut score = 0i32;
    let mut reasons = Vec::new();

    match (current.cloud_top(), current.cloud_bottom()) {
        (Some(top), Some(_)) if close > top => {
            score += 1;
            reasons.push("Price is above the cloud".to_string());
        }
        (Some(_), Some(bottom)) if close < bottom => {
            score -= 1;
            reasons.push("Price is below the cloud".to_string());
        }
        (Some(_), Some(_)) => reasons.push("Price is inside the cloud; trend is undecided".to_string()),
        _ => reasons.push("The cloud has not formed at the latest candle".to_string()),
    }

    if let (Some(tenkan), Some(kijun)) = (current.tenkan, current.kijun) {
        match tenkan.cmp(&kijun) {
            Ordering::Greater => {
                score += 1;
                reasons.push("Tenkan-sen is above Kijun-sen".to_string());
            }
            Ordering::Less => {
                score -= 1;
                reasons.push("Tenkan-sen is below Kijun-sen".to_string());
            }
            Ordering::Equal => reasons.push("Tenkan-sen and Kijun-sen are flat together".to_string()),
        }
    }

    match future.is_bullish_cloud() {
        Some(true) => {
            score += 1;
            reasons.push("The future cloud is bullish (Senkou A above Senkou B)".to_string());
        }
        Some(false) => {
            score -= 1;
            reasons.push("The future cloud is bearish (Senkou A below Senkou B)".to_string());
        }
        None => {}
    }

    let (kind, recommendation) = match score {
        s if s >= 2 => (SignalKind::Bullish, "Ichimoku structure is bullish; favor longs above the cloud"),
        s if s <= -2 => (SignalKind::Bearish, "Ichimoku structure is bearish; favor caution below the cloud"),
        _ => (SignalKind::Neutral, "Ichimoku components disagree; wait for confirmation"),
    };

    let mut signal = compose(kind, reasons, recommendation).with_metric("score", score);
    if let Some(tenkan) = current.tenkan {
        signal = signal.with_metric("tenkan", fmt_price(tenkan));
    }
    if let Some(kijun) = current.kijun {
        signal = signal.with_metric("kijun", fmt_price(kijun));
    }
    if let (Some(top), Some(bottom)) = (current.cloud_top(), current.cloud_bottom()) {
        signal = signal
            .with_metric("cloud_top", fmt_price(top))
            .with_metric("cloud_bottom", fmt_price(bottom));
    }
    Some(signal)
}
