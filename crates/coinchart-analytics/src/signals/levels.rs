//! 가격 레벨 기반 규칙 (ZigZag, 지지/저항, 추세선, 피보나치, 피봇, 범위 통계).

use coinchart_core::{
    CandleSeries, DecimalExt, Price, Signal, SignalKind, SwingKind, SwingPoint, Zone, ZoneKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

use super::{compose, fmt_pct, fmt_price, ClassifierParams};
use crate::levels::{BreakoutDirection, FibonacciLevels, PivotSet, RangeStatistics, TrendLineAnalysis};

fn ratio_label(ratio: Decimal) -> String {
    format!("{}%", (ratio * Decimal::ONE_HUNDRED).normalize())
}

/// 같은 종류의 마지막 두 스윙이 상승했는지 여부.
fn last_two_rising(points: &[SwingPoint], kind: SwingKind) -> Option<bool> {
    let mut same = points.iter().rev().filter(|p| p.kind == kind);
    let last = same.next()?;
    let prev = same.next()?;
    Some(last.price > prev.price)
}

/// 마지막 확정 피벗의 종류와 고점/저점 구조.
pub fn zigzag(points: &[SwingPoint], close: Price) -> Option<Signal> {
    let last = points.last()?;
    let change = close.pct_change_from(last.price)?;

    let (kind, first, recommendation) = match last.kind {
        SwingKind::Low => (
            SignalKind::Bullish,
            format!("Last confirmed pivot is a swing low at {}", fmt_price(last.price)),
            "Structure points higher from the last low; favor longs while it holds",
        ),
        SwingKind::High => (
            SignalKind::Bearish,
            format!("Last confirmed pivot is a swing high at {}", fmt_price(last.price)),
            "Structure points lower from the last high; stay cautious below it",
        ),
    };

    let mut reasons = vec![first, format!("Price has moved {} since that pivot", fmt_pct(change))];
    match (
        last_two_rising(points, SwingKind::High),
        last_two_rising(points, SwingKind::Low),
    ) {
        (Some(true), Some(true)) => reasons.push("Higher highs and higher lows".to_string()),
        (Some(false), Some(false)) => reasons.push("Lower highs and lower lows".to_string()),
        (Some(_), Some(_)) => reasons.push("Swing structure is mixed".to_string()),
        _ => {}
    }

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("last_pivot", fmt_price(last.price))
            .with_metric("last_pivot_kind", last.kind)
            .with_metric("change_since_pivot_pct", fmt_pct(change))
            .with_metric("pivots", points.len()),
    )
}

/// 가장 가까운 지지/저항 존과의 거리.
pub fn support_resistance(zones: &[Zone], close: Price, p: &ClassifierParams) -> Option<Signal> {
    if zones.is_empty() {
        return None;
    }

    let support = zones
        .iter()
        .filter(|z| z.kind == ZoneKind::Support && z.price <= close)
        .max_by_key(|z| z.price);
    let resistance = zones
        .iter()
        .filter(|z| z.kind == ZoneKind::Resistance && z.price >= close)
        .min_by_key(|z| z.price);
    let has_resistance = zones.iter().any(|z| z.kind == ZoneKind::Resistance);
    let has_support = zones.iter().any(|z| z.kind == ZoneKind::Support);

    let distance = |zone: &Zone| {
        (close - zone.price)
            .abs()
            .safe_div(close)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    };
    let near = |zone: Option<&Zone>| {
        zone.and_then(distance)
            .is_some_and(|d| d <= p.level_proximity_pct)
    };

    let (kind, first, recommendation) = match (support, resistance) {
        (Some(s), Some(r)) if near(Some(s)) && near(Some(r)) => (
            SignalKind::Neutral,
            format!(
                "Price is squeezed between support {} and resistance {}",
                fmt_price(s.price),
                fmt_price(r.price)
            ),
            "Both levels are close; wait for a decisive break of either",
        ),
        (Some(s), _) if near(Some(s)) => (
            SignalKind::Bullish,
            format!(
                "Price is testing support at {} (strength {})",
                fmt_price(s.price),
                s.strength.round_display(2)
            ),
            "Support is nearby; consider longs with a stop just below the zone",
        ),
        (_, Some(r)) if near(Some(r)) => (
            SignalKind::Bearish,
            format!(
                "Price is testing resistance at {} (strength {})",
                fmt_price(r.price),
                r.strength.round_display(2)
            ),
            "Resistance overhead; consider trimming or wait for a breakout close",
        ),
        (_, None) if has_resistance => (
            SignalKind::Bullish,
            "Price trades above every detected resistance zone".to_string(),
            "Former resistance may now act as support",
        ),
        (None, _) if has_support => (
            SignalKind::Bearish,
            "Price trades below every detected support zone".to_string(),
            "Former support may now act as resistance",
        ),
        _ => (
            SignalKind::Neutral,
            "Price sits between support and resistance zones".to_string(),
            "No level in reach; wait for price to approach a zone",
        ),
    };

    let mut reasons = vec![first];
    let mut signal_metrics = Vec::new();
    if let Some(s) = support {
        if let Some(d) = distance(s) {
            reasons.push(format!("Nearest support {} is {} below", fmt_price(s.price), fmt_pct(d)));
        }
        signal_metrics.push(("nearest_support", fmt_price(s.price)));
    }
    if let Some(r) = resistance {
        if let Some(d) = distance(r) {
            reasons.push(format!("Nearest resistance {} is {} above", fmt_price(r.price), fmt_pct(d)));
        }
        signal_metrics.push(("nearest_resistance", fmt_price(r.price)));
    }

    let signal = compose(kind, reasons, recommendation).with_metric("zones", zones.len());
    Some(
        signal_metrics
            .into_iter()
            .fold(signal, |signal, (key, value)| signal.with_metric(key, value)),
    )
}

/// 최근 돌파 우선, 없으면 최근 지지선/저항선의 기울기.
pub fn trend_lines(analysis: &TrendLineAnalysis, series: &CandleSeries, p: &ClassifierParams) -> Option<Signal> {
    let n = series.len();
    let recent_breakout = analysis
        .breakouts
        .iter()
        .rev()
        .find(|b| b.index + p.breakout_lookback >= n);

    let support = analysis.support_lines().last();
    let resistance = analysis.resistance_lines().last();

    let mut reasons = Vec::new();
    let (kind, recommendation) = if let Some(breakout) = recent_breakout {
        let volume = breakout
            .volume_ratio
            .map(|r| format!(" on {}x average volume", r.round_display(2)))
            .unwrap_or_default();
        match breakout.direction {
            BreakoutDirection::Bullish => {
                reasons.push(format!(
                    "Bullish breakout {} candle(s) ago ({}){}",
                    n - 1 - breakout.index,
                    fmt_pct(breakout.change_pct),
                    volume
                ));
                (SignalKind::Bullish, "Fresh upside breakout; look for follow-through or a retest to buy")
            }
            BreakoutDirection::Bearish => {
                reasons.push(format!(
                    "Bearish breakdown {} candle(s) ago ({}){}",
                    n - 1 - breakout.index,
                    fmt_pct(breakout.change_pct),
                    volume
                ));
                (SignalKind::Bearish, "Fresh downside breakdown; avoid longs until price recovers")
            }
        }
    } else {
        match (support, resistance) {
            (Some(s), Some(r)) if s.is_rising() && r.is_rising() => {
                reasons.push("Support and resistance lines are both rising".to_string());
                (SignalKind::Bullish, "Ascending structure; buy near the support line")
            }
            (Some(s), Some(r)) if s.is_falling() && r.is_falling() => {
                reasons.push("Support and resistance lines are both falling".to_string());
                (SignalKind::Bearish, "Descending structure; sell near the resistance line")
            }
            (Some(_), Some(_)) => {
                reasons.push("Support and resistance lines are converging or diverging".to_string());
                (SignalKind::Neutral, "No directional structure; trade the range edges")
            }
            (Some(s), None) => {
                reasons.push(format!(
                    "Only a support line is drawn ({})",
                    if s.is_rising() { "rising" } else { "not rising" }
                ));
                (SignalKind::Neutral, "Watch the support line for a bounce or break")
            }
            (None, Some(r)) => {
                reasons.push(format!(
                    "Only a resistance line is drawn ({})",
                    if r.is_falling() { "falling" } else { "not falling" }
                ));
                (SignalKind::Neutral, "Watch the resistance line for a rejection or break")
            }
            (None, None) => {
                reasons.push("No recent breakout and no trend lines".to_string());
                (SignalKind::Neutral, "Wait for structure to form")
            }
        }
    };

    if let (Some(line), Some(last)) = (support, series.last()) {
        let projected = line.price_at(last.timestamp);
        if last.close < projected {
            reasons.push(format!("Price is below the projected support line at {}", fmt_price(projected)));
        }
    }
    if let (Some(line), Some(last)) = (resistance, series.last()) {
        let projected = line.price_at(last.timestamp);
        if last.close > projected {
            reasons.push(format!("Price is above the projected resistance line at {}", fmt_price(projected)));
        }
    }
    if let Some(channel) = analysis.channels.last() {
        reasons.push(format!(
            "{} parallel channel(s) detected, latest {} wide",
            analysis.channels.len(),
            fmt_pct(channel.width_pct)
        ));
    }

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("lines", analysis.lines.len())
            .with_metric("channels", analysis.channels.len())
            .with_metric("breakouts", analysis.breakouts.len()),
    )
}

/// 되돌림 구간 내 가격 위치.
pub fn fibonacci(fib: &FibonacciLevels, close: Price) -> Option<Signal> {
    if fib.high == fib.low {
        return Some(Signal::neutral(
            "The price range is flat; all Fibonacci levels coincide",
            "Wait for a range to develop",
        ));
    }

    let shallow = fib.retracement(dec!(0.382))?;
    let deep = fib.retracement(dec!(0.618))?;

    let (kind, first, recommendation) = if close >= shallow {
        (
            SignalKind::Bullish,
            format!("Price holds above the 38.2% retracement at {}", fmt_price(shallow)),
            "Shallow pullback within a strong range; dips toward 38.2% may be bought",
        )
    } else if close < deep {
        (
            SignalKind::Bearish,
            format!("Price is below the 61.8% retracement at {}", fmt_price(deep)),
            "Deep retracement; the prior advance is losing its structure",
        )
    } else {
        (
            SignalKind::Neutral,
            "Price is inside the 38.2% - 61.8% retracement zone".to_string(),
            "Decision zone; watch for a reaction at 50% and 61.8%",
        )
    };

    let mut reasons = vec![first];
    if let Some((upper, lower)) = fib.enclosing_retracements(close) {
        reasons.push(format!(
            "Price sits between the {} ({}) and {} ({}) levels",
            ratio_label(upper.ratio),
            fmt_price(upper.price),
            ratio_label(lower.ratio),
            fmt_price(lower.price)
        ));
    }

    Some(
        compose(kind, reasons, recommendation)
            .with_metric("high", fmt_price(fib.high))
            .with_metric("low", fmt_price(fib.low))
            .with_metric("level_38_2", fmt_price(shallow))
            .with_metric("level_61_8", fmt_price(deep)),
    )
}

/// 피봇 포인트 대비 종가 위치와 다음 목표 레벨.
pub fn pivots(pivots: &PivotSet, close: Price) -> Signal {
    let levels = pivots.levels();
    let above = levels
        .iter()
        .filter(|(_, price)| *price > close)
        .min_by_key(|(_, price)| *price);
    let below = levels
        .iter()
        .filter(|(_, price)| *price < close)
        .max_by_key(|(_, price)| *price);

    let (kind, first, recommendation) = match close.cmp(&pivots.pp) {
        Ordering::Greater => (
            SignalKind::Bullish,
            format!("Price is above the pivot point at {}", fmt_price(pivots.pp)),
            "Bias is up while price holds above PP",
        ),
        Ordering::Less => (
            SignalKind::Bearish,
            format!("Price is below the pivot point at {}", fmt_price(pivots.pp)),
            "Bias is down while price stays below PP",
        ),
        Ordering::Equal => (
            SignalKind::Neutral,
            format!("Price is exactly at the pivot point {}", fmt_price(pivots.pp)),
            "Wait for price to leave the pivot",
        ),
    };

    let mut reasons = vec![first];
    match above {
        Some((name, price)) => reasons.push(format!("Next level above is {} at {}", name, fmt_price(*price))),
        None => reasons.push("Price is beyond R3; extremely extended".to_string()),
    }
    match below {
        Some((name, price)) => reasons.push(format!("Next level below is {} at {}", name, fmt_price(*price))),
        None => reasons.push("Price is below S3; extremely extended".to_string()),
    }

    compose(kind, reasons, recommendation)
        .with_metric("pp", fmt_price(pivots.pp))
        .with_metric("r1", fmt_price(pivots.r1))
        .with_metric("s1", fmt_price(pivots.s1))
}

/// 관측된 가격 분포에서 종가의 백분위 위치.
pub fn range_position(stats: &RangeStatistics, close: Price) -> Signal {
    let pct = &stats.percentiles;

    let (kind, first, recommendation) = if pct.p95 == pct.p5 {
        (
            SignalKind::Neutral,
            "Observed prices are flat; no range position to evaluate".to_string(),
            "Wait for the range to widen",
        )
    } else if close >= pct.p95 {
        (
            SignalKind::Bearish,
            format!("Price is in the top 5% of its observed range (p95 {})", fmt_price(pct.p95)),
            "Stretched to the top of the range; expect supply",
        )
    } else if close <= pct.p5 {
        (
            SignalKind::Bullish,
            format!("Price is in the bottom 5% of its observed range (p5 {})", fmt_price(pct.p5)),
            "Stretched to the bottom of the range; expect demand",
        )
    } else if close >= pct.p75 {
        (
            SignalKind::Neutral,
            "Price is in the upper quartile of its range".to_string(),
            "Upper part of the range; favor patience over chasing",
        )
    } else if close <= pct.p25 {
        (
            SignalKind::Neutral,
            "Price is in the lower quartile of its range".to_string(),
            "Lower part of the range; favor patience over selling",
        )
    } else {
        (
            SignalKind::Neutral,
            format!("Price trades near the median of {}", fmt_price(pct.p50)),
            "Mid-range; no statistical edge",
        )
    };

    let mut reasons = vec![
        first,
        format!(
            "Average candle range is {} (std dev {})",
            fmt_price(stats.average_range),
            fmt_price(stats.std_dev)
        ),
    ];
    if let Some(active) = stats.active_ranges.first() {
        reasons.push(format!(
            "Most active price zone is {} - {} ({} candles)",
            fmt_price(active.low),
            fmt_price(active.high),
            active.candle_count
        ));
    }

    compose(kind, reasons, recommendation)
        .with_metric("p5", fmt_price(pct.p5))
        .with_metric("p50", fmt_price(pct.p50))
        .with_metric("p95", fmt_price(pct.p95))
        .with_metric("average_range", fmt_price(stats.average_range))
}
