//! 밴드/채널 지표 규칙.
//!
//! 엔벨로프와 볼린저 밴드는 평균 회귀로 해석하고(상단 이탈 = 약세),
//! 켈트너 채널은 모멘텀 돌파로 해석합니다(상단 이탈 = 강세).

use coinchart_core::{Band, DecimalExt, Price, Signal, SignalKind};
use std::cmp::Ordering;

use super::{compose, fmt_pct, fmt_price, ClassifierParams};

fn middle_position(band: &Band, close: Price) -> String {
    match close.cmp(&band.middle) {
        Ordering::Greater => "Price trades in the upper half of the band".to_string(),
        Ordering::Less => "Price trades in the lower half of the band".to_string(),
        Ordering::Equal => "Price sits on the middle band".to_string(),
    }
}

fn squeeze_note(band: &Band, p: &ClassifierParams) -> Option<String> {
    let bandwidth = band.bandwidth_pct()?;
    (bandwidth < p.squeeze_bandwidth_pct).then(|| {
        format!(
            "Bands are squeezed (bandwidth {}); expect a volatility expansion",
            fmt_pct(bandwidth)
        )
    })
}

fn with_band_metrics(signal: Signal, band: &Band, close: Price) -> Signal {
    let mut signal = signal
        .with_metric("upper", fmt_price(band.upper))
        .with_metric("middle", fmt_price(band.middle))
        .with_metric("lower", fmt_price(band.lower));
    if let Some(bandwidth) = band.bandwidth_pct() {
        signal = signal.with_metric("bandwidth_pct", fmt_pct(bandwidth));
    }
    if let Some(percent_b) = band.percent_b(close) {
        signal = signal.with_metric("percent_b", percent_b.round_display(2));
    }
    signal
}

/// 평균 회귀형 밴드 (MA 엔벨로프, 볼린저 밴드).
pub fn mean_reversion(name: &str, bands: &[Band], close: Price, p: &ClassifierParams) -> Option<Signal> {
    let last = bands.last()?;

    let (kind, first, recommendation) = if close > last.upper {
        (
            SignalKind::Bearish,
            format!("Price closed above the upper {} at {}", name, fmt_price(last.upper)),
            "Overextended to the upside; consider taking profits as price tends to revert to the middle band",
        )
    } else if close < last.lower {
        (
            SignalKind::Bullish,
            format!("Price closed below the lower {} at {}", name, fmt_price(last.lower)),
            "Oversold against the band; look for a rebound toward the middle band",
        )
    } else {
        (
            SignalKind::Neutral,
            format!(
                "Price is inside the {} ({} - {})",
                name,
                fmt_price(last.lower),
                fmt_price(last.upper)
            ),
            "No band extreme; wait for a touch of either band",
        )
    };

    let mut reasons = vec![first, middle_position(last, close)];
    reasons.extend(squeeze_note(last, p));

    Some(with_band_metrics(compose(kind, reasons, recommendation), last, close))
}

/// 켈트너 채널 (모멘텀형).
pub fn keltner(bands: &[Band], close: Price, p: &ClassifierParams) -> Option<Signal> {
    let last = bands.last()?;

    let (kind, first, recommendation) = if close > last.upper {
        (
            SignalKind::Bullish,
            format!(
                "Price broke above the upper Keltner channel at {}; strong upside momentum",
                fmt_price(last.upper)
            ),
            "Momentum breakout; trail a stop at the middle line",
        )
    } else if close < last.lower {
        (
            SignalKind::Bearish,
            format!(
                "Price broke below the lower Keltner channel at {}; strong downside momentum",
                fmt_price(last.lower)
            ),
            "Momentum breakdown; avoid catching the falling move",
        )
    } else {
        (
            SignalKind::Neutral,
            "Price is contained within the Keltner channel".to_string(),
            "No momentum breakout; wait for a close outside the channel",
        )
    };

    let mut reasons = vec![first, middle_position(last, close)];
    if let Some(prev) = bands.len().checked_sub(2).and_then(|i| bands.get(i)) {
        match last.middle.cmp(&prev.middle) {
            Ordering::Greater => reasons.push("The channel midline is rising".to_string()),
            Ordering::Less => reasons.push("The channel midline is falling".to_string()),
            Ordering::Equal => {}
        }
    }
    reasons.extend(squeeze_note(last, p));

    Some(with_band_metrics(compose(kind, reasons, recommendation), last, close))
}
