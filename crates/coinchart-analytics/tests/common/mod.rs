//! 통합 테스트 공용 픽스처.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use coinchart_core::{Candle, CandleSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 1시간 간격 타임스탬프.
pub fn ts(i: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(i as i64)
}

/// 종가만으로 시리즈를 만듭니다 (시가=고가=저가=종가, 거래량 1000).
pub fn series_from_closes(closes: &[Decimal]) -> CandleSeries {
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle::new(ts(i), c, c, c, c, dec!(1000)))
        .collect();
    CandleSeries::new(candles).unwrap()
}

/// 종가가 100부터 1씩 오르는 시리즈. 거래량은 일정.
pub fn rising_series(n: usize) -> CandleSeries {
    let candles = (0..n)
        .map(|i| {
            let close = dec!(100) + Decimal::from(i);
            Candle::new(
                ts(i),
                close - dec!(0.5),
                close + dec!(0.25),
                close - dec!(0.75),
                close,
                dec!(1000),
            )
        })
        .collect();
    CandleSeries::new(candles).unwrap()
}

/// 꼭짓점 사이를 직선으로 잇는 지그재그 종가 경로.
///
/// `legs`는 (꼭짓점 가격, 이전 꼭짓점에서 걸리는 캔들 수) 목록입니다.
pub fn zigzag_path(start: Decimal, legs: &[(Decimal, usize)]) -> Vec<Decimal> {
    let mut closes = vec![start];
    let mut from = start;
    for &(to, steps) in legs {
        for step in 1..=steps {
            closes.push(from + (to - from) * Decimal::from(step) / Decimal::from(steps));
        }
        from = to;
    }
    closes
}
