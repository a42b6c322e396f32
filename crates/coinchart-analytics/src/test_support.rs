//! 단위 테스트용 캔들 시리즈 픽스처.

use chrono::{DateTime, Duration, TimeZone, Utc};
use coinchart_core::{Candle, CandleSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 인덱스 `i`의 캔들 타임스탬프 (1시간 간격).
pub(crate) fn ts(i: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(i as i64)
}

/// (open, high, low, close, volume) 행으로 시리즈를 만듭니다.
pub(crate) fn series_from_ohlcv(rows: &[(Decimal, Decimal, Decimal, Decimal, Decimal)]) -> CandleSeries {
    let candles = rows
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c, v))| Candle::new(ts(i), o, h, l, c, v))
        .collect();
    CandleSeries::new(candles).unwrap()
}

/// (open, high, low, close) 행으로 시리즈를 만듭니다. 거래량은 1000.
pub(crate) fn series_from_ohlc(rows: &[(Decimal, Decimal, Decimal, Decimal)]) -> CandleSeries {
    let rows: Vec<_> = rows
        .iter()
        .map(|&(o, h, l, c)| (o, h, l, c, dec!(1000)))
        .collect();
    series_from_ohlcv(&rows)
}

/// 시가=고가=저가=종가인 캔들로 시리즈를 만듭니다.
pub(crate) fn series_from_closes(closes: &[Decimal]) -> CandleSeries {
    let rows: Vec<_> = closes.iter().map(|&c| (c, c, c, c)).collect();
    series_from_ohlc(&rows)
}

/// 가격이 일정한 시리즈.
pub(crate) fn constant_series(n: usize, price: Decimal) -> CandleSeries {
    series_from_closes(&vec![price; n])
}

/// 종가가 100부터 1씩 오르는 시리즈 (고가 = 종가 + 0.25, 저가 = 종가 − 0.75).
pub(crate) fn rising_series(n: usize) -> CandleSeries {
    let rows: Vec<_> = (0..n)
        .map(|i| {
            let close = dec!(100) + Decimal::from(i);
            (close - dec!(0.5), close + dec!(0.25), close - dec!(0.75), close)
        })
        .collect();
    series_from_ohlc(&rows)
}
