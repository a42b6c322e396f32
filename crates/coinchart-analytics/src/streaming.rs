//! 증분 지표.
//!
//! 실시간으로 캔들이 하나씩 들어오는 환경에서 전체 시리즈를 다시 계산하지 않고
//! 최신 값을 갱신합니다. 같은 입력에 대해 배치 계산과 정확히 같은 값을 냅니다.

use coinchart_core::{Candle, Price};
use rust_decimal::Decimal;

use crate::indicators::{ema_multiplier, ensure_period, IndicatorResult};

/// 캔들 단위로 갱신되는 지표.
pub trait StreamingIndicator {
    /// 새 캔들을 반영하고 준비된 경우 최신 값을 반환합니다.
    fn update(&mut self, candle: &Candle) -> Option<Decimal>;

    /// 내부 상태를 초기화합니다.
    fn reset(&mut self);

    /// 현재 값 (준비 전이면 `None`).
    fn current(&self) -> Option<Decimal>;
}

/// 증분 EMA.
///
/// 첫 종가로 시드하고 `period`개 캔들이 들어온 뒤부터 값을 보고합니다.
#[derive(Debug, Clone)]
pub struct StreamingEma {
    period: usize,
    multiplier: Decimal,
    value: Option<Decimal>,
    count: usize,
}

impl StreamingEma {
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("EMA 기간", period)?;
        Ok(Self {
            period,
            multiplier: ema_multiplier(period),
            value: None,
            count: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// 종가 하나를 반영합니다.
    pub fn update_price(&mut self, price: Price) -> Option<Decimal> {
        let next = match self.value {
            None => price,
            Some(prev) => prev + (price - prev) * self.multiplier,
        };
        self.value = Some(next);
        self.count += 1;
        self.current()
    }
}

impl StreamingIndicator for StreamingEma {
    fn update(&mut self, candle: &Candle) -> Option<Decimal> {
        self.update_price(candle.close)
    }

    fn reset(&mut self) {
        self.value = None;
        self.count = 0;
    }

    fn current(&self) -> Option<Decimal> {
        if self.count >= self.period {
            self.value
        } else {
            None
        }
    }
}

/// 증분 Wilder ATR.
#[derive(Debug, Clone)]
pub struct StreamingAtr {
    period: usize,
    prev_close: Option<Price>,
    /// 첫 ATR 전까지의 TR 합
    warmup_sum: Decimal,
    count: usize,
    value: Option<Decimal>,
}

impl StreamingAtr {
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("ATR 기간", period)?;
        Ok(Self {
            period,
            prev_close: None,
            warmup_sum: Decimal::ZERO,
            count: 0,
            value: None,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl StreamingIndicator for StreamingAtr {
    fn update(&mut self, candle: &Candle) -> Option<Decimal> {
        let tr = candle.true_range(self.prev_close);
        self.prev_close = Some(candle.close);
        self.count += 1;

        let p = Decimal::from(self.period);
        self.value = match self.value {
            Some(atr) => Some((atr * (p - Decimal::ONE) + tr) / p),
            None => {
                self.warmup_sum += tr;
                (self.count == self.period).then(|| self.warmup_sum / p)
            }
        };
        self.value
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.warmup_sum = Decimal::ZERO;
        self.count = 0;
        self.value = None;
    }

    fn current(&self) -> Option<Decimal> {
        self.value
    }
}
