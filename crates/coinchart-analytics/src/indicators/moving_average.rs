//! 이동평균 계열 지표.
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - WMA (Weighted Moving Average)
//! - Hull MA: `WMA(2 × WMA(n/2) − WMA(n), floor(√n))`
//! - MA Envelope: SMA ± 고정 비율

use coinchart_core::{Band, CandleSeries, DecimalExt, EnvelopeConfig, LinePoint, Percentage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    checked_mul, checked_sub, ema_values, ensure_non_negative, ensure_period, sma_values,
    wma_values, IndicatorResult,
};

/// Hull MA에 필요한 최소 기간.
pub const HULL_MIN_PERIOD: usize = 4;

/// 이동평균 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverageKind {
    Sma,
    Ema,
    Wma,
    Hull,
}

impl std::fmt::Display for MovingAverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovingAverageKind::Sma => write!(f, "SMA"),
            MovingAverageKind::Ema => write!(f, "EMA"),
            MovingAverageKind::Wma => write!(f, "WMA"),
            MovingAverageKind::Hull => write!(f, "HMA"),
        }
    }
}

/// 같은 종류의 이동평균을 여러 기간으로 계산한 결과 (단기/중기/장기).
///
/// 데이터가 부족한 기간도 빈 라인으로 포함됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageSet {
    pub kind: MovingAverageKind,
    /// 기간 → 라인
    pub lines: BTreeMap<usize, Vec<LinePoint>>,
}

impl MovingAverageSet {
    /// 주어진 기간의 라인.
    pub fn line(&self, period: usize) -> Option<&[LinePoint]> {
        self.lines.get(&period).map(Vec::as_slice)
    }

    /// 모든 라인의 포인트 수 합계.
    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// MA Envelope 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// SMA 기간 (기본: 20).
    pub period: usize,
    /// SMA 대비 편차 % (기본: 2.5).
    pub deviation_pct: Percentage,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            period: 20,
            deviation_pct: dec!(2.5),
        }
    }
}

impl From<&EnvelopeConfig> for EnvelopeParams {
    fn from(config: &EnvelopeConfig) -> Self {
        Self {
            period: config.period,
            deviation_pct: config.deviation_pct,
        }
    }
}

/// 이동평균 계산기.
#[derive(Debug, Default)]
pub struct MovingAverages;

impl MovingAverages {
    /// 새로운 이동평균 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 종류별 이동평균을 계산합니다.
    ///
    /// # 인자
    /// * `series` - 캔들 시리즈 (종가 사용)
    /// * `period` - 기간
    /// * `kind` - 이동평균 종류
    ///
    /// # 반환
    /// 값이 정의된 시점의 라인 포인트. 데이터가 `period`보다 적으면 빈 벡터.
    pub fn calculate(
        &self,
        series: &CandleSeries,
        period: usize,
        kind: MovingAverageKind,
    ) -> IndicatorResult<Vec<LinePoint>> {
        match kind {
            MovingAverageKind::Sma => self.sma(series, period),
            MovingAverageKind::Ema => self.ema(series, period),
            MovingAverageKind::Wma => self.wma(series, period),
            MovingAverageKind::Hull => self.hull(series, period),
        }
    }

    /// 여러 기간의 이동평균을 한 번에 계산합니다. 중복 기간은 한 번만 계산됩니다.
    pub fn calculate_periods(
        &self,
        series: &CandleSeries,
        periods: &[usize],
        kind: MovingAverageKind,
    ) -> IndicatorResult<MovingAverageSet> {
        let mut lines = BTreeMap::new();
        for &period in periods {
            if !lines.contains_key(&period) {
                lines.insert(period, self.calculate(series, period, kind)?);
            }
        }
        Ok(MovingAverageSet { kind, lines })
    }

    /// 단순 이동평균. 결과 길이는 `n - period + 1`.
    pub fn sma(&self, series: &CandleSeries, period: usize) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("SMA 기간", period)?;
        let values = sma_values(&series.closes(), period)?;
        Ok(align_tail(series, values))
    }

    /// 지수 이동평균. `k = 2/(period+1)`, 첫 종가로 시드하며 결과 길이는 `n`.
    pub fn ema(&self, series: &CandleSeries, period: usize) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("EMA 기간", period)?;
        let values = ema_values(&series.closes(), period)?;
        Ok(align_tail(series, values))
    }

    /// 가중 이동평균. 가중치 `period..1` (최근 값이 가장 큼).
    pub fn wma(&self, series: &CandleSeries, period: usize) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("WMA 기간", period)?;
        let values = wma_values(&series.closes(), period)?;
        Ok(align_tail(series, values))
    }

    /// Hull 이동평균.
    ///
    /// `period < 4`이면 빈 결과를 반환합니다 (에러 아님).
    pub fn hull(&self, series: &CandleSeries, period: usize) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("HMA 기간", period)?;
        if period < HULL_MIN_PERIOD {
            return Ok(Vec::new());
        }

        let closes = series.closes();
        let half = period / 2;
        let sqrt_period = (period as f64).sqrt().floor() as usize;

        let wma_half = wma_values(&closes, half)?;
        let wma_full = wma_values(&closes, period)?;
        if wma_full.is_empty() {
            return Ok(Vec::new());
        }

        // 두 WMA를 마지막 인덱스 기준으로 정렬: wma_full[j]는 캔들 j + period - 1
        let offset = period - half;
        let raw = wma_full
            .iter()
            .enumerate()
            .map(|(j, full)| {
                let doubled = checked_mul(Decimal::TWO, wma_half[j + offset], "HMA")?;
                checked_sub(doubled, *full, "HMA")
            })
            .collect::<IndicatorResult<Vec<Decimal>>>()?;

        let hull = wma_values(&raw, sqrt_period)?;
        Ok(align_tail(series, hull))
    }

    /// MA Envelope: SMA ± |SMA| × deviation%.
    pub fn envelope(&self, series: &CandleSeries, params: EnvelopeParams) -> IndicatorResult<Vec<Band>> {
        ensure_period("Envelope 기간", params.period)?;
        ensure_non_negative("Envelope 편차", params.deviation_pct)?;

        let sma = self.sma(series, params.period)?;
        Ok(sma
            .into_iter()
            .map(|p| {
                let offset = p.value.abs().pct_of(params.deviation_pct);
                Band::new(p.timestamp, p.value + offset, p.value, p.value - offset)
            })
            .collect())
    }
}

/// 종류별 이동평균을 계산하는 편의 함수.
pub fn moving_average(
    series: &CandleSeries,
    period: usize,
    kind: MovingAverageKind,
) -> IndicatorResult<Vec<LinePoint>> {
    MovingAverages::new().calculate(series, period, kind)
}

/// 값 목록을 시리즈의 마지막 캔들에 맞춰 타임스탬프와 결합합니다.
fn align_tail(series: &CandleSeries, values: Vec<Decimal>) -> Vec<LinePoint> {
    let skip = series.len().saturating_sub(values.len());
    series
        .iter()
        .skip(skip)
        .zip(values)
        .map(|(candle, value)| LinePoint::new(candle.timestamp, value))
        .collect()
}
