//! 지표 간에 공유되는 슬라이스 기반 계산 헬퍼.
//!
//! 모든 누적 연산은 checked 연산을 사용하며, `Decimal` 범위를 넘으면
//! `IndicatorError::CalculationError`를 반환합니다.

use coinchart_core::{Candle, DecimalExt};
use rust_decimal::Decimal;

use super::{IndicatorError, IndicatorResult};

fn overflow(operation: &str) -> IndicatorError {
    IndicatorError::CalculationError(format!("{} 계산 중 Decimal 범위를 초과했습니다", operation))
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, operation: &str) -> IndicatorResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(operation))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, operation: &str) -> IndicatorResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(operation))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal, operation: &str) -> IndicatorResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(operation))
}

fn checked_sum(values: &[Decimal], operation: &str) -> IndicatorResult<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, *v, operation))
}

/// 산술 평균. 빈 슬라이스는 0.
pub(crate) fn mean(values: &[Decimal]) -> IndicatorResult<Decimal> {
    if values.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Ok(checked_sum(values, "평균")? / Decimal::from(values.len()))
}

/// 모집단 표준편차 (N으로 나눔).
pub(crate) fn population_std_dev(values: &[Decimal], mean: Decimal) -> IndicatorResult<Decimal> {
    if values.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let mut squares = Decimal::ZERO;
    for v in values {
        let diff = checked_sub(*v, mean, "표준편차")?;
        squares = checked_add(squares, checked_mul(diff, diff, "표준편차")?, "표준편차")?;
    }
    Ok((squares / Decimal::from(values.len())).sqrt_or_zero())
}

/// 단순 이동평균. 결과 길이는 `n - period + 1` (부족하면 빈 벡터).
pub(crate) fn sma_values(values: &[Decimal], period: usize) -> IndicatorResult<Vec<Decimal>> {
    if period == 0 || values.len() < period {
        return Ok(Vec::new());
    }
    let divisor = Decimal::from(period);
    let mut sum = checked_sum(&values[..period], "SMA")?;
    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(sum / divisor);
    for i in period..values.len() {
        sum = checked_add(sum, checked_sub(values[i], values[i - period], "SMA")?, "SMA")?;
        result.push(sum / divisor);
    }
    Ok(result)
}

/// 가중 이동평균. 가장 최근 값의 가중치가 `period`, 가장 오래된 값이 1.
pub(crate) fn wma_values(values: &[Decimal], period: usize) -> IndicatorResult<Vec<Decimal>> {
    if period == 0 || values.len() < period {
        return Ok(Vec::new());
    }
    let weight_sum = Decimal::from(period * (period + 1) / 2);
    values
        .windows(period)
        .map(|window| -> IndicatorResult<Decimal> {
            let mut weighted = Decimal::ZERO;
            for (i, v) in window.iter().enumerate() {
                let term = checked_mul(*v, Decimal::from(i + 1), "WMA")?;
                weighted = checked_add(weighted, term, "WMA")?;
            }
            Ok(weighted / weight_sum)
        })
        .collect()
}

/// 지수 이동평균. 첫 값으로 시드하며 결과 길이는 입력과 같습니다.
pub(crate) fn ema_values(values: &[Decimal], period: usize) -> IndicatorResult<Vec<Decimal>> {
    if period == 0 || values.len() < period {
        return Ok(Vec::new());
    }
    let k = ema_multiplier(period);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);
    for value in &values[1..] {
        // prev + k(v - prev): 값이 같으면 반올림 없이 그대로 유지
        let step = checked_mul(checked_sub(*value, prev, "EMA")?, k, "EMA")?;
        prev = checked_add(prev, step, "EMA")?;
        result.push(prev);
    }
    Ok(result)
}

/// EMA 평활 계수 `2 / (period + 1)`.
pub(crate) fn ema_multiplier(period: usize) -> Decimal {
    Decimal::TWO / Decimal::from(period + 1)
}

/// Wilder 평활 ATR.
///
/// `TR[0] = high - low`, 첫 ATR은 처음 `period`개 TR의 평균(인덱스 `period - 1`),
/// 이후 `atr[i] = (atr[i-1] * (period - 1) + tr[i]) / period`.
/// 결과 길이는 입력과 같고 준비 전 구간은 `None`.
pub(crate) fn wilder_atr(candles: &[Candle], period: usize) -> IndicatorResult<Vec<Option<Decimal>>> {
    let n = candles.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return Ok(result);
    }

    let true_ranges: Vec<Decimal> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| c.true_range(i.checked_sub(1).map(|p| candles[p].close)))
        .collect();

    let p = Decimal::from(period);
    let mut atr = checked_sum(&true_ranges[..period], "ATR")? / p;
    result[period - 1] = Some(atr);
    for i in period..n {
        let carried = checked_mul(atr, p - Decimal::ONE, "ATR")?;
        atr = checked_add(carried, true_ranges[i], "ATR")? / p;
        result[i] = Some(atr);
    }
    Ok(result)
}
