//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands: SMA ± k·σ
//! - ATR: Wilder 평활 평균 실제 범위
//! - Keltner Channel: EMA ± k·ATR

use coinchart_core::{Band, BollingerConfig, CandleSeries, KeltnerConfig, LinePoint};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    checked_add, checked_mul, checked_sub, ema_values, ensure_non_negative, ensure_period, mean,
    population_std_dev, wilder_atr, IndicatorResult,
};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

impl From<&BollingerConfig> for BollingerParams {
    fn from(config: &BollingerConfig) -> Self {
        Self {
            period: config.period,
            std_dev_multiplier: config.std_dev_multiplier,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 켈트너 채널 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeltnerParams {
    /// EMA/ATR 기간 (기본: 20).
    pub period: usize,
    /// ATR 배수 (기본: 2.0).
    pub atr_multiplier: Decimal,
}

impl Default for KeltnerParams {
    fn default() -> Self {
        Self {
            period: 20,
            atr_multiplier: dec!(2.0),
        }
    }
}

impl From<&KeltnerConfig> for KeltnerParams {
    fn from(config: &KeltnerConfig) -> Self {
        Self {
            period: config.period,
            atr_multiplier: config.atr_multiplier,
        }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 상단 밴드 = MA + (k × σ)
    /// 중간 밴드 = MA (단순 이동평균)
    /// 하단 밴드 = MA - (k × σ)
    ///
    /// σ는 같은 윈도우의 모집단 표준편차입니다. σ = 0이면 세 밴드가 중간선에 겹칩니다.
    ///
    /// # 반환
    /// 인덱스 `period - 1`부터의 밴드 (길이 `n - period + 1`)
    pub fn bollinger_bands(
        &self,
        series: &CandleSeries,
        params: BollingerParams,
    ) -> IndicatorResult<Vec<Band>> {
        ensure_period("볼린저 기간", params.period)?;
        ensure_non_negative("표준편차 배수", params.std_dev_multiplier)?;

        let period = params.period;
        let closes = series.closes();
        if closes.len() < period {
            return Ok(Vec::new());
        }

        closes
            .windows(period)
            .zip(series.iter().skip(period - 1))
            .map(|(window, candle)| -> IndicatorResult<Band> {
                let ma = mean(window)?;
                let sigma = population_std_dev(window, ma)?;
                let deviation = checked_mul(params.std_dev_multiplier, sigma, "볼린저 밴드")?;
                Ok(Band::new(
                    candle.timestamp,
                    checked_add(ma, deviation, "볼린저 밴드")?,
                    ma,
                    checked_sub(ma, deviation, "볼린저 밴드")?,
                ))
            })
            .collect()
    }

    /// ATR (Average True Range) 계산.
    ///
    /// True Range = max(고가 - 저가, |고가 - 전일종가|, |저가 - 전일종가|), 첫 캔들은 고가 - 저가.
    /// 첫 ATR은 처음 `period`개 TR의 평균이고 이후 Wilder 평활을 적용합니다.
    ///
    /// # 반환
    /// 인덱스 `period - 1`부터의 ATR 값
    pub fn atr(&self, series: &CandleSeries, params: AtrParams) -> IndicatorResult<Vec<LinePoint>> {
        ensure_period("ATR 기간", params.period)?;

        Ok(series
            .iter()
            .zip(wilder_atr(series.candles(), params.period)?)
            .filter_map(|(candle, atr)| atr.map(|v| LinePoint::new(candle.timestamp, v)))
            .collect())
    }

    /// 켈트너 채널 계산.
    ///
    /// 중간선 = EMA(period), 상단/하단 = 중간선 ± (배수 × ATR(period)).
    /// ATR이 준비된 인덱스 `period - 1`부터 출력합니다.
    pub fn keltner_channel(
        &self,
        series: &CandleSeries,
        params: KeltnerParams,
    ) -> IndicatorResult<Vec<Band>> {
        ensure_period("켈트너 기간", params.period)?;
        ensure_non_negative("ATR 배수", params.atr_multiplier)?;

        let ema = ema_values(&series.closes(), params.period)?;
        if ema.is_empty() {
            return Ok(Vec::new());
        }
        let atr = wilder_atr(series.candles(), params.period)?;

        series
            .iter()
            .zip(ema)
            .zip(atr)
            .filter_map(|((candle, middle), atr)| {
                atr.map(|atr| -> IndicatorResult<Band> {
                    let half_width = checked_mul(params.atr_multiplier, atr, "켈트너 채널")?;
                    Ok(Band::new(
                        candle.timestamp,
                        checked_add(middle, half_width, "켈트너 채널")?,
                        middle,
                        checked_sub(middle, half_width, "켈트너 채널")?,
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;
    use crate::test_support::{constant_series, series_from_ohlc};

    fn sample_series() -> CandleSeries {
        series_from_ohlc(&[
            (dec!(100), dec!(105), dec!(98), dec!(102)),
            (dec!(102), dec!(108), dec!(101), dec!(107)),
            (dec!(107), dec!(110), dec!(104), dec!(105)),
            (dec!(105), dec!(106), dec!(99), dec!(100)),
            (dec!(100), dec!(104), dec!(97), dec!(103)),
            (dec!(103), dec!(109), dec!(102), dec!(108)),
        ])
    }

    #[test]
    fn test_bollinger_bands() {
        let series = sample_series();
        let bands = VolatilityIndicators::new()
            .bollinger_bands(&series, BollingerParams { period: 3, std_dev_multiplier: dec!(2) })
            .unwrap();

        assert_eq!(bands.len(), 4);
        // 첫 윈도우: 102, 107, 105 -> 평균 314/3
        assert_eq!(bands[0].middle, dec!(314) / dec!(3));
        for band in &bands {
            assert!(band.is_ordered());
        }
    }

    #[test]
    fn test_bollinger_zero_variance_collapses() {
        let series = constant_series(25, dec!(50));
        let bands = VolatilityIndicators::new()
            .bollinger_bands(&series, BollingerParams::default())
            .unwrap();

        assert_eq!(bands.len(), 6);
        for band in bands {
            assert_eq!(band.upper, dec!(50));
            assert_eq!(band.lower, dec!(50));
        }
    }

    #[test]
    fn test_bollinger_rejects_negative_multiplier() {
        let series = sample_series();
        let err = VolatilityIndicators::new()
            .bollinger_bands(&series, BollingerParams { period: 3, std_dev_multiplier: dec!(-1) })
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[test]
    fn test_atr_calculation() {
        let series = sample_series();
        let atr = VolatilityIndicators::new()
            .atr(&series, AtrParams { period: 3 })
            .unwrap();

        // TR: 7, 7 (108-101, |108-102|=6, |101-102|=1), 6, 7 (106-99, |99-105|=6), 7, 7 (109-102, |109-103|=6)
        assert_eq!(atr.len(), 4);
        assert_eq!(atr[0].value, dec!(20) / dec!(3));
        assert_eq!(atr[0].timestamp, series.get(2).unwrap().timestamp);
        // Wilder: (20/3 * 2 + 7) / 3
        assert_eq!(atr[1].value, (dec!(20) / dec!(3) * dec!(2) + dec!(7)) / dec!(3));
    }

    #[test]
    fn test_keltner_channel() {
        let series = sample_series();
        let bands = VolatilityIndicators::new()
            .keltner_channel(&series, KeltnerParams { period: 3, atr_multiplier: dec!(2) })
            .unwrap();

        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].timestamp, series.get(2).unwrap().timestamp);
        for band in &bands {
            assert!(band.is_ordered());
        }
    }

    #[test]
    fn test_insufficient_data_returns_empty() {
        let series = constant_series(5, dec!(100));
        let vol = VolatilityIndicators::new();
        assert!(vol.bollinger_bands(&series, BollingerParams::default()).unwrap().is_empty());
        assert!(vol.keltner_channel(&series, KeltnerParams::default()).unwrap().is_empty());
        assert!(vol.atr(&series, AtrParams::default()).unwrap().is_empty());
    }
}
