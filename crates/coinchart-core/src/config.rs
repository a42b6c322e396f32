//! 설정 관리.
//!
//! 애플리케이션 설정(로깅 + 분석 파라미터)을 정의하고 로드합니다.
//! 로드 순서: 내장 기본값 -> TOML 파일 -> `COINCHART__*` 환경 변수.

use crate::error::{ChartError, ChartResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 분석 파라미터
    pub analysis: AnalysisConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 한 번의 분석 패스에 사용되는 모든 파라미터.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub moving_average: MovingAverageConfig,
    pub envelope: EnvelopeConfig,
    pub bollinger: BollingerConfig,
    pub keltner: KeltnerConfig,
    pub supertrend: SuperTrendConfig,
    pub parabolic_sar: ParabolicSarConfig,
    pub ichimoku: IchimokuConfig,
    pub rsi: RsiConfig,
    pub zigzag: ZigZagConfig,
    pub swing: SwingConfig,
    pub breakout: BreakoutConfig,
    pub channel: ChannelConfig,
    pub classifier: ClassifierConfig,
}

/// 이동평균 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MovingAverageConfig {
    /// SMA/EMA/WMA/HMA에 사용할 기본 기간
    pub period: usize,
    /// 추세 판단용 중기 기간
    pub medium_period: usize,
    /// 추세 판단용 장기 기간
    pub long_period: usize,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            period: 20,
            medium_period: 50,
            long_period: 200,
        }
    }
}

/// 이동평균 엔벨로프 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub period: usize,
    /// SMA 대비 편차 (%)
    pub deviation_pct: Decimal,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            period: 20,
            deviation_pct: dec!(2.5),
        }
    }
}

/// 볼린저 밴드 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub period: usize,
    /// 표준편차 배수
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2),
        }
    }
}

/// 켈트너 채널 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeltnerConfig {
    pub period: usize,
    /// ATR 배수
    pub atr_multiplier: Decimal,
}

impl Default for KeltnerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            atr_multiplier: dec!(2),
        }
    }
}

/// SuperTrend 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SuperTrendConfig {
    pub atr_period: usize,
    pub multiplier: Decimal,
}

impl Default for SuperTrendConfig {
    fn default() -> Self {
        Self {
            atr_period: 10,
            multiplier: dec!(3),
        }
    }
}

/// Parabolic SAR 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParabolicSarConfig {
    pub initial_af: Decimal,
    pub af_step: Decimal,
    pub max_af: Decimal,
}

impl Default for ParabolicSarConfig {
    fn default() -> Self {
        Self {
            initial_af: dec!(0.02),
            af_step: dec!(0.02),
            max_af: dec!(0.2),
        }
    }
}

/// 일목균형표 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IchimokuConfig {
    pub tenkan_period: usize,
    pub kijun_period: usize,
    pub senkou_b_period: usize,
    pub displacement: usize,
}

impl Default for IchimokuConfig {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            displacement: 26,
        }
    }
}

/// RSI 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// ZigZag 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZigZagConfig {
    /// 반전 확정에 필요한 되돌림 (%)
    pub deviation_pct: Decimal,
}

impl Default for ZigZagConfig {
    fn default() -> Self {
        Self {
            deviation_pct: dec!(3.5),
        }
    }
}

/// 스윙 포인트 탐지 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwingConfig {
    /// 좌우 비교 캔들 수
    pub sensitivity: usize,
    /// 터치로 인정하는 가격 근접도 (%)
    pub touch_threshold_pct: Decimal,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            sensitivity: 10,
            touch_threshold_pct: dec!(0.3),
        }
    }
}

/// 돌파 탐지 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// 평균 거래량 계산 구간
    pub lookback: usize,
    /// 평균 대비 거래량 배수
    pub volume_multiplier: Decimal,
    /// 직전 종가 대비 최소 변동 (%)
    pub min_move_pct: Decimal,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            volume_multiplier: dec!(1.5),
            min_move_pct: dec!(2),
        }
    }
}

/// 평행 채널 탐지 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// 허용되는 기울기 차이 (%)
    pub slope_tolerance_pct: Decimal,
    /// 최소 채널 폭 (지지선 가격 대비 %)
    pub min_width_pct: Decimal,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            slope_tolerance_pct: dec!(10),
            min_width_pct: dec!(1),
        }
    }
}

/// 신호 분류기 임계값.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// 추세선과의 거리가 이 값(%)을 넘으면 과도한 확장으로 표시
    pub extension_threshold_pct: Decimal,
    /// 레벨 근접 판단 거리 (%)
    pub level_proximity_pct: Decimal,
    /// 스퀴즈로 판단하는 밴드 폭 (%)
    pub squeeze_bandwidth_pct: Decimal,
    pub rsi_overbought: Decimal,
    pub rsi_oversold: Decimal,
    /// 최근 돌파로 간주하는 캔들 수
    pub breakout_lookback: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extension_threshold_pct: dec!(5),
            level_proximity_pct: dec!(1),
            squeeze_bandwidth_pct: dec!(4),
            rsi_overbought: dec!(70),
            rsi_oversold: dec!(30),
            breakout_lookback: 5,
        }
    }
}

impl AnalysisConfig {
    /// 파라미터 유효성을 검사합니다.
    ///
    /// 0인 기간과 음수 배수/퍼센트를 거부합니다.
    pub fn validate(&self) -> ChartResult<()> {
        let periods = [
            ("moving_average.period", self.moving_average.period),
            ("moving_average.medium_period", self.moving_average.medium_period),
            ("moving_average.long_period", self.moving_average.long_period),
            ("envelope.period", self.envelope.period),
            ("bollinger.period", self.bollinger.period),
            ("keltner.period", self.keltner.period),
            ("supertrend.atr_period", self.supertrend.atr_period),
            ("ichimoku.tenkan_period", self.ichimoku.tenkan_period),
            ("ichimoku.kijun_period", self.ichimoku.kijun_period),
            ("ichimoku.senkou_b_period", self.ichimoku.senkou_b_period),
            ("ichimoku.displacement", self.ichimoku.displacement),
            ("rsi.period", self.rsi.period),
            ("swing.sensitivity", self.swing.sensitivity),
            ("breakout.lookback", self.breakout.lookback),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ChartError::Config(format!("{}는 0보다 커야 합니다", name)));
        }

        let non_negative = [
            ("envelope.deviation_pct", self.envelope.deviation_pct),
            ("bollinger.std_dev_multiplier", self.bollinger.std_dev_multiplier),
            ("keltner.atr_multiplier", self.keltner.atr_multiplier),
            ("supertrend.multiplier", self.supertrend.multiplier),
            ("parabolic_sar.initial_af", self.parabolic_sar.initial_af),
            ("parabolic_sar.af_step", self.parabolic_sar.af_step),
            ("parabolic_sar.max_af", self.parabolic_sar.max_af),
            ("zigzag.deviation_pct", self.zigzag.deviation_pct),
            ("swing.touch_threshold_pct", self.swing.touch_threshold_pct),
            ("breakout.volume_multiplier", self.breakout.volume_multiplier),
            ("breakout.min_move_pct", self.breakout.min_move_pct),
            ("channel.slope_tolerance_pct", self.channel.slope_tolerance_pct),
            ("channel.min_width_pct", self.channel.min_width_pct),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, v)| v.is_sign_negative() && !v.is_zero()) {
            return Err(ChartError::Config(format!("{}는 음수일 수 없습니다", name)));
        }

        if self.classifier.rsi_oversold >= self.classifier.rsi_overbought {
            return Err(ChartError::Config(
                "classifier.rsi_oversold는 rsi_overbought보다 작아야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ChartResult<Self> {
        Self::build(config::Config::builder().add_source(config::File::from(path.as_ref())))
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 내장 기본값과 환경 변수만 사용합니다.
    pub fn load_default() -> ChartResult<Self> {
        Self::build(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false)),
        )
    }

    /// 환경 변수만으로 설정을 로드합니다.
    pub fn from_env() -> ChartResult<Self> {
        Self::build(config::Config::builder())
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> ChartResult<Self> {
        let settings = builder
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("COINCHART")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// TOML 문자열로 직렬화합니다.
    pub fn to_toml(&self) -> ChartResult<String> {
        toml::to_string_pretty(self).map_err(|e| ChartError::Serialization(e.to_string()))
    }
}
