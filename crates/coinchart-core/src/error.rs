//! 차트 분석 시스템의 에러 타입.
//!
//! 입력 검증 에러(`ValidationError`)와 애플리케이션 수준 에러(`ChartError`)를 정의합니다.

use thiserror::Error;

/// 캔들 시리즈 검증 에러.
///
/// 모든 변형은 문제가 된 캔들의 인덱스를 포함합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 고가/저가가 시가·종가를 감싸지 않음
    #[error("캔들 {index}: OHLC 관계가 올바르지 않습니다 (high >= max(open, close), low <= min(open, close))")]
    InvalidOhlc { index: usize },

    /// 타임스탬프가 직전 캔들보다 크지 않음 (중복 포함)
    #[error("캔들 {index}: 타임스탬프가 순증가하지 않습니다")]
    NonMonotonicTimestamp { index: usize },

    /// 음수 거래량
    #[error("캔들 {index}: 거래량이 음수입니다")]
    NegativeVolume { index: usize },
}

impl ValidationError {
    /// 문제가 된 캔들의 인덱스를 반환합니다.
    pub fn index(&self) -> usize {
        match self {
            ValidationError::InvalidOhlc { index }
            | ValidationError::NonMonotonicTimestamp { index }
            | ValidationError::NegativeVolume { index } => *index,
        }
    }
}

/// 핵심 차트 분석 에러.
#[derive(Debug, Error)]
pub enum ChartError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 로딩 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 입력 검증 실패
    #[error("검증 에러: {0}")]
    Validation(#[from] ValidationError),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 차트 분석 작업을 위한 Result 타입.
pub type ChartResult<T> = Result<T, ChartError>;

impl ChartError {
    /// 사용자 입력 문제로 인한 에러인지 확인합니다.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ChartError::Validation(_) | ChartError::InvalidInput(_) | ChartError::Data(_)
        )
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ChartError {
    fn from(err: config::ConfigError) -> Self {
        ChartError::Config(err.to_string())
    }
}
