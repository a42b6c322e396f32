//! # Coinchart Core
//!
//! 차트 분석 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들 및 검증된 캔들 시리즈
//! - 라인/밴드 오버레이 및 레벨(스윙 포인트, 존, 추세선) 타입
//! - 정성적 신호 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
