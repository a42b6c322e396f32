//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 캔들 파일 로딩 (JSON/CSV)
//! - 분석 실행 및 보고서 출력 (table/json)
//! - 설정 확인 도구

pub mod commands;

pub use commands::*;
