//! 차트 분석을 위한 도메인 모델.

mod candle;
mod levels;
mod overlay;
mod series;
mod signal;

pub use candle::*;
pub use levels::*;
pub use overlay::*;
pub use series::*;
pub use signal::*;
