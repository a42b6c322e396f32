//! 정밀한 가격 계산을 위한 Decimal 유틸리티.
//!
//! 지표 계산에 필요한 가격 타입 별칭과 안전한 나눗셈/퍼센트 헬퍼를 제공합니다.

use rust_decimal::{Decimal, MathematicalOps};

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (1.5 = 1.5%).
pub type Percentage = Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 0으로 나누는 경우 `None`을 반환하는 나눗셈.
    fn safe_div(&self, divisor: Decimal) -> Option<Decimal>;

    /// `base` 대비 변화율(%)을 계산합니다. `base`가 0이면 `None`.
    fn pct_change_from(&self, base: Decimal) -> Option<Percentage>;

    /// 이 값의 `pct`% 를 반환합니다.
    fn pct_of(&self, pct: Percentage) -> Decimal;

    /// 제곱근. 음수는 0으로 취급합니다.
    fn sqrt_or_zero(&self) -> Decimal;

    /// 비율을 퍼센트 문자열로 변환합니다 (예: 0.0525 -> "5.25%").
    fn to_percentage_string(&self) -> String;

    /// 표시용으로 반올림합니다 (MidpointAwayFromZero).
    fn round_display(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn safe_div(&self, divisor: Decimal) -> Option<Decimal> {
        if divisor.is_zero() {
            None
        } else {
            self.checked_div(divisor)
        }
    }

    fn pct_change_from(&self, base: Decimal) -> Option<Percentage> {
        self.checked_sub(base)?.safe_div(base)?.checked_mul(HUNDRED)
    }

    fn pct_of(&self, pct: Percentage) -> Decimal {
        *self * pct / HUNDRED
    }

    fn sqrt_or_zero(&self) -> Decimal {
        if *self <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.sqrt().unwrap_or(Decimal::ZERO)
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * HUNDRED;
        format!("{:.2}%", pct)
    }

    fn round_display(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }
}
