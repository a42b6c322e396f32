//! 지지/저항 존.
//!
//! 스윙 고점은 저항, 스윙 저점은 지지가 되며 스윙 강도를 그대로 가집니다.
//! 같은 종류·같은 가격의 중복은 처음 나온 것만 남깁니다 (근접 병합 없음).

use coinchart_core::{SwingPoint, Zone, ZoneKind};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// 스윙 포인트로부터 지지/저항 존을 만듭니다.
///
/// 결과는 입력(시간) 순서를 유지합니다.
pub fn support_resistance_zones(swings: &[SwingPoint]) -> Vec<Zone> {
    let mut seen: BTreeSet<(ZoneKind, Decimal)> = BTreeSet::new();
    swings
        .iter()
        .filter_map(|swing| {
            let kind = ZoneKind::from(swing.kind);
            seen.insert((kind, swing.price)).then_some(Zone {
                price: swing.price,
                kind,
                strength: swing.strength,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use coinchart_core::SwingKind;
    use rust_decimal_macros::dec;

    fn swing(index: usize, price: Decimal, kind: SwingKind, strength: Decimal) -> SwingPoint {
        SwingPoint {
            index,
            timestamp: Utc.timestamp_opt(1_700_000_000 + index as i64 * 60, 0).unwrap(),
            price,
            kind,
            strength,
        }
    }

    #[test]
    fn test_zone_kinds() {
        let zones = support_resistance_zones(&[
            swing(1, dec!(110), SwingKind::High, dec!(0.5)),
            swing(3, dec!(95), SwingKind::Low, dec!(0.8)),
        ]);

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].kind, ZoneKind::Resistance);
        assert_eq!(zones[0].strength, dec!(0.5));
        assert_eq!(zones[1].kind, ZoneKind::Support);
    }

    #[test]
    fn test_exact_duplicates_keep_first() {
        let zones = support_resistance_zones(&[
            swing(1, dec!(110), SwingKind::High, dec!(0.5)),
            swing(5, dec!(110.0), SwingKind::High, dec!(0.9)),
            swing(7, dec!(110), SwingKind::Low, dec!(0.3)),
            swing(9, dec!(110.01), SwingKind::High, dec!(0.4)),
        ]);

        // 같은 가격이라도 종류가 다르면 유지, 근접 가격은 병합하지 않음
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].strength, dec!(0.5));
        assert_eq!(zones[1].kind, ZoneKind::Support);
        assert_eq!(zones[2].price, dec!(110.01));
    }
}
