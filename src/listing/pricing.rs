use crate::config::PLATFORM_FEE_PERCENT;
use serde::Serialize;

/// 등록 가능한 최고 가격 (1억엔)
pub const MAX_PRICE_YEN: i64 = 100_000_000;

/// 금액 문자열 파싱 ("150,000" 허용)
pub fn parse_yen(value: &str) -> Option<i64> {
    let digits: String = value.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// 0 ..= MAX_PRICE_YEN 범위의 금액만 허용
pub fn parse_price(value: &str) -> Option<i64> {
    parse_yen(value).filter(|p| (0..=MAX_PRICE_YEN).contains(p))
}

/// 플랫폼 수수료 (원 단위 버림)
pub fn platform_fee(amount: i64) -> i64 {
    match amount.checked_mul(PLATFORM_FEE_PERCENT) {
        Some(scaled) => scaled / 100,
        None => amount / 100 * PLATFORM_FEE_PERCENT + amount % 100 * PLATFORM_FEE_PERCENT / 100,
    }
}

/// 판매자 예상 수령액
pub fn estimated_payout(price: i64) -> i64 {
    price - platform_fee(price)
}

/// 정가 대비 할인율 (%)
pub fn discount_percent(price: i64, original_price: i64) -> Option<i64> {
    if price <= 0 || original_price <= price {
        return None;
    }
    let off = (original_price - price) as f64 * 100.0 / original_price as f64;
    Some(off.round() as i64)
}

/// 가격 단계 화면의 계산 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub price: i64,
    pub original_price: Option<i64>,
    pub discount_percent: Option<i64>,
    pub platform_fee: i64,
    pub estimated_payout: i64,
}

impl PriceBreakdown {
    pub fn from_input(price: &str, original_price: &str) -> Option<Self> {
        let price = parse_price(price).filter(|p| *p > 0)?;
        let original_price = parse_price(original_price);
        Some(Self {
            price,
            original_price,
            discount_percent: original_price.and_then(|o| discount_percent(price, o)),
            platform_fee: platform_fee(price),
            estimated_payout: estimated_payout(price),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_price_dress() {
        let breakdown = PriceBreakdown::from_input("150000", "300000").unwrap();
        assert_eq!(breakdown.discount_percent, Some(50));
        assert_eq!(breakdown.platform_fee, 15_000);
        assert_eq!(breakdown.estimated_payout, 135_000);
    }

    #[test]
    fn fee_is_floored() {
        assert_eq!(platform_fee(12_345), 1_234);
        assert_eq!(estimated_payout(12_345), 11_111);
    }

    #[test]
    fn no_discount_without_cheaper_price() {
        assert_eq!(discount_percent(300_000, 300_000), None);
        assert_eq!(discount_percent(320_000, 300_000), None);
        assert_eq!(discount_percent(0, 300_000), None);
        assert_eq!(discount_percent(99_000, 300_000), Some(67));
    }

    #[test]
    fn parse_accepts_commas_and_rejects_garbage() {
        assert_eq!(parse_yen(" 150,000 "), Some(150_000));
        assert_eq!(parse_yen(""), None);
        assert_eq!(parse_yen("１５万"), None);
        assert!(PriceBreakdown::from_input("0", "").is_none());
    }

    #[test]
    fn price_is_capped() {
        assert_eq!(parse_price("100,000,000"), Some(MAX_PRICE_YEN));
        assert_eq!(parse_price("100000001"), None);
        assert_eq!(parse_price("9223372036854775807"), None);
        assert_eq!(parse_price("-1"), None);
        assert!(PriceBreakdown::from_input("100000001", "").is_none());

        let top = PriceBreakdown::from_input("100000000", "").unwrap();
        assert_eq!(top.platform_fee, 10_000_000);
        assert_eq!(top.estimated_payout, 90_000_000);
    }

    #[test]
    fn fee_does_not_overflow_on_huge_amounts() {
        let fee = platform_fee(i64::MAX);
        assert!(fee > 0);
        assert_eq!(fee, i64::MAX / 100 * PLATFORM_FEE_PERCENT + 7 * PLATFORM_FEE_PERCENT / 100);
        assert!(estimated_payout(i64::MAX) > 0);
    }
}
