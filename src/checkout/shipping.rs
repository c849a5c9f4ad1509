// region:    --- Imports
use crate::error::AppError;
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Shipping Address
/// 배송지
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    pub name: String,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: String,
    pub phone: String,
}

impl ShippingAddress {
    /// 필수 항목과 형식 검증 후 정규화된 주소 반환
    pub fn validate(&self) -> Result<ShippingAddress, AppError> {
        let fail = |message: &str| Err(AppError::Validation(message.to_string()));

        if self.name.trim().is_empty() {
            return fail("お名前を入力してください");
        }
        let postal_code = match normalize_postal_code(&self.postal_code) {
            Some(code) => code,
            None => return fail("郵便番号は7桁の数字で入力してください"),
        };
        if self.prefecture.trim().is_empty() {
            return fail("都道府県を入力してください");
        }
        if self.city.trim().is_empty() {
            return fail("市区町村を入力してください");
        }
        if self.address_line1.trim().is_empty() {
            return fail("番地を入力してください");
        }
        let phone: String = self.phone.chars().filter(|c| *c != '-').collect();
        let phone = phone.trim().to_string();
        if !(10..=11).contains(&phone.len()) || !phone.chars().all(|c| c.is_ascii_digit()) {
            return fail("電話番号は10〜11桁の数字で入力してください");
        }

        Ok(ShippingAddress {
            name: self.name.trim().to_string(),
            postal_code,
            prefecture: self.prefecture.trim().to_string(),
            city: self.city.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self.address_line2.trim().to_string(),
            phone,
        })
    }
}

/// "1500001" / "150-0001" -> "150-0001"
fn normalize_postal_code(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits: String = match raw.len() {
        7 => raw.to_string(),
        8 if raw.as_bytes().get(3) == Some(&b'-') => raw.replacen('-', "", 1),
        _ => return None,
    };
    if digits.len() != 7 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}", &digits[..3], &digits[3..]))
}
// endregion: --- Shipping Address

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: " 山田 花子 ".into(),
            postal_code: "1500001".into(),
            prefecture: "東京都".into(),
            city: "渋谷区".into(),
            address_line1: "神宮前1-2-3".into(),
            address_line2: String::new(),
            phone: "090-1234-5678".into(),
        }
    }

    #[test]
    fn normalizes_valid_address() {
        let normalized = address().validate().unwrap();
        assert_eq!(normalized.name, "山田 花子");
        assert_eq!(normalized.postal_code, "150-0001");
        assert_eq!(normalized.phone, "09012345678");
    }

    #[test]
    fn accepts_hyphenated_postal_code() {
        let mut input = address();
        input.postal_code = "150-0001".into();
        assert_eq!(input.validate().unwrap().postal_code, "150-0001");
    }

    #[test]
    fn rejects_bad_postal_codes() {
        for bad in ["150001", "15-00001", "abc-defg", "1500-001", ""] {
            let mut input = address();
            input.postal_code = bad.into();
            assert!(input.validate().is_err(), "postal code {bad:?}");
        }
    }

    #[test]
    fn requires_name_and_phone() {
        let mut input = address();
        input.name = "  ".into();
        assert!(input.validate().is_err());

        let mut input = address();
        input.phone = "03-1234".into();
        assert!(input.validate().is_err());
    }
}
// endregion: --- Tests
