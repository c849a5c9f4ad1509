use crate::checkout::shipping::ShippingAddress;
use crate::listing::pricing::platform_fee;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

// region:    --- Sale
// 판매 기록
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Sale {
    pub id: i64,
    pub listing_id: i64,
    pub seller_id: String,
    pub buyer_id: String,
    pub payment_intent_id: String,
    pub amount: i64,
    pub platform_fee: i64,
    pub net_amount: i64,
    pub status: String,
    pub withdrawal_id: Option<i64>,
    pub shipping: Json<ShippingAddress>,
    pub created_at: DateTime<Utc>,
}

/// 판매 상태
/// pending -> completed (정산 기간 경과) -> withdrawn (출금 신청)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Completed,
    Withdrawn,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Withdrawn => "withdrawn",
            Self::Cancelled => "cancelled",
        }
    }
}

/// 판매 금액 분배 (금액, 수수료, 판매자 수령액)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAmounts {
    pub amount: i64,
    pub platform_fee: i64,
    pub net_amount: i64,
}

impl SaleAmounts {
    pub fn for_amount(amount: i64) -> Self {
        let fee = platform_fee(amount);
        Self {
            amount,
            platform_fee: fee,
            net_amount: amount - fee,
        }
    }
}
// endregion: --- Sale

// region:    --- Balance
/// 판매자 잔액
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Balance {
    /// 정산 대기
    pub pending: i64,
    /// 출금 가능
    pub available: i64,
    /// 출금 완료
    pub withdrawn: i64,
}

// 출금 신청
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Withdrawal {
    pub id: i64,
    pub seller_id: String,
    pub bank_account_id: i64,
    pub amount: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
// endregion: --- Balance

// region:    --- Bank Account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BankAccount {
    pub id: i64,
    pub seller_id: String,
    pub bank_name: String,
    pub branch_name: String,
    pub account_type: String,
    pub account_number: String,
    pub account_holder: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// 응답용 계좌 (계좌번호는 끝 4자리만)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountView {
    pub id: i64,
    pub bank_name: String,
    pub branch_name: String,
    pub account_type: String,
    pub account_number_last4: String,
    pub account_holder: String,
    pub is_default: bool,
}

impl From<BankAccount> for BankAccountView {
    fn from(account: BankAccount) -> Self {
        let digits: Vec<char> = account.account_number.chars().collect();
        let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        Self {
            id: account.id,
            bank_name: account.bank_name,
            branch_name: account.branch_name,
            account_type: account.account_type,
            account_number_last4: last4,
            account_holder: account.account_holder,
            is_default: account.is_default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// 普通預金
    Ordinary,
    /// 当座預金
    Checking,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Checking => "checking",
        }
    }
}
// endregion: --- Bank Account
