use crate::checkout::shipping::ShippingAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum MarketEvent {
    // 결제 완료 이벤트 (판매 기록 생성 + 상품 sold 처리)
    PaymentSucceeded {
        listing_id: i64,
        seller_id: String,
        buyer_id: String,
        amount: i64,
        payment_intent_id: String,
        shipping: ShippingAddress,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PaymentSucceeded { .. } => "PaymentSucceeded",
        }
    }

    pub fn aggregate_id(&self) -> i64 {
        match self {
            Self::PaymentSucceeded { listing_id, .. } => *listing_id,
        }
    }
}
