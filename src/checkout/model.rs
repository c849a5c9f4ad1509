use super::shipping::ShippingAddress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;

// 결제 대기 중인 체크아웃
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Checkout {
    pub payment_intent_id: String,
    pub listing_id: i64,
    pub buyer_id: String,
    pub amount: i64,
    pub shipping: Json<ShippingAddress>,
    pub created_at: DateTime<Utc>,
}
