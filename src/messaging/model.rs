use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 대화방 모델 (상품 하나에 대한 구매자-판매자 스레드)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: String,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

// 메시지 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// 대화방 목록 항목 (최근 메시지, 안 읽은 수 포함)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationSummary {
    pub id: i64,
    pub listing_id: i64,
    pub listing_title: String,
    pub listing_image: Option<String>,
    pub buyer_id: String,
    pub seller_id: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}
