// region:    --- Imports
use super::queries;
use crate::checkout::model::Checkout;
use crate::database::DatabaseManager;
use crate::listing::model::Listing;
use crate::messaging::model::{Conversation, ConversationSummary, Message};
use crate::payout::model::{Balance, BankAccount, Sale, Withdrawal};
use crate::profile::model::{Brand, Profile};
use sqlx::Error as SqlxError;
use sqlx::Row;
use tracing::info;

// endregion: --- Imports

// region:    --- Listing Queries

/// 상품 조회
pub async fn get_listing(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Listing>, SqlxError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", listing_id);
    sqlx::query_as::<_, Listing>(queries::GET_LISTING)
        .bind(listing_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// 공개 상품 조회
pub async fn get_published_listings(db_manager: &DatabaseManager) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 공개 상품 조회", "Query");
    sqlx::query_as::<_, Listing>(queries::GET_PUBLISHED_LISTINGS)
        .fetch_all(db_manager.pool())
        .await
}

/// 판매자 상품 조회
pub async fn get_seller_listings(
    db_manager: &DatabaseManager,
    seller_id: &str,
) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 판매자 상품 조회 seller: {}", "Query", seller_id);
    sqlx::query_as::<_, Listing>(queries::GET_SELLER_LISTINGS)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 즐겨찾기 상품 조회
pub async fn get_favorite_listings(
    db_manager: &DatabaseManager,
    user_id: &str,
) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 즐겨찾기 조회 user: {}", "Query", user_id);
    sqlx::query_as::<_, Listing>(queries::GET_FAVORITE_LISTINGS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 최근 본 상품 조회
pub async fn get_view_history(
    db_manager: &DatabaseManager,
    user_id: &str,
) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 최근 본 상품 조회 user: {}", "Query", user_id);
    sqlx::query_as::<_, Listing>(queries::GET_VIEW_HISTORY)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 브랜드 목록 조회
pub async fn get_brands(db_manager: &DatabaseManager) -> Result<Vec<Brand>, SqlxError> {
    info!("{:<12} --> 브랜드 목록 조회", "Query");
    sqlx::query_as::<_, Brand>(queries::GET_BRANDS)
        .fetch_all(db_manager.pool())
        .await
}

// endregion: --- Listing Queries

// region:    --- Messaging Queries

/// 대화방 조회
pub async fn get_conversation(
    db_manager: &DatabaseManager,
    conversation_id: i64,
) -> Result<Option<Conversation>, SqlxError> {
    info!("{:<12} --> 대화방 조회 id: {}", "Query", conversation_id);
    sqlx::query_as::<_, Conversation>(queries::GET_CONVERSATION)
        .bind(conversation_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// 대화방 목록 조회
pub async fn get_conversation_summaries(
    db_manager: &DatabaseManager,
    user_id: &str,
) -> Result<Vec<ConversationSummary>, SqlxError> {
    info!("{:<12} --> 대화방 목록 조회 user: {}", "Query", user_id);
    sqlx::query_as::<_, ConversationSummary>(queries::GET_CONVERSATION_SUMMARIES)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 메시지 조회 후 상대방 메시지 읽음 처리
pub async fn get_messages_and_mark_read(
    db_manager: &DatabaseManager,
    conversation_id: i64,
    reader_id: &str,
) -> Result<Vec<Message>, SqlxError> {
    info!(
        "{:<12} --> 메시지 조회 conversation: {}",
        "Query", conversation_id
    );
    let reader_id = reader_id.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(
                    "UPDATE messages SET is_read = TRUE
                     WHERE conversation_id = $1 AND sender_id <> $2 AND NOT is_read",
                )
                .bind(conversation_id)
                .bind(&reader_id)
                .execute(&mut **tx)
                .await?;

                sqlx::query_as::<_, Message>(queries::GET_MESSAGES)
                    .bind(conversation_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

// endregion: --- Messaging Queries

// region:    --- Checkout Queries

/// 체크아웃 조회
pub async fn get_checkout(
    db_manager: &DatabaseManager,
    payment_intent_id: &str,
) -> Result<Option<Checkout>, SqlxError> {
    info!("{:<12} --> 체크아웃 조회: {}", "Query", payment_intent_id);
    sqlx::query_as::<_, Checkout>(queries::GET_CHECKOUT)
        .bind(payment_intent_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// 상품 이벤트 버전 조회
pub async fn get_listing_version(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<i64, SqlxError> {
    info!("{:<12} --> 상품 이벤트 버전 조회 id: {}", "Query", listing_id);
    let row = sqlx::query(queries::GET_LISTING_VERSION)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await?;
    row.try_get("version")
}

/// 상품 결제 완료 여부
pub async fn is_listing_paid(db_manager: &DatabaseManager, listing_id: i64) -> Result<bool, SqlxError> {
    let row = sqlx::query(queries::COUNT_PAYMENT_EVENTS)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await?;
    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

/// 해당 결제 의도로 결제 완료가 기록되었는지
pub async fn is_payment_recorded(
    db_manager: &DatabaseManager,
    payment_intent_id: &str,
) -> Result<bool, SqlxError> {
    let row = sqlx::query(queries::COUNT_INTENT_PAYMENT_EVENTS)
        .bind(payment_intent_id)
        .fetch_one(db_manager.pool())
        .await?;
    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

// endregion: --- Checkout Queries

// region:    --- Payout Queries

/// 판매 이력 조회
pub async fn get_seller_sales(
    db_manager: &DatabaseManager,
    seller_id: &str,
) -> Result<Vec<Sale>, SqlxError> {
    info!("{:<12} --> 판매 이력 조회 seller: {}", "Query", seller_id);
    sqlx::query_as::<_, Sale>(queries::GET_SELLER_SALES)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 잔액 조회
pub async fn get_balance(db_manager: &DatabaseManager, seller_id: &str) -> Result<Balance, SqlxError> {
    info!("{:<12} --> 잔액 조회 seller: {}", "Query", seller_id);
    sqlx::query_as::<_, Balance>(queries::GET_BALANCE)
        .bind(seller_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 출금 이력 조회
pub async fn get_withdrawals(
    db_manager: &DatabaseManager,
    seller_id: &str,
) -> Result<Vec<Withdrawal>, SqlxError> {
    info!("{:<12} --> 출금 이력 조회 seller: {}", "Query", seller_id);
    sqlx::query_as::<_, Withdrawal>(queries::GET_WITHDRAWALS)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 계좌 목록 조회
pub async fn get_bank_accounts(
    db_manager: &DatabaseManager,
    seller_id: &str,
) -> Result<Vec<BankAccount>, SqlxError> {
    info!("{:<12} --> 계좌 목록 조회 seller: {}", "Query", seller_id);
    sqlx::query_as::<_, BankAccount>(queries::GET_BANK_ACCOUNTS)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await
}

// endregion: --- Payout Queries

// region:    --- Profile Queries

/// 프로필 조회
pub async fn get_profile(
    db_manager: &DatabaseManager,
    user_id: &str,
) -> Result<Option<Profile>, SqlxError> {
    info!("{:<12} --> 프로필 조회 id: {}", "Query", user_id);
    sqlx::query_as::<_, Profile>(queries::GET_PROFILE)
        .bind(user_id)
        .fetch_optional(db_manager.pool())
        .await
}

// endregion: --- Profile Queries
