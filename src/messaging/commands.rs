/// 메시지 관련 커맨드 처리
/// 1. 대화방 열기 (없으면 생성)
/// 2. 메시지 전송
// region:    --- Imports
use super::model::{Conversation, Message};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::query::handlers as query;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// 메시지 최대 길이 (문자 수)
pub const MAX_MESSAGE_CHARS: usize = 2000;

// region:    --- Commands
/// 대화방 열기 명령
#[derive(Debug, Clone, Deserialize)]
pub struct OpenConversationCommand {
    pub listing_id: i64,
}

/// 메시지 전송 명령
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageCommand {
    pub body: String,
}

impl SendMessageCommand {
    /// 본문 검증 후 앞뒤 공백 제거
    pub fn validated_body(&self) -> AppResult<String> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err(AppError::Validation("メッセージを入力してください".to_string()));
        }
        if body.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "メッセージは{MAX_MESSAGE_CHARS}文字以内で入力してください"
            )));
        }
        Ok(body.to_string())
    }
}

/// 참여자만 접근 가능한 대화방 조회
pub async fn load_participant_conversation(
    db_manager: &DatabaseManager,
    user_id: &str,
    conversation_id: i64,
) -> AppResult<Conversation> {
    let conversation = query::get_conversation(db_manager, conversation_id)
        .await?
        .ok_or(AppError::NotFound("メッセージ"))?;
    if !conversation.has_participant(user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(conversation)
}

/// 1. 대화방 열기
pub async fn open_conversation(
    db_manager: &DatabaseManager,
    buyer_id: &str,
    cmd: OpenConversationCommand,
) -> AppResult<Conversation> {
    info!(
        "{:<12} --> 대화방 열기: listing={}, buyer={}",
        "Command", cmd.listing_id, buyer_id
    );
    let listing = query::get_listing(db_manager, cmd.listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;
    if !listing.is_visible_to(Some(buyer_id)) {
        return Err(AppError::NotFound("商品"));
    }
    if listing.is_owned_by(buyer_id) {
        return Err(AppError::Validation(
            "自分の商品にはメッセージを送れません".to_string(),
        ));
    }

    // 동시에 열어도 대화방은 하나 (UNIQUE 제약 + DO UPDATE 로 기존 행 반환)
    let conversation = sqlx::query_as::<_, Conversation>(
        "INSERT INTO conversations (listing_id, buyer_id, seller_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (listing_id, buyer_id, seller_id) DO UPDATE SET listing_id = EXCLUDED.listing_id
         RETURNING id, listing_id, buyer_id, seller_id, created_at, updated_at",
    )
    .bind(listing.id)
    .bind(buyer_id)
    .bind(&listing.seller_id)
    .fetch_one(db_manager.pool())
    .await?;

    Ok(conversation)
}

/// 2. 메시지 전송
pub async fn send_message(
    db_manager: &DatabaseManager,
    sender_id: &str,
    conversation_id: i64,
    cmd: SendMessageCommand,
) -> AppResult<Message> {
    let body = cmd.validated_body()?;
    load_participant_conversation(db_manager, sender_id, conversation_id).await?;
    info!(
        "{:<12} --> 메시지 전송: conversation={}, sender={}",
        "Command", conversation_id, sender_id
    );

    let sender_id = sender_id.to_string();
    let message = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let message = sqlx::query_as::<_, Message>(
                    "INSERT INTO messages (conversation_id, sender_id, body)
                     VALUES ($1, $2, $3)
                     RETURNING id, conversation_id, sender_id, body, is_read, created_at",
                )
                .bind(conversation_id)
                .bind(&sender_id)
                .bind(&body)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
                    .bind(conversation_id)
                    .execute(&mut **tx)
                    .await?;

                Ok::<_, sqlx::Error>(message)
            })
        })
        .await?;

    Ok(message)
}
// endregion: --- Commands

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_trimmed() {
        let cmd = SendMessageCommand {
            body: "  試着は可能でしょうか？ \n".into(),
        };
        assert_eq!(cmd.validated_body().unwrap(), "試着は可能でしょうか？");
    }

    #[test]
    fn blank_and_oversized_bodies_are_rejected() {
        let blank = SendMessageCommand { body: " \n ".into() };
        assert!(blank.validated_body().is_err());

        let long = SendMessageCommand {
            body: "あ".repeat(MAX_MESSAGE_CHARS + 1),
        };
        assert!(long.validated_body().is_err());

        let exact = SendMessageCommand {
            body: "あ".repeat(MAX_MESSAGE_CHARS),
        };
        assert!(exact.validated_body().is_ok());
    }
}
// endregion: --- Tests
