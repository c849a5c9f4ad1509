// region:    --- Imports
use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::messaging::commands::{
    self, load_participant_conversation, OpenConversationCommand, SendMessageCommand,
};
use crate::messaging::model::{Conversation, ConversationSummary, Message};
use crate::query;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

/// 대화방 목록 (최근 메시지, 안 읽은 수)
pub async fn handle_get_conversations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    info!("{:<12} --> 대화방 목록 조회 user: {}", "HandlerQuery", user.id);
    Ok(Json(
        query::handlers::get_conversation_summaries(&state.db, &user.id).await?,
    ))
}

/// 대화방 열기 (없으면 생성)
pub async fn handle_open_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<OpenConversationCommand>,
) -> AppResult<Json<Conversation>> {
    Ok(Json(commands::open_conversation(&state.db, &user.id, cmd).await?))
}

/// 메시지 조회 (상대방 메시지는 읽음 처리)
pub async fn handle_get_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<i64>,
) -> AppResult<Json<Vec<Message>>> {
    info!(
        "{:<12} --> 메시지 조회 conversation: {}",
        "HandlerQuery", conversation_id
    );
    load_participant_conversation(&state.db, &user.id, conversation_id).await?;
    let messages =
        query::handlers::get_messages_and_mark_read(&state.db, conversation_id, &user.id).await?;
    Ok(Json(messages))
}

/// 메시지 전송
pub async fn handle_send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conversation_id): Path<i64>,
    Json(cmd): Json<SendMessageCommand>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = commands::send_message(&state.db, &user.id, conversation_id, cmd).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
