// region:    --- Imports
use crate::auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

// endregion: --- Imports

// region:    --- App Error
/// 서비스 공통 에러
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("ログインが必要です")]
    Unauthorized,

    #[error("この操作を行う権限がありません")]
    Forbidden,

    #[error("{0}が見つかりません")]
    NotFound(&'static str),

    #[error("{message}")]
    Conflict { message: String, code: &'static str },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("決済処理に失敗しました: {0}")]
    Payment(String),

    #[error("画像のアップロードに失敗しました: {0}")]
    Storage(String),

    #[error("event store error: {0}")]
    EventStore(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn conflict(message: impl Into<String>, code: &'static str) -> Self {
        Self::Conflict {
            message: message.into(),
            code,
        }
    }

    /// 응답 코드
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) | Self::Database(sqlx::Error::RowNotFound) => "NOT_FOUND",
            Self::Conflict { code, .. } => *code,
            Self::Auth(e) => e.code(),
            Self::Payment(_) => "PAYMENT_FAILED",
            Self::Storage(_) => "STORAGE_FAILED",
            Self::EventStore(_) | Self::Config(_) | Self::Database(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Auth(e) => e.status(),
            Self::Payment(_) | Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::EventStore(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 사용자에게 보여줄 메시지
    fn public_message(&self) -> String {
        match self {
            Self::Database(sqlx::Error::RowNotFound) => "データが見つかりません".to_string(),
            Self::Database(_) | Self::EventStore(_) | Self::Config(_) => {
                "サーバーエラーが発生しました。時間をおいて再度お試しください".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {:?}", "Error", self);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.public_message(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
// endregion: --- App Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::Validation("販売価格を正しく入力してください".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION");
        assert_eq!(err.public_message(), "販売価格を正しく入力してください");
    }

    #[test]
    fn conflict_keeps_its_code() {
        let err = AppError::conflict("この商品はすでに購入されています", "ALREADY_SOLD");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "ALREADY_SOLD");
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL");
        assert!(!err.public_message().contains("pool"));
    }

    #[test]
    fn missing_row_is_not_found() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
// endregion: --- Tests
