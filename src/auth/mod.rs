//! 인증
//!
//! 인증 자체는 외부 호스팅 인증 서비스가 담당하고, 여기서는 세션 모델과
//! 실패 분류, 요청에서 사용자를 꺼내는 추출기를 제공한다.
pub mod extract;
pub mod provider;

pub use extract::CurrentUser;
pub use provider::{AuthProvider, HostedAuthClient};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

// region:    --- Session Model
/// 인증 서비스 사용자
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// 로그인 세션
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// 이메일/비밀번호 요청
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), AuthError> {
        if !looks_like_email(&self.email) {
            return Err(AuthError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        Ok(())
    }
}

const MIN_PASSWORD_LEN: usize = 8;

pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
// endregion: --- Session Model

// region:    --- Auth Error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("メールアドレスまたはパスワードが正しくありません")]
    InvalidCredentials,

    #[error("このメールアドレスはすでに登録されています")]
    EmailAlreadyRegistered,

    #[error("パスワードは8文字以上で入力してください")]
    WeakPassword,

    #[error("正しいメールアドレスを入力してください")]
    InvalidEmail,

    #[error("メールアドレスの確認が完了していません")]
    EmailNotConfirmed,

    #[error("リクエストが多すぎます。しばらくしてから再度お試しください")]
    RateLimited,

    #[error("セッションの有効期限が切れました。再度ログインしてください")]
    SessionExpired,

    #[error("認証サービスに接続できません")]
    Unavailable(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailAlreadyRegistered => "EMAIL_TAKEN",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::RateLimited => "RATE_LIMITED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Unavailable(_) => "AUTH_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::EmailAlreadyRegistered => StatusCode::CONFLICT,
            Self::WeakPassword | Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::EmailNotConfirmed => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// 인증 서비스 실패 응답 분류
///
/// 응답 본문의 `error_code`를 우선 보고, 없으면 메시지 문구로 판단한다.
pub fn classify_auth_failure(status: u16, body: &serde_json::Value) -> AuthError {
    let code = body
        .get("error_code")
        .or_else(|| body.get("code").filter(|c| c.is_string()))
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    match code {
        "invalid_credentials" => return AuthError::InvalidCredentials,
        "user_already_exists" | "email_exists" => return AuthError::EmailAlreadyRegistered,
        "weak_password" => return AuthError::WeakPassword,
        "email_not_confirmed" => return AuthError::EmailNotConfirmed,
        "over_request_rate_limit" | "over_email_send_rate_limit" => return AuthError::RateLimited,
        "bad_jwt" | "session_not_found" | "session_expired" => return AuthError::SessionExpired,
        "validation_failed" | "email_address_invalid" => return AuthError::InvalidEmail,
        _ => {}
    }

    let message = ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|m| m.as_str()))
        .unwrap_or_default()
        .to_lowercase();

    if message.contains("invalid login credentials") || message.contains("invalid grant") {
        AuthError::InvalidCredentials
    } else if message.contains("already registered") || message.contains("already exists") {
        AuthError::EmailAlreadyRegistered
    } else if message.contains("password should be") || message.contains("weak password") {
        AuthError::WeakPassword
    } else if message.contains("email not confirmed") {
        AuthError::EmailNotConfirmed
    } else if status == 429 || message.contains("rate limit") {
        AuthError::RateLimited
    } else if status == 401 || message.contains("jwt") {
        AuthError::SessionExpired
    } else if message.contains("invalid email") || message.contains("unable to validate email") {
        AuthError::InvalidEmail
    } else {
        AuthError::Unavailable(format!("status {status}: {message}"))
    }
}
// endregion: --- Auth Error

// endregion: --- Tests
