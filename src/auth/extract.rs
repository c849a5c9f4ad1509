// region:    --- Imports
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::debug;

// endregion: --- Imports

// region:    --- Current User
/// `Authorization: Bearer` 토큰으로 확인한 로그인 사용자
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub access_token: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = state.auth.get_user(&token).await?;
        debug!("{:<12} --> 인증된 사용자: {}", "Auth", user.id);
        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            access_token: token,
        })
    }
}
// endregion: --- Current User

// region:    --- Admin User
/// 관리자 권한 사용자 (`ADMIN_USER_IDS`)
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !state.config.is_admin(&user.id) {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
// endregion: --- Admin User

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  "));
        assert_eq!(bearer_token(&headers), None);
    }
}
// endregion: --- Tests
