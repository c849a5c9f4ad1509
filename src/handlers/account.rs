// region:    --- Imports
use super::listings::{views, ListingView};
use crate::auth::{looks_like_email, AuthError, AuthUser, Credentials, CurrentUser, Session};
use crate::error::AppResult;
use crate::profile::commands::{self as profile, ListingRefCommand, UpdateProfileCommand};
use crate::profile::model::Profile;
use crate::query;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

impl EmailRequest {
    fn validated(&self) -> Result<&str, AuthError> {
        let email = self.email.trim();
        if looks_like_email(email) {
            Ok(email)
        } else {
            Err(AuthError::InvalidEmail)
        }
    }
}

// region:    --- Auth Handlers

/// 회원 가입 (프로필 행 생성)
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<(StatusCode, Json<Session>)> {
    credentials.validate()?;
    let session = state.auth.sign_up(&credentials).await?;
    let email = session
        .user
        .email
        .clone()
        .unwrap_or_else(|| credentials.email.trim().to_string());
    profile::upsert_profile(&state.db, &session.user.id, &email).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// 로그인
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<Session>> {
    let session = state.auth.sign_in(&credentials).await?;
    info!("{:<12} --> 로그인 성공: {}", "Auth", session.user.id);
    Ok(Json(session))
}

/// 비밀번호 재설정 메일
pub async fn handle_password_reset(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> AppResult<Json<Value>> {
    let email = req.validated()?;
    state.auth.send_password_reset(email).await?;
    Ok(Json(json!({
        "message": "パスワード再設定用のメールを送信しました"
    })))
}

/// 로그아웃
pub async fn handle_sign_out(State(state): State<AppState>, user: CurrentUser) -> AppResult<StatusCode> {
    state.auth.sign_out(&user.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 이메일 변경
pub async fn handle_change_email(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EmailRequest>,
) -> AppResult<Json<AuthUser>> {
    let email = req.validated()?;
    let updated = state.auth.change_email(&user.access_token, email).await?;
    // 확인 메일 방식이면 새 주소는 확인 후에 반영된다
    if let Some(confirmed) = updated.email.as_deref() {
        profile::upsert_profile(&state.db, &updated.id, confirmed).await?;
    }
    Ok(Json(updated))
}

// endregion: --- Auth Handlers

// region:    --- Profile Handlers

/// 내 프로필
pub async fn handle_get_profile(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Profile>> {
    info!("{:<12} --> 프로필 조회 user: {}", "HandlerQuery", user.id);
    if let Some(found) = query::handlers::get_profile(&state.db, &user.id).await? {
        return Ok(Json(found));
    }
    // 가입 이전 계정은 첫 조회 때 프로필을 만든다
    let email = user.email.clone().unwrap_or_default();
    Ok(Json(profile::upsert_profile(&state.db, &user.id, &email).await?))
}

pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<UpdateProfileCommand>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profile::update_display_name(&state.db, &user.id, cmd).await?))
}

/// 즐겨찾기 목록
pub async fn handle_get_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ListingView>>> {
    let listings = query::handlers::get_favorite_listings(&state.db, &user.id).await?;
    Ok(Json(views(&state, listings)))
}

pub async fn handle_add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<ListingRefCommand>,
) -> AppResult<StatusCode> {
    profile::add_favorite(&state.db, &user.id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> AppResult<StatusCode> {
    profile::remove_favorite(&state.db, &user.id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 최근 본 상품 (최신순)
pub async fn handle_get_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ListingView>>> {
    let listings = query::handlers::get_view_history(&state.db, &user.id).await?;
    Ok(Json(views(&state, listings)))
}

pub async fn handle_record_view(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<ListingRefCommand>,
) -> AppResult<StatusCode> {
    profile::record_view(&state.db, &user.id, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Profile Handlers
