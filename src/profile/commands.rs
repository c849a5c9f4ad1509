/// 회원 관련 커맨드 처리
/// 1. 프로필 생성 / 표시 이름 변경
/// 2. 즐겨찾기 추가 / 삭제
/// 3. 최근 본 상품 기록
// region:    --- Imports
use super::model::Profile;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::query::handlers as query;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// 최근 본 상품 최대 보관 수
pub const VIEW_HISTORY_LIMIT: i64 = 20;

const DISPLAY_NAME_MAX_CHARS: usize = 50;

// region:    --- Commands
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileCommand {
    pub display_name: String,
}

impl UpdateProfileCommand {
    pub fn validated_name(&self) -> AppResult<String> {
        let name = self.display_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("表示名を入力してください".to_string()));
        }
        if name.chars().count() > DISPLAY_NAME_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "表示名は{DISPLAY_NAME_MAX_CHARS}文字以内で入力してください"
            )));
        }
        Ok(name.to_string())
    }
}

/// 상품 참조 명령 (즐겨찾기, 최근 본 상품)
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRefCommand {
    pub listing_id: i64,
}

/// 1. 프로필 생성 (가입 시, 이미 있으면 이메일만 갱신)
pub async fn upsert_profile(
    db_manager: &DatabaseManager,
    user_id: &str,
    email: &str,
) -> AppResult<Profile> {
    info!("{:<12} --> 프로필 생성: user={}", "Command", user_id);
    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (id, email) VALUES ($1, $2)
         ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email
         RETURNING id, email, display_name, created_at",
    )
    .bind(user_id)
    .bind(email)
    .fetch_one(db_manager.pool())
    .await?;
    Ok(profile)
}

/// 표시 이름 변경
pub async fn update_display_name(
    db_manager: &DatabaseManager,
    user_id: &str,
    cmd: UpdateProfileCommand,
) -> AppResult<Profile> {
    let name = cmd.validated_name()?;
    info!("{:<12} --> 표시 이름 변경: user={}", "Command", user_id);
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET display_name = $2 WHERE id = $1
         RETURNING id, email, display_name, created_at",
    )
    .bind(user_id)
    .bind(&name)
    .fetch_optional(db_manager.pool())
    .await?
    .ok_or(AppError::NotFound("プロフィール"))
}

/// 공개 상품인지 확인
async fn ensure_visible(db_manager: &DatabaseManager, user_id: &str, listing_id: i64) -> AppResult<()> {
    let listing = query::get_listing(db_manager, listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;
    if !listing.is_visible_to(Some(user_id)) {
        return Err(AppError::NotFound("商品"));
    }
    Ok(())
}

/// 2. 즐겨찾기 추가
pub async fn add_favorite(
    db_manager: &DatabaseManager,
    user_id: &str,
    cmd: ListingRefCommand,
) -> AppResult<()> {
    ensure_visible(db_manager, user_id, cmd.listing_id).await?;
    info!(
        "{:<12} --> 즐겨찾기 추가: user={}, listing={}",
        "Command", user_id, cmd.listing_id
    );
    sqlx::query(
        "INSERT INTO favorites (user_id, listing_id) VALUES ($1, $2)
         ON CONFLICT (user_id, listing_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(cmd.listing_id)
    .execute(db_manager.pool())
    .await?;
    Ok(())
}

/// 즐겨찾기 삭제 (없어도 성공)
pub async fn remove_favorite(
    db_manager: &DatabaseManager,
    user_id: &str,
    listing_id: i64,
) -> AppResult<()> {
    info!(
        "{:<12} --> 즐겨찾기 삭제: user={}, listing={}",
        "Command", user_id, listing_id
    );
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND listing_id = $2")
        .bind(user_id)
        .bind(listing_id)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}

/// 3. 최근 본 상품 기록 (최신 20건만 유지)
pub async fn record_view(
    db_manager: &DatabaseManager,
    user_id: &str,
    cmd: ListingRefCommand,
) -> AppResult<()> {
    ensure_visible(db_manager, user_id, cmd.listing_id).await?;

    let user_id = user_id.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(
                    "INSERT INTO view_history (user_id, listing_id) VALUES ($1, $2)
                     ON CONFLICT (user_id, listing_id) DO UPDATE SET viewed_at = NOW()",
                )
                .bind(&user_id)
                .bind(cmd.listing_id)
                .execute(&mut **tx)
                .await?;

                sqlx::query(
                    "DELETE FROM view_history
                     WHERE user_id = $1 AND listing_id NOT IN (
                         SELECT listing_id FROM view_history WHERE user_id = $1
                         ORDER BY viewed_at DESC LIMIT $2
                     )",
                )
                .bind(&user_id)
                .bind(VIEW_HISTORY_LIMIT)
                .execute(&mut **tx)
                .await?;

                Ok::<_, sqlx::Error>(())
            })
        })
        .await?;
    Ok(())
}
// endregion: --- Commands

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_trimmed_and_bounded() {
        let cmd = UpdateProfileCommand {
            display_name: "  はなこ ".into(),
        };
        assert_eq!(cmd.validated_name().unwrap(), "はなこ");

        let blank = UpdateProfileCommand {
            display_name: "   ".into(),
        };
        assert!(blank.validated_name().is_err());

        let long = UpdateProfileCommand {
            display_name: "花".repeat(DISPLAY_NAME_MAX_CHARS + 1),
        };
        assert!(long.validated_name().is_err());
    }
}
// endregion: --- Tests
