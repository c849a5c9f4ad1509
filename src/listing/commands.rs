/// 상품 관련 커맨드 처리
/// 1. 출품 (초안 저장 / 공개)
/// 2. 편집
/// 3. 상태 변경
/// 4. 사진 순서 변경, 추가, 삭제
/// 5. 삭제
// region:    --- Imports
use super::images::{check_image_paths, ImageSet};
use super::model::{Listing, ListingRecord, ListingStatus};
use super::wizard::{prepare_submission, validate_edit, validate_for_publish, ListingForm, SubmitMode};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::query::handlers as query;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 출품 명령
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingCommand {
    #[serde(default)]
    pub mode: SubmitMode,
    pub form: ListingForm,
}

/// 상태 변경 명령
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusCommand {
    pub status: ListingStatus,
}

/// 사진 순서 변경 명령
#[derive(Debug, Clone, Deserialize)]
pub struct MoveImageCommand {
    pub from: usize,
    pub to: usize,
}

/// 사진 추가 명령
#[derive(Debug, Clone, Deserialize)]
pub struct AttachImageCommand {
    pub path: String,
}

const RETURNING_LISTING: &str = "RETURNING id, seller_id, title, description, brand, price, original_price, size, color, condition, category, silhouette, neckline, bust, waist, hip, length, images, status, created_at, updated_at";

/// 이 시간 안에 만들어진 체크아웃이 있으면 결제 진행 중으로 보고 삭제를 막는다
const CHECKOUT_HOLD_MINUTES: i32 = 30;

/// 본인 상품 조회 (없으면 NotFound, 타인 상품이면 Forbidden)
pub async fn load_owned_listing(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
) -> AppResult<Listing> {
    let listing = query::get_listing(db_manager, listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;
    if !listing.is_owned_by(seller_id) {
        return Err(AppError::Forbidden);
    }
    Ok(listing)
}

fn ensure_not_sold(listing: &Listing) -> AppResult<()> {
    if listing.status() == Some(ListingStatus::Sold) {
        return Err(AppError::conflict(
            "売却済みの商品は変更できません",
            "ALREADY_SOLD",
        ));
    }
    Ok(())
}

/// 1. 출품
pub async fn create_listing(
    db_manager: &DatabaseManager,
    seller_id: &str,
    cmd: CreateListingCommand,
) -> AppResult<Listing> {
    info!(
        "{:<12} --> 출품 요청 처리 시작: seller={}, mode={:?}",
        "Command", seller_id, cmd.mode
    );
    let record = prepare_submission(&cmd.form, cmd.mode)?;
    check_image_paths(&record.images, seller_id, &[])?;
    let status = match cmd.mode {
        SubmitMode::Draft => ListingStatus::Draft,
        SubmitMode::Publish => ListingStatus::Published,
    };

    let sql = format!(
        "INSERT INTO listings (seller_id, title, description, brand, price, original_price, size, color, condition, category, silhouette, neckline, bust, waist, hip, length, images, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
         {RETURNING_LISTING}"
    );
    let listing = bind_record(sqlx::query_as::<_, Listing>(&sql).bind(seller_id), &record)
        .bind(status.as_str())
        .fetch_one(db_manager.pool())
        .await?;

    info!(
        "{:<12} --> 출품 완료: id={}, status={}",
        "Command", listing.id, listing.status
    );
    Ok(listing)
}

/// 2. 편집
pub async fn update_listing(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
    form: ListingForm,
) -> AppResult<Listing> {
    info!("{:<12} --> 상품 편집: id={}", "Command", listing_id);
    validate_edit(&form)?;
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    ensure_not_sold(&listing)?;

    let record = form.to_record();
    check_image_paths(&record.images, seller_id, &listing.images)?;
    if listing.status() == Some(ListingStatus::Published) {
        // 공개 중인 상품은 공개 조건을 계속 만족해야 한다
        validate_for_publish(&form)?;
    }

    let sql = format!(
        "UPDATE listings SET title = $2, description = $3, brand = $4, price = $5, original_price = $6, size = $7,
             color = $8, condition = $9, category = $10, silhouette = $11, neckline = $12, bust = $13, waist = $14,
             hip = $15, length = $16, images = $17, updated_at = NOW()
         WHERE id = $1 AND status <> 'sold'
         {RETURNING_LISTING}"
    );
    bind_record(sqlx::query_as::<_, Listing>(&sql).bind(listing_id), &record)
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or_else(|| AppError::conflict("売却済みの商品は変更できません", "ALREADY_SOLD"))
}

/// 3. 상태 변경
pub async fn change_status(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
    next: ListingStatus,
) -> AppResult<Listing> {
    info!(
        "{:<12} --> 상품 상태 변경: id={}, next={:?}",
        "Command", listing_id, next
    );
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    let current = listing
        .status()
        .ok_or_else(|| AppError::Validation(format!("不明な商品ステータスです: {}", listing.status)))?;

    if !current.can_transition_to(next) {
        return Err(AppError::conflict(
            format!(
                "この商品のステータスは {} から {} に変更できません",
                current.as_str(),
                next.as_str()
            ),
            "INVALID_STATUS",
        ));
    }
    if next == ListingStatus::Published {
        validate_for_publish(&ListingForm::from(&listing))?;
    }

    // 상태를 읽은 뒤 결제가 끝났을 수 있으므로 현재 상태를 조건으로 건다
    let sql = format!(
        "UPDATE listings SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 {RETURNING_LISTING}"
    );
    sqlx::query_as::<_, Listing>(&sql)
        .bind(listing_id)
        .bind(current.as_str())
        .bind(next.as_str())
        .fetch_optional(db_manager.pool())
        .await?
        .ok_or_else(|| AppError::conflict("商品のステータスが変更されました。再度お試しください", "STALE_STATUS"))
}

/// 4. 사진 순서 변경
pub async fn move_image<F>(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
    cmd: MoveImageCommand,
    preview: F,
) -> AppResult<ImageSet>
where
    F: Fn(&str) -> String,
{
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    ensure_not_sold(&listing)?;
    let mut images = ImageSet::from_paths(listing.images.clone(), preview);
    images.move_image(cmd.from, cmd.to)?;
    save_images(db_manager, &listing, &images).await?;
    Ok(images)
}

/// 사진 추가
pub async fn attach_image<F>(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
    cmd: AttachImageCommand,
    preview: F,
) -> AppResult<ImageSet>
where
    F: Fn(&str) -> String,
{
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    ensure_not_sold(&listing)?;
    check_image_paths(std::slice::from_ref(&cmd.path), seller_id, &[])?;
    let mut images = ImageSet::from_paths(listing.images.clone(), &preview);
    let preview_url = preview(&cmd.path);
    images.push(cmd.path, preview_url)?;
    save_images(db_manager, &listing, &images).await?;
    Ok(images)
}

/// 사진 삭제
pub async fn remove_image<F>(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
    index: usize,
    preview: F,
) -> AppResult<ImageSet>
where
    F: Fn(&str) -> String,
{
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    ensure_not_sold(&listing)?;
    let published = listing.status() == Some(ListingStatus::Published);
    let mut images = ImageSet::from_paths(listing.images.clone(), preview);
    images.remove_image(index)?;
    if published && images.is_empty() {
        return Err(AppError::Validation(
            "公開中の商品には写真が1枚以上必要です".to_string(),
        ));
    }
    save_images(db_manager, &listing, &images).await?;
    Ok(images)
}

/// 읽었던 사진 목록 그대로일 때만 저장 (동시 편집은 충돌로 돌려보낸다)
async fn save_images(db_manager: &DatabaseManager, listing: &Listing, images: &ImageSet) -> AppResult<()> {
    let saved = sqlx::query(
        "UPDATE listings SET images = $3, updated_at = NOW()
         WHERE id = $1 AND images = $2 AND status <> 'sold'",
    )
    .bind(listing.id)
    .bind(&listing.images)
    .bind(images.files())
    .execute(db_manager.pool())
    .await?
    .rows_affected();
    if saved == 0 {
        return Err(AppError::conflict(
            "商品が更新されました。再度お試しください",
            "STALE_IMAGES",
        ));
    }
    Ok(())
}

/// 5. 삭제
pub async fn delete_listing(
    db_manager: &DatabaseManager,
    seller_id: &str,
    listing_id: i64,
) -> AppResult<()> {
    info!("{:<12} --> 상품 삭제: id={}", "Command", listing_id);
    let listing = load_owned_listing(db_manager, seller_id, listing_id).await?;
    ensure_not_sold(&listing)?;

    let listing_id = listing.id;
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 진행 중인 결제와 겹치지 않도록 상품 행을 잠근다
                let locked: Option<String> =
                    sqlx::query_scalar("SELECT status FROM listings WHERE id = $1 FOR UPDATE")
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                match locked.as_deref() {
                    None => return Err(AppError::NotFound("商品")),
                    Some("sold") => {
                        return Err(AppError::conflict(
                            "売却済みの商品は削除できません",
                            "ALREADY_SOLD",
                        ))
                    }
                    Some(_) => {}
                }

                let recent: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM checkouts
                     WHERE listing_id = $1 AND created_at > NOW() - make_interval(mins => $2)",
                )
                .bind(listing_id)
                .bind(CHECKOUT_HOLD_MINUTES)
                .fetch_one(&mut **tx)
                .await?;
                if recent > 0 {
                    return Err(AppError::conflict(
                        "購入手続き中のため削除できません。しばらくしてから再度お試しください",
                        "CHECKOUT_IN_PROGRESS",
                    ));
                }

                // 중단된 체크아웃 정리 후 삭제
                sqlx::query("DELETE FROM checkouts WHERE listing_id = $1")
                    .bind(listing_id)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("DELETE FROM listings WHERE id = $1")
                    .bind(listing_id)
                    .execute(&mut **tx)
                    .await?;
                Ok(())
            })
        })
        .await
}

/// 레코드 컬럼 바인딩 ($2..$17 순서)
pub(crate) fn bind_record<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    record: &'q ListingRecord,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.brand)
        .bind(record.price)
        .bind(record.original_price)
        .bind(&record.size)
        .bind(&record.color)
        .bind(&record.condition)
        .bind(&record.category)
        .bind(&record.silhouette)
        .bind(&record.neckline)
        .bind(record.bust)
        .bind(record.waist)
        .bind(record.hip)
        .bind(record.length)
        .bind(&record.images)
}

// endregion: --- Commands
