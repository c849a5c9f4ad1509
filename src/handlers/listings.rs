// region:    --- Imports
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::listing::commands::{
    self, AttachImageCommand, ChangeStatusCommand, CreateListingCommand, MoveImageCommand,
};
use crate::listing::images::ImageSet;
use crate::listing::model::Listing;
use crate::listing::pricing::{discount_percent, PriceBreakdown};
use crate::listing::search::ListingQuery;
use crate::listing::wizard::{validate_step, ListingForm, WizardStep};
use crate::profile::model::Brand;
use crate::query;
use crate::state::AppState;
use crate::storage::{extension_for, object_path, StoredImage};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Views
/// 응답용 상품 (사진 공개 URL, 할인율 포함)
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub image_urls: Vec<String>,
    pub discount_percent: Option<i64>,
}

impl ListingView {
    pub fn new(state: &AppState, listing: Listing) -> Self {
        let image_urls = listing.images.iter().map(|p| state.image_url(p)).collect();
        let discount = listing
            .original_price
            .and_then(|original| discount_percent(listing.price, original));
        Self {
            listing,
            image_urls,
            discount_percent: discount,
        }
    }
}

pub fn views(state: &AppState, listings: Vec<Listing>) -> Vec<ListingView> {
    listings
        .into_iter()
        .map(|listing| ListingView::new(state, listing))
        .collect()
}
// endregion: --- Views

// region:    --- Query Handlers

/// 브랜드 목록
pub async fn handle_get_brands(State(state): State<AppState>) -> AppResult<Json<Vec<Brand>>> {
    info!("{:<12} --> 브랜드 목록 조회", "HandlerQuery");
    Ok(Json(query::handlers::get_brands(&state.db).await?))
}

/// 상품 검색 (공개 상품만)
pub async fn handle_search_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingQuery>,
) -> AppResult<Json<Vec<ListingView>>> {
    info!("{:<12} --> 상품 검색: {:?}", "HandlerQuery", filter);
    let listings = query::handlers::get_published_listings(&state.db).await?;
    Ok(Json(views(&state, filter.apply(listings))))
}

/// 상품 상세
/// 공개/판매 완료 상품은 누구나, 초안/비공개 상품은 판매자만 볼 수 있다.
pub async fn handle_get_listing(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(listing_id): Path<i64>,
) -> AppResult<Json<ListingView>> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "HandlerQuery", listing_id);
    let listing = query::handlers::get_listing(&state.db, listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;

    if !listing.is_visible_to(user.as_ref().map(|u| u.id.as_str())) {
        return Err(AppError::NotFound("商品"));
    }
    Ok(Json(ListingView::new(&state, listing)))
}

/// 내 상품 목록 (모든 상태)
pub async fn handle_get_my_listings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ListingView>>> {
    info!("{:<12} --> 내 상품 조회 user: {}", "HandlerQuery", user.id);
    let listings = query::handlers::get_seller_listings(&state.db, &user.id).await?;
    Ok(Json(views(&state, listings)))
}

#[derive(Debug, Deserialize)]
pub struct PricingParams {
    pub price: String,
    #[serde(default)]
    pub original_price: String,
}

/// 가격 미리보기 (할인율, 수수료, 예상 수령액)
pub async fn handle_price_preview(
    Query(params): Query<PricingParams>,
) -> AppResult<Json<PriceBreakdown>> {
    PriceBreakdown::from_input(&params.price, &params.original_price)
        .map(Json)
        .ok_or_else(|| AppError::Validation(WizardStep::Pricing.error_message().to_string()))
}

#[derive(Debug, Deserialize)]
pub struct WizardCheckRequest {
    pub step: u8,
    pub form: ListingForm,
}

#[derive(Debug, Serialize)]
pub struct WizardCheckResponse {
    pub step: WizardStep,
    pub valid: bool,
    pub message: Option<&'static str>,
    pub next: Option<WizardStep>,
}

/// 위저드 단계 검증 ("다음" 버튼 활성화 판단)
pub async fn handle_validate_wizard_step(
    Json(req): Json<WizardCheckRequest>,
) -> AppResult<Json<WizardCheckResponse>> {
    let step = WizardStep::from_number(req.step)
        .ok_or_else(|| AppError::Validation(format!("不明なステップです: {}", req.step)))?;
    let valid = validate_step(&req.form, step);
    Ok(Json(WizardCheckResponse {
        step,
        valid,
        message: (!valid).then(|| step.error_message()),
        next: if valid { step.next() } else { None },
    }))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 출품 (초안 저장 / 공개)
pub async fn handle_create_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<CreateListingCommand>,
) -> AppResult<(StatusCode, Json<ListingView>)> {
    let listing = commands::create_listing(&state.db, &user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(ListingView::new(&state, listing))))
}

/// 상품 편집
pub async fn handle_update_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Json(form): Json<ListingForm>,
) -> AppResult<Json<ListingView>> {
    let listing = commands::update_listing(&state.db, &user.id, listing_id, form).await?;
    Ok(Json(ListingView::new(&state, listing)))
}

/// 상태 변경
pub async fn handle_change_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<ChangeStatusCommand>,
) -> AppResult<Json<ListingView>> {
    let listing = commands::change_status(&state.db, &user.id, listing_id, cmd.status).await?;
    Ok(Json(ListingView::new(&state, listing)))
}

/// 상품 삭제
pub async fn handle_delete_listing(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
) -> AppResult<StatusCode> {
    commands::delete_listing(&state.db, &user.id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 사진 추가 (업로드된 경로)
pub async fn handle_attach_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<AttachImageCommand>,
) -> AppResult<Json<ImageSet>> {
    let images = commands::attach_image(&state.db, &user.id, listing_id, cmd, |p| state.image_url(p)).await?;
    Ok(Json(images))
}

/// 사진 순서 변경
pub async fn handle_move_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<MoveImageCommand>,
) -> AppResult<Json<ImageSet>> {
    let images = commands::move_image(&state.db, &user.id, listing_id, cmd, |p| state.image_url(p)).await?;
    Ok(Json(images))
}

/// 사진 삭제
pub async fn handle_remove_image(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((listing_id, index)): Path<(i64, usize)>,
) -> AppResult<Json<ImageSet>> {
    let images = commands::remove_image(&state.db, &user.id, listing_id, index, |p| state.image_url(p)).await?;
    Ok(Json(images))
}

/// 이미지 업로드 (본문 = 이미지 바이트)
pub async fn handle_upload_image(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<StoredImage>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let extension = extension_for(&content_type).ok_or_else(|| {
        AppError::Validation("JPEG・PNG・WebP形式の画像を選択してください".to_string())
    })?;
    if body.is_empty() {
        return Err(AppError::Validation("画像ファイルが空です".to_string()));
    }

    let path = object_path(&user.id, extension);
    state
        .storage
        .upload(&path, &content_type, body.to_vec())
        .await
        .map_err(AppError::Storage)?;

    let url = state.image_url(&path);
    Ok((StatusCode::CREATED, Json(StoredImage { path, url })))
}

// endregion: --- Command Handlers
