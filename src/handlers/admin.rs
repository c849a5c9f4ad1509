// region:    --- Imports
use super::listings::{views, ListingView};
use crate::admin::import::{import_drafts, ImportBatch, ImportIssue};
use crate::auth::extract::AdminUser;
use crate::error::AppResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub created: Vec<ListingView>,
    /// 공개 조건을 만족하지 못한 초안 (저장은 된다)
    pub issues: Vec<ImportIssue>,
}

/// 일괄 등록 (모두 초안으로 저장)
pub async fn handle_import(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(batch): Json<ImportBatch>,
) -> AppResult<(StatusCode, Json<ImportResult>)> {
    info!(
        "{:<12} --> 일괄 등록 요청: admin={}, count={}",
        "HandlerQuery",
        admin.id,
        batch.len()
    );
    let issues = batch.validate_all();
    let created = import_drafts(&state.db, &admin.id, batch).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportResult {
            created: views(&state, created),
            issues,
        }),
    ))
}
