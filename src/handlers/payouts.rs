// region:    --- Imports
use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::payout::commands::{self, AddBankAccountCommand, WithdrawCommand};
use crate::payout::model::{Balance, BankAccountView, Sale, Withdrawal};
use crate::query;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

// region:    --- Sales & Balance

/// 판매 이력
pub async fn handle_get_sales(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Vec<Sale>>> {
    info!("{:<12} --> 판매 이력 조회 seller: {}", "HandlerQuery", user.id);
    Ok(Json(query::handlers::get_seller_sales(&state.db, &user.id).await?))
}

/// 잔액 (정산 대기 / 출금 가능 / 출금 완료)
pub async fn handle_get_balance(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Balance>> {
    Ok(Json(query::handlers::get_balance(&state.db, &user.id).await?))
}

pub async fn handle_get_withdrawals(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Withdrawal>>> {
    Ok(Json(query::handlers::get_withdrawals(&state.db, &user.id).await?))
}

/// 출금 신청
pub async fn handle_withdraw(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<WithdrawCommand>,
) -> AppResult<(StatusCode, Json<Withdrawal>)> {
    let withdrawal = commands::request_withdrawal(&state.db, &user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

// endregion: --- Sales & Balance

// region:    --- Bank Accounts

pub async fn handle_get_bank_accounts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<BankAccountView>>> {
    let accounts = query::handlers::get_bank_accounts(&state.db, &user.id).await?;
    Ok(Json(accounts.into_iter().map(BankAccountView::from).collect()))
}

pub async fn handle_add_bank_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<AddBankAccountCommand>,
) -> AppResult<(StatusCode, Json<BankAccountView>)> {
    let account = commands::add_bank_account(&state.db, &user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn handle_set_default_bank_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
) -> AppResult<Json<BankAccountView>> {
    let account = commands::set_default_bank_account(&state.db, &user.id, account_id).await?;
    Ok(Json(account.into()))
}

pub async fn handle_delete_bank_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(account_id): Path<i64>,
) -> AppResult<StatusCode> {
    commands::delete_bank_account(&state.db, &user.id, account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Bank Accounts
