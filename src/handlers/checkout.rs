// region:    --- Imports
use crate::auth::CurrentUser;
use crate::checkout::commands::{
    self, CheckoutCompletion, CheckoutIntent, CompleteCheckoutCommand, CreateIntentCommand,
};
use crate::checkout::shipping::ShippingAddress;
use crate::error::AppResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

// endregion: --- Imports

/// 배송지 검증 (정규화된 주소 반환)
pub async fn handle_validate_shipping(
    _user: CurrentUser,
    Json(address): Json<ShippingAddress>,
) -> AppResult<Json<ShippingAddress>> {
    Ok(Json(address.validate()?))
}

/// 결제 의도 생성
pub async fn handle_create_intent(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<CreateIntentCommand>,
) -> AppResult<Json<CheckoutIntent>> {
    let intent =
        commands::create_payment_intent(&state.db, state.payments.as_ref(), &user.id, cmd).await?;
    Ok(Json(intent))
}

/// 결제 완료 확인
pub async fn handle_complete_checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(cmd): Json<CompleteCheckoutCommand>,
) -> AppResult<Json<CheckoutCompletion>> {
    let event_store = state.event_store();
    let completion = commands::complete_checkout(
        &state.db,
        state.payments.as_ref(),
        &event_store,
        &user.id,
        cmd,
    )
    .await?;
    Ok(Json(completion))
}
