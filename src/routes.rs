// region:    --- Imports
use crate::handlers::{account, admin, checkout, handle_health, listings, messages, payouts};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

// endregion: --- Imports

/// 요청 바디 최대 크기 (이미지 업로드 20MB)
pub const MAX_BODY_BYTES: usize = 1024 * 1024 * 20;

/// 라우터 설정
pub fn router(state: AppState) -> Router {
    // 프런트엔드를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        // 인증
        .route("/auth/signup", post(account::handle_sign_up))
        .route("/auth/signin", post(account::handle_sign_in))
        .route("/auth/password-reset", post(account::handle_password_reset))
        .route("/auth/signout", post(account::handle_sign_out))
        .route("/auth/email", put(account::handle_change_email))
        // 회원
        .route(
            "/me/profile",
            get(account::handle_get_profile).put(account::handle_update_profile),
        )
        .route("/me/listings", get(listings::handle_get_my_listings))
        .route(
            "/me/favorites",
            get(account::handle_get_favorites).post(account::handle_add_favorite),
        )
        .route(
            "/me/favorites/:listing_id",
            delete(account::handle_remove_favorite),
        )
        .route(
            "/me/history",
            get(account::handle_get_history).post(account::handle_record_view),
        )
        // 상품
        .route("/brands", get(listings::handle_get_brands))
        .route("/pricing", get(listings::handle_price_preview))
        .route(
            "/listings",
            get(listings::handle_search_listings).post(listings::handle_create_listing),
        )
        .route(
            "/listings/wizard/validate",
            post(listings::handle_validate_wizard_step),
        )
        .route(
            "/listings/:id",
            get(listings::handle_get_listing)
                .put(listings::handle_update_listing)
                .delete(listings::handle_delete_listing),
        )
        .route("/listings/:id/status", put(listings::handle_change_status))
        .route("/listings/:id/images", post(listings::handle_attach_image))
        .route("/listings/:id/images/move", put(listings::handle_move_image))
        .route(
            "/listings/:id/images/:index",
            delete(listings::handle_remove_image),
        )
        .route("/uploads/images", post(listings::handle_upload_image))
        // 메시지
        .route(
            "/conversations",
            get(messages::handle_get_conversations).post(messages::handle_open_conversation),
        )
        .route(
            "/conversations/:id/messages",
            get(messages::handle_get_messages).post(messages::handle_send_message),
        )
        // 결제
        .route("/checkout/shipping", post(checkout::handle_validate_shipping))
        .route("/checkout/intent", post(checkout::handle_create_intent))
        .route("/checkout/complete", post(checkout::handle_complete_checkout))
        // 정산
        .route("/sales", get(payouts::handle_get_sales))
        .route("/payouts/balance", get(payouts::handle_get_balance))
        .route("/payouts/withdrawals", get(payouts::handle_get_withdrawals))
        .route("/payouts/withdraw", post(payouts::handle_withdraw))
        .route(
            "/bank-accounts",
            get(payouts::handle_get_bank_accounts).post(payouts::handle_add_bank_account),
        )
        .route(
            "/bank-accounts/:id",
            delete(payouts::handle_delete_bank_account),
        )
        .route(
            "/bank-accounts/:id/default",
            put(payouts::handle_set_default_bank_account),
        )
        // 관리자
        .route("/admin/import", post(admin::handle_import))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
