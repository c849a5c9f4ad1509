/// 결제 관련 커맨드 처리
/// 1. 결제 의도 생성 (배송지 검증 후)
/// 2. 결제 완료 확인 -> PaymentSucceeded 이벤트
// region:    --- Imports
use super::events::MarketEvent;
use super::payment::{CreateIntentRequest, PaymentGateway};
use super::shipping::ShippingAddress;
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::event_store::{AppendError, Event, EventStore};
use crate::listing::model::{Listing, ListingStatus};
use crate::query::handlers as query;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 결제 의도 생성 명령
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentCommand {
    pub listing_id: i64,
    pub shipping: ShippingAddress,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutIntent {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount: i64,
}

/// 결제 완료 명령
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteCheckoutCommand {
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutCompletion {
    pub listing_id: i64,
    pub amount: i64,
    pub status: &'static str,
}

// 최대 재시도 횟수
const MAX_RETRIES: i32 = 10;

const CURRENCY: &str = "jpy";

fn already_sold() -> AppError {
    AppError::conflict("この商品はすでに購入されています", "ALREADY_SOLD")
}

/// 구매 가능한 상품인지 확인
pub fn ensure_purchasable(listing: &Listing, buyer_id: &str) -> AppResult<()> {
    match listing.status() {
        Some(ListingStatus::Published) => {}
        Some(ListingStatus::Sold) => return Err(already_sold()),
        _ => {
            return Err(AppError::conflict(
                "この商品は現在購入できません",
                "NOT_FOR_SALE",
            ))
        }
    }
    if listing.is_owned_by(buyer_id) {
        return Err(AppError::Validation(
            "自分の商品は購入できません".to_string(),
        ));
    }
    Ok(())
}

/// 1. 결제 의도 생성
pub async fn create_payment_intent(
    db_manager: &DatabaseManager,
    payments: &dyn PaymentGateway,
    buyer_id: &str,
    cmd: CreateIntentCommand,
) -> AppResult<CheckoutIntent> {
    info!(
        "{:<12} --> 결제 의도 생성 요청: listing={}, buyer={}",
        "Command", cmd.listing_id, buyer_id
    );
    let shipping = cmd.shipping.validate()?;

    let listing = query::get_listing(db_manager, cmd.listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;
    ensure_purchasable(&listing, buyer_id)?;
    // 결제 이벤트가 있으면 프로젝션 반영 전이라도 판매 완료
    if query::is_listing_paid(db_manager, listing.id).await? {
        return Err(already_sold());
    }

    let request = CreateIntentRequest {
        amount: listing.price,
        currency: CURRENCY,
        listing_id: listing.id,
        buyer_id: buyer_id.to_string(),
        idempotency_key: format!("checkout-{}-{}-{}", listing.id, buyer_id, listing.price),
    };
    let intent = payments
        .create_payment_intent(&request)
        .await
        .map_err(AppError::Payment)?;

    sqlx::query(
        "INSERT INTO checkouts (payment_intent_id, listing_id, buyer_id, amount, shipping)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (payment_intent_id) DO UPDATE SET shipping = EXCLUDED.shipping",
    )
    .bind(&intent.id)
    .bind(listing.id)
    .bind(buyer_id)
    .bind(intent.amount)
    .bind(Json(&shipping))
    .execute(db_manager.pool())
    .await?;

    Ok(CheckoutIntent {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
        amount: intent.amount,
    })
}

/// 2. 결제 완료 확인
pub async fn complete_checkout(
    db_manager: &DatabaseManager,
    payments: &dyn PaymentGateway,
    event_store: &impl EventStore,
    buyer_id: &str,
    cmd: CompleteCheckoutCommand,
) -> AppResult<CheckoutCompletion> {
    info!(
        "{:<12} --> 결제 완료 처리 시작: intent={}",
        "Command", cmd.payment_intent_id
    );
    let checkout = query::get_checkout(db_manager, &cmd.payment_intent_id)
        .await?
        .ok_or(AppError::NotFound("決済情報"))?;
    if checkout.buyer_id != buyer_id {
        return Err(AppError::Forbidden);
    }

    // 대행사에서 결제 상태 확인
    let intent = payments
        .retrieve_payment_intent(&checkout.payment_intent_id)
        .await
        .map_err(AppError::Payment)?;
    if !intent.is_succeeded() {
        return Err(AppError::conflict(
            format!("決済が完了していません (status: {})", intent.status),
            "PAYMENT_INCOMPLETE",
        ));
    }
    if intent.amount != checkout.amount {
        warn!(
            "{:<12} --> 결제 금액 불일치: intent={}, checkout={}",
            "Command", intent.amount, checkout.amount
        );
        return Err(AppError::Payment("決済金額が一致しません".to_string()));
    }

    let listing = query::get_listing(db_manager, checkout.listing_id)
        .await?
        .ok_or(AppError::NotFound("商品"))?;

    let mut retries = 0;
    while retries < MAX_RETRIES {
        // 현재 버전 조회 (결제 여부보다 먼저 읽어야 사이에 끼어든 결제가 버전 충돌로 잡힌다)
        let current_version = query::get_listing_version(db_manager, listing.id).await?;

        // 이미 결제 완료 이벤트가 있으면 중복 구매 (같은 결제의 재요청이면 완료 응답)
        if query::is_listing_paid(db_manager, listing.id).await? {
            if query::is_payment_recorded(db_manager, &checkout.payment_intent_id).await? {
                return Ok(CheckoutCompletion {
                    listing_id: listing.id,
                    amount: checkout.amount,
                    status: "succeeded",
                });
            }
            warn!(
                "{:<12} --> 이미 결제된 상품: listing={}, intent={}",
                "Command", listing.id, checkout.payment_intent_id
            );
            return Err(already_sold());
        }

        let market_event = MarketEvent::PaymentSucceeded {
            listing_id: listing.id,
            seller_id: listing.seller_id.clone(),
            buyer_id: checkout.buyer_id.clone(),
            amount: checkout.amount,
            payment_intent_id: checkout.payment_intent_id.clone(),
            shipping: checkout.shipping.0.clone(),
            timestamp: Utc::now(),
        };
        let event = Event::from_market_event(&market_event, current_version + 1)
            .map_err(|e| AppError::EventStore(e.to_string()))?;

        // 이벤트 저장 및 발행
        match event_store.append_and_publish_event(event).await {
            Ok(()) => {
                info!(
                    "{:<12} --> PaymentSucceeded 이벤트가 저장되었습니다: listing={}",
                    "Command", listing.id
                );
                return Ok(CheckoutCompletion {
                    listing_id: listing.id,
                    amount: checkout.amount,
                    status: "succeeded",
                });
            }
            Err(AppendError::VersionConflict) => {
                warn!(
                    "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
                    "Command"
                );
                retries += 1;
            }
            Err(AppendError::Other(e)) => return Err(AppError::EventStore(e)),
        }
    }

    Err(AppError::conflict(
        "アクセスが集中しています。時間をおいて再度お試しください",
        "MAX_RETRIES_EXCEEDED",
    ))
}
// endregion: --- Commands

// endregion: --- Tests
