// region:    --- Imports
use crate::checkout::events::MarketEvent;
use crate::config::EVENTS_TOPIC;
use crate::message_broker::{EventPublisher, HandlerError, KafkaConsumer};
use crate::payout::model::{SaleAmounts, SaleStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Event Model
/// 이벤트 저장소에 저장되는 이벤트 모델
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: i64,
    pub aggregate_id: i64,
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: i64,
}

impl Event {
    /// 마켓 이벤트를 저장용 이벤트로 변환
    pub fn from_market_event(market_event: &MarketEvent, version: i64) -> Result<Self, serde_json::Error> {
        let timestamp = match market_event {
            MarketEvent::PaymentSucceeded { timestamp, .. } => *timestamp,
        };
        Ok(Event {
            id: 0,
            aggregate_id: market_event.aggregate_id(),
            event_type: market_event.event_type().to_string(),
            data: serde_json::to_value(market_event)?,
            timestamp,
            version,
        })
    }
}
// endregion: --- Event Model

// region:    --- Event Store Trait
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("버전 충돌")]
    VersionConflict,

    #[error("{0}")]
    Other(String),
}

/// 이벤트 저장소 트레이트
#[async_trait]
pub trait EventStore {
    async fn append_and_publish_event(&self, event: Event) -> Result<(), AppendError>;
}

/// 이벤트 저장소 구현체
/// 저장에 성공한 이벤트는 발행에 실패해도 유지되고, `EventRelay` 가 다시 발행한다.
pub struct PostgresEventStore {
    pool: Arc<PgPool>,
    publisher: Arc<dyn EventPublisher>,
}

/// 이벤트 저장소 구현체 메서드 구현
#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append_and_publish_event(&self, event: Event) -> Result<(), AppendError> {
        let event_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (aggregate_id, event_type, data, timestamp, version)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (aggregate_id, version) DO NOTHING
            RETURNING id",
        )
        .bind(event.aggregate_id)
        .bind(&event.event_type)
        .bind(&event.data)
        .bind(event.timestamp)
        .bind(event.version)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppendError::Other(e.to_string()))?
        .ok_or(AppendError::VersionConflict)?;

        // 이벤트를 카프카에 발행
        let stored = Event {
            id: event_id,
            ..event
        };
        if let Err(e) = publish_and_mark(&self.pool, self.publisher.as_ref(), &stored).await {
            warn!(
                "{:<12} --> 이벤트 발행 실패, 릴레이 대기: id={}, error={}",
                "EventStore", stored.id, e
            );
        }

        Ok(())
    }
}

/// 이벤트 저장소 생성
impl PostgresEventStore {
    pub fn new(pool: Arc<PgPool>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { pool, publisher }
    }
}

/// 발행 후 published_at 기록
async fn publish_and_mark(
    pool: &PgPool,
    publisher: &dyn EventPublisher,
    event: &Event,
) -> Result<(), String> {
    publisher.publish_event(EVENTS_TOPIC, event).await?;
    sqlx::query("UPDATE events SET published_at = NOW() WHERE id = $1")
        .bind(event.id)
        .execute(pool)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

// endregion: --- Event Store

// region:    --- Event Relay
/// 릴레이 주기 (초)
pub const RELAY_INTERVAL_SECS: u64 = 10;

/// 저장 직후 발행 중인 이벤트와 겹치지 않도록 이만큼 지난 이벤트만 다시 보낸다
const RELAY_GRACE_SECS: i64 = 5;

/// 발행되지 않은 이벤트 재발행
pub struct EventRelay {
    pool: Arc<PgPool>,
    publisher: Arc<dyn EventPublisher>,
}

impl EventRelay {
    pub fn new(pool: Arc<PgPool>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { pool, publisher }
    }

    /// 릴레이 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let publisher = Arc::clone(&self.publisher);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(RELAY_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let cutoff = Utc::now() - ChronoDuration::seconds(RELAY_GRACE_SECS);
                if let Err(e) = Self::relay_pending(&pool, publisher.as_ref(), cutoff).await {
                    error!("{:<12} --> 이벤트 릴레이 오류: {:?}", "EventRelay", e);
                }
            }
        });
    }

    /// cutoff 이전에 저장되고 아직 발행되지 않은 이벤트를 순서대로 발행
    /// 발행에 실패하면 그 자리에서 멈추고 다음 주기에 다시 시도한다.
    pub async fn relay_pending(
        pool: &PgPool,
        publisher: &dyn EventPublisher,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let pending = sqlx::query_as::<_, Event>(
            "SELECT id, aggregate_id, event_type, data, timestamp, version
             FROM events
             WHERE published_at IS NULL AND timestamp <= $1
             ORDER BY id",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        let mut relayed = 0;
        for event in &pending {
            if let Err(e) = publish_and_mark(pool, publisher, event).await {
                warn!(
                    "{:<12} --> 재발행 실패: id={}, error={}",
                    "EventRelay", event.id, e
                );
                break;
            }
            relayed += 1;
        }
        if relayed > 0 {
            info!("{:<12} --> {}건의 이벤트를 재발행했습니다.", "EventRelay", relayed);
        }
        Ok(relayed)
    }
}
// endregion: --- Event Relay

// region:    --- Event Consumer
/// 이벤트 프로젝션 (판매 기록, 상품 상태)
pub struct EventConsumer {
    pool: Arc<PgPool>,
    kafka_consumer: Arc<KafkaConsumer>,
}

impl EventConsumer {
    pub fn new(pool: Arc<PgPool>, kafka_consumer: Arc<KafkaConsumer>) -> Self {
        EventConsumer {
            pool,
            kafka_consumer,
        }
    }

    /// 이벤트 소비 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        if let Err(e) = self
            .kafka_consumer
            .consume_events(EVENTS_TOPIC, move |event| {
                let pool = Arc::clone(&pool);
                async move {
                    Self::process_event(&pool, event)
                        .await
                        .map_err(|e| Box::new(e) as HandlerError)
                }
            })
            .await
        {
            error!("{:<12} --> 이벤트 소비 오류: {:?}", "EventConsume", e);
        }
    }

    /// 이벤트 처리
    pub async fn process_event(pool: &PgPool, event: Event) -> Result<(), sqlx::Error> {
        match event.event_type.as_str() {
            "PaymentSucceeded" => Self::handle_payment_succeeded(pool, &event).await?,
            _ => warn!(
                "{:<12} --> 알 수 없는 이벤트 타입: {}",
                "EventConsume", event.event_type
            ),
        }
        Ok(())
    }

    /// 결제 완료 이벤트 처리
    async fn handle_payment_succeeded(pool: &PgPool, event: &Event) -> Result<(), sqlx::Error> {
        info!("{:<12} --> 결제 완료(PaymentSucceeded)", "EventConsume");
        let market_event: MarketEvent = serde_json::from_value(event.data.clone())
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        let MarketEvent::PaymentSucceeded {
            listing_id,
            seller_id,
            buyer_id,
            amount,
            payment_intent_id,
            shipping,
            timestamp,
        } = market_event;

        let amounts = SaleAmounts::for_amount(amount);

        // 트랜잭션 시작
        let mut tx = pool.begin().await?;

        // 같은 결제가 두 번 소비되어도 판매 기록은 하나
        let sale_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO sales (listing_id, seller_id, buyer_id, payment_intent_id, amount, platform_fee, net_amount, status, shipping, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (payment_intent_id) DO NOTHING
             RETURNING id",
        )
        .bind(listing_id)
        .bind(&seller_id)
        .bind(&buyer_id)
        .bind(&payment_intent_id)
        .bind(amounts.amount)
        .bind(amounts.platform_fee)
        .bind(amounts.net_amount)
        .bind(SaleStatus::Pending.as_str())
        .bind(Json(&shipping))
        .bind(timestamp)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(sale_id) = sale_id else {
            tx.rollback().await?;
            info!(
                "{:<12} --> 이미 처리된 결제: {}",
                "EventConsume", payment_intent_id
            );
            return Ok(());
        };

        sqlx::query("UPDATE listings SET status = 'sold', updated_at = NOW() WHERE id = $1")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM checkouts WHERE payment_intent_id = $1")
            .bind(&payment_intent_id)
            .execute(&mut *tx)
            .await?;

        // 트랜잭션 커밋
        tx.commit().await?;
        info!(
            "{:<12} --> 판매 기록 생성: sale={}, listing={}, net={}",
            "EventConsume", sale_id, listing_id, amounts.net_amount
        );
        Ok(())
    }
}
// endregion: --- Event Consumer

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::shipping::ShippingAddress;

    #[test]
    fn payment_event_is_keyed_by_listing() {
        let market_event = MarketEvent::PaymentSucceeded {
            listing_id: 42,
            seller_id: "seller".into(),
            buyer_id: "buyer".into(),
            amount: 150_000,
            payment_intent_id: "pi_123".into(),
            shipping: ShippingAddress::default(),
            timestamp: Utc::now(),
        };

        let event = Event::from_market_event(&market_event, 3).unwrap();
        assert_eq!(event.aggregate_id, 42);
        assert_eq!(event.version, 3);
        assert_eq!(event.event_type, "PaymentSucceeded");

        let decoded: MarketEvent = serde_json::from_value(event.data).unwrap();
        assert_eq!(decoded.aggregate_id(), 42);
    }
}
// endregion: --- Tests
