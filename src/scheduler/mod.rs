/// 판매 정산 스케줄러
/// 결제 후 정산 기간이 지난 판매(pending)를 출금 가능(completed) 상태로 바꾼다.
// region:    --- Imports
use crate::payout::model::SaleStatus;
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Sale Settlement Scheduler
pub struct SaleSettlementScheduler {
    pool: Arc<PgPool>,
    settlement_days: i64,
    interval_secs: u64,
}

impl SaleSettlementScheduler {
    pub fn new(pool: Arc<PgPool>, settlement_days: i64, interval_secs: u64) -> Self {
        Self {
            pool,
            settlement_days,
            interval_secs,
        }
    }

    /// 정산 스케줄러 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let settlement_days = self.settlement_days;
        let period = Duration::from_secs(self.interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = Self::settle_sales(&pool, settlement_days).await {
                    error!(
                        "{:<12} --> 판매 정산 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        });
    }

    /// 정산 기간이 지난 판매 확정
    pub async fn settle_sales(pool: &PgPool, settlement_days: i64) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - ChronoDuration::days(settlement_days);

        // pending -> completed 상태 변경
        let settled = sqlx::query(
            "UPDATE sales SET status = $1
             WHERE status = $2 AND created_at <= $3",
        )
        .bind(SaleStatus::Completed.as_str())
        .bind(SaleStatus::Pending.as_str())
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

        if settled > 0 {
            info!("{:<12} --> {}건의 판매가 정산되었습니다.", "Scheduler", settled);
        } else {
            debug!("{:<12} --> 정산할 판매가 없습니다.", "Scheduler");
        }

        Ok(settled)
    }
}
// endregion: --- Sale Settlement Scheduler
