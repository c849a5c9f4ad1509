//! 결제 대행사 연동
//!
//! 결제 상태 머신은 대행사가 관리하고, 여기서는 결제 의도(payment intent)
//! 생성과 조회만 한다.
// region:    --- Imports
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Payment Model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, Clone)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: &'static str,
    pub listing_id: i64,
    pub buyer_id: String,
    pub idempotency_key: String,
}
// endregion: --- Payment Model

// region:    --- Payment Gateway Trait
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: &CreateIntentRequest) -> Result<PaymentIntent, String>;
    async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent, String>;
}
// endregion: --- Payment Gateway Trait

// region:    --- Stripe Gateway
/// 결제 대행사 REST 클라이언트 (form-encoded API)
pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    async fn read(response: reqwest::Response) -> Result<PaymentIntent, String> {
        let status = response.status();
        if status.is_success() {
            return response.json::<PaymentIntent>().await.map_err(|e| e.to_string());
        }
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        let message = body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        warn!("{:<12} --> 결제 API 오류: status={}, {}", "Payment", status, message);
        Err(message)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(&self, request: &CreateIntentRequest) -> Result<PaymentIntent, String> {
        info!(
            "{:<12} --> 결제 의도 생성: listing={}, amount={}",
            "Payment", request.listing_id, request.amount
        );
        let form = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[listing_id]", request.listing_id.to_string()),
            ("metadata[buyer_id]", request.buyer_id.clone()),
        ];
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent, String> {
        info!("{:<12} --> 결제 의도 조회: {}", "Payment", intent_id);
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, intent_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::read(response).await
    }
}
// endregion: --- Stripe Gateway
