// region:    --- Imports
use crate::auth::AuthProvider;
use crate::checkout::payment::PaymentGateway;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::event_store::PostgresEventStore;
use crate::message_broker::KafkaProducer;
use crate::storage::ImageStorage;
use std::sync::Arc;

// endregion: --- Imports

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub producer: Arc<KafkaProducer>,
    pub auth: Arc<dyn AuthProvider>,
    pub payments: Arc<dyn PaymentGateway>,
    pub storage: Arc<dyn ImageStorage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 요청마다 이벤트 저장소 생성
    pub fn event_store(&self) -> PostgresEventStore {
        PostgresEventStore::new(self.db.get_pool(), Arc::clone(&self.producer) as _)
    }

    /// 저장 경로 -> 공개 URL
    pub fn image_url(&self, path: &str) -> String {
        self.storage.public_url(path)
    }
}
