// region:    --- Imports
use hanatsugu::auth::HostedAuthClient;
use hanatsugu::checkout::payment::StripeGateway;
use hanatsugu::config::{AppConfig, EVENTS_TOPIC};
use hanatsugu::database::DatabaseManager;
use hanatsugu::event_store::{EventConsumer, EventRelay};
use hanatsugu::message_broker::KafkaManager;
use hanatsugu::routes;
use hanatsugu::scheduler::SaleSettlementScheduler;
use hanatsugu::state::AppState;
use hanatsugu::storage::HostedStorageClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 가 있으면 환경 변수로 로드
    dotenvy::dotenv().ok();

    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Arc::new(AppConfig::from_env()?);

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database(config.reset_database).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 토픽 확인
    let kafka_manager = KafkaManager::new(&config)?;
    if let Err(e) = kafka_manager.ensure_topic(EVENTS_TOPIC, 5, 1).await {
        error!("{:<12} --> Kafka 초기화 실패: {}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    // 이벤트 프로젝션 시작
    let event_consumer = EventConsumer::new(db_manager.get_pool(), kafka_manager.get_consumer());
    tokio::spawn(async move {
        event_consumer.start().await;
    });

    // 발행되지 않은 이벤트 릴레이
    let relay = EventRelay::new(db_manager.get_pool(), kafka_manager.get_producer());
    relay.start().await;

    // 판매 정산 스케줄러
    let scheduler = SaleSettlementScheduler::new(
        db_manager.get_pool(),
        config.settlement_days,
        config.settlement_interval_secs,
    );
    scheduler.start().await;

    let state = AppState {
        db: Arc::clone(&db_manager),
        producer: kafka_manager.get_producer(),
        auth: Arc::new(HostedAuthClient::new(&config.auth_url, &config.auth_api_key)),
        payments: Arc::new(StripeGateway::new(
            &config.payment_api_url,
            &config.payment_secret_key,
        )),
        storage: Arc::new(HostedStorageClient::new(
            &config.storage_url,
            &config.storage_api_key,
            &config.storage_bucket,
        )),
        config: Arc::clone(&config),
    };

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes::router(state).into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
