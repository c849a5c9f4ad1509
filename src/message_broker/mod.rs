// region:    --- Imports
use crate::config::AppConfig;
use crate::event_store::Event;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, String> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("enable.idempotence", "true")
            .create()
            .map_err(|e| format!("Producer 생성 실패: {:?}", e))?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), String> {
        debug!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| format!("메시지 전송 실패: {:?}", e))?;

        Ok(())
    }

}

/// 이벤트 발행 트레이트 (이벤트 저장소와 릴레이가 사용)
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_event(&self, topic: &str, event: &Event) -> Result<(), String>;
}

#[async_trait]
impl EventPublisher for KafkaProducer {
    /// 같은 상품의 이벤트가 같은 파티션에 들어가도록 aggregate_id 를 키로 쓴다.
    async fn publish_event(&self, topic: &str, event: &Event) -> Result<(), String> {
        let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
        info!(
            "{:<12} --> 이벤트 발행: type={}, aggregate={}, version={}",
            "Producer", event.event_type, event.aggregate_id, event.version
        );
        self.send_message(topic, &event.aggregate_id.to_string(), &payload)
            .await
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Consumer
pub struct KafkaConsumer {
    consumer: Arc<StreamConsumer>,
}

/// KafkaConsumer 구현
impl KafkaConsumer {
    pub fn new(brokers: &str, group_id: &str) -> Result<Self, String> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| format!("Consumer 생성 실패: {:?}", e))?;

        Ok(KafkaConsumer {
            consumer: Arc::new(consumer),
        })
    }

    /// 이벤트 소비 루프
    ///
    /// 핸들러가 성공한 메시지만 오프셋을 커밋한다. 역직렬화가 불가능한
    /// 메시지는 다시 읽어도 실패하므로 건너뛰고 커밋한다.
    pub async fn consume_events<F, Fut>(&self, topic: &str, handler: F) -> Result<(), HandlerError>
    where
        F: Fn(Event) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        info!("{:<12} --> Kafka 이벤트 소비 시작: topic={}", "Consumer", topic);
        self.consumer.subscribe(&[topic])?;

        loop {
            let message = match self.consumer.recv().await {
                Ok(message) => message,
                Err(e) => {
                    error!("{:<12} --> 메시지 수신 오류: {:?}", "Consumer", e);
                    continue;
                }
            };
            debug!(
                "{:<12} --> 메시지 수신: partition={}, offset={}",
                "Consumer",
                message.partition(),
                message.offset()
            );

            let Some(payload) = message.payload() else {
                warn!("{:<12} --> 빈 페이로드 수신", "Consumer");
                self.consumer.commit_message(&message, CommitMode::Async)?;
                continue;
            };

            match serde_json::from_slice::<Event>(payload) {
                Ok(event) => match handler(event).await {
                    Ok(()) => self.consumer.commit_message(&message, CommitMode::Async)?,
                    Err(e) => error!("{:<12} --> 이벤트 처리 오류 (미커밋): {:?}", "Consumer", e),
                },
                Err(e) => {
                    error!("{:<12} --> 이벤트 역직렬화 오류: {:?}", "Consumer", e);
                    self.consumer.commit_message(&message, CommitMode::Async)?;
                }
            }
        }
    }
}

// endregion: --- Kafka Consumer

// region:    --- Kafka Manager
pub struct KafkaManager {
    producer: Arc<KafkaProducer>,
    consumer: Arc<KafkaConsumer>,
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        let brokers = config.kafka_brokers.clone();

        let producer = Arc::new(KafkaProducer::new(&brokers)?);
        let consumer = Arc::new(KafkaConsumer::new(&brokers, &config.kafka_group_id)?);

        Ok(KafkaManager {
            producer,
            consumer,
            brokers,
        })
    }

    /// 프로듀서 반환
    pub fn get_producer(&self) -> Arc<KafkaProducer> {
        Arc::clone(&self.producer)
    }

    /// 컨슈머 반환
    pub fn get_consumer(&self) -> Arc<KafkaConsumer> {
        Arc::clone(&self.consumer)
    }

    /// 토픽 생성 (이미 있으면 그대로 사용)
    pub async fn ensure_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), String> {
        info!("{:<12} --> Kafka 토픽 확인: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| format!("AdminClient 생성 실패: {:?}", e))?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );
        let options = AdminOptions::new().request_timeout(Some(Duration::from_secs(10)));

        let results = admin_client
            .create_topics(&[new_topic], &options)
            .await
            .map_err(|e| format!("토픽 생성 요청 실패: {:?}", e))?;

        for result in results {
            match result {
                Ok(name) => info!("{:<12} --> Kafka 토픽 생성: {}", "Manager", name),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    debug!("{:<12} --> Kafka 토픽 이미 존재: {}", "Manager", name)
                }
                Err((name, code)) => {
                    error!("{:<12} --> Kafka 토픽 생성 실패: {} {:?}", "Manager", name, code);
                    return Err(format!("토픽 생성 실패: {} {:?}", name, code));
                }
            }
        }
        Ok(())
    }
}

// endregion: --- Kafka Manager
