//! 서비스 설정
//!
//! 모든 설정은 환경 변수(또는 `.env`)에서 읽는다.
// region:    --- Imports
use crate::error::AppError;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Defaults
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_KAFKA_BROKERS: &str = "localhost:9092";
const DEFAULT_KAFKA_GROUP_ID: &str = "market-events-group";
const DEFAULT_PAYMENT_API_URL: &str = "https://api.stripe.com";
const DEFAULT_STORAGE_BUCKET: &str = "listing-images";

/// 마켓 이벤트 토픽
pub const EVENTS_TOPIC: &str = "market-events";

/// 플랫폼 수수료 (%)
pub const PLATFORM_FEE_PERCENT: i64 = 10;
// endregion: --- Defaults

// region:    --- App Config
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub reset_database: bool,
    pub bind_addr: String,
    pub kafka_brokers: String,
    pub kafka_group_id: String,
    pub auth_url: String,
    pub auth_api_key: String,
    pub payment_api_url: String,
    pub payment_secret_key: String,
    pub storage_url: String,
    pub storage_api_key: String,
    pub storage_bucket: String,
    pub settlement_days: i64,
    pub settlement_interval_secs: u64,
    pub admin_user_ids: Vec<String>,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 생성
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            reset_database: parse_or(&lookup, "RESET_DATABASE", false)?,
            bind_addr: or_default("BIND_ADDR", DEFAULT_BIND_ADDR),
            kafka_brokers: or_default("KAFKA_BROKERS", DEFAULT_KAFKA_BROKERS),
            kafka_group_id: or_default("KAFKA_GROUP_ID", DEFAULT_KAFKA_GROUP_ID),
            auth_url: required("AUTH_URL")?,
            auth_api_key: required("AUTH_API_KEY")?,
            payment_api_url: or_default("PAYMENT_API_URL", DEFAULT_PAYMENT_API_URL),
            payment_secret_key: required("PAYMENT_SECRET_KEY")?,
            storage_url: required("STORAGE_URL")?,
            storage_api_key: required("STORAGE_API_KEY")?,
            storage_bucket: or_default("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
            settlement_days: parse_or(&lookup, "SETTLEMENT_DAYS", 7)?,
            settlement_interval_secs: parse_or(&lookup, "SETTLEMENT_INTERVAL_SECS", 60)?,
            admin_user_ids: lookup("ADMIN_USER_IDS")
                .map(|ids| {
                    ids.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.iter().any(|id| id == user_id)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}
// endregion: --- App Config

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/hanatsugu"),
            ("AUTH_URL", "http://auth.local"),
            ("AUTH_API_KEY", "anon"),
            ("PAYMENT_SECRET_KEY", "sk_test"),
            ("STORAGE_URL", "http://storage.local"),
            ("STORAGE_API_KEY", "service"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, AppError> {
        AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn applies_defaults() {
        let config = load(&base()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.kafka_brokers, "localhost:9092");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.settlement_days, 7);
        assert!(!config.reset_database);
        assert!(config.admin_user_ids.is_empty());
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let mut vars = base();
        vars.remove("DATABASE_URL");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let mut vars = base();
        vars.insert("SETTLEMENT_DAYS", "a week");
        assert!(matches!(load(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn admin_ids_are_split_and_trimmed() {
        let mut vars = base();
        vars.insert("ADMIN_USER_IDS", " admin-1, ,admin-2 ");
        let config = load(&vars).unwrap();
        assert_eq!(config.admin_user_ids, vec!["admin-1", "admin-2"]);
        assert!(config.is_admin("admin-2"));
        assert!(!config.is_admin("seller"));
    }
}
// endregion: --- Tests
