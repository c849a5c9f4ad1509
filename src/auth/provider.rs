// region:    --- Imports
use super::{classify_auth_failure, AuthError, AuthUser, Credentials, Session};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Auth Provider Trait
/// 호스팅 인증 서비스 트레이트
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Session, AuthError>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
    async fn change_email(&self, access_token: &str, new_email: &str) -> Result<AuthUser, AuthError>;
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
// endregion: --- Auth Provider Trait

// region:    --- Hosted Auth Client
/// REST 인증 서비스 클라이언트
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, AuthError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        let err = classify_auth_failure(status, &body);
        warn!("{:<12} --> 인증 서비스 요청 실패: {:?}", "Auth", err);
        Err(err)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AuthError> {
        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        info!("{:<12} --> 회원 가입 요청", "Auth");
        let response = Self::send(
            self.request(reqwest::Method::POST, "/signup")
                .json(credentials),
        )
        .await?;
        Self::parse(response).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        info!("{:<12} --> 로그인 요청", "Auth");
        let response = Self::send(
            self.request(reqwest::Method::POST, "/token?grant_type=password")
                .json(credentials),
        )
        .await?;
        Self::parse(response).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        info!("{:<12} --> 비밀번호 재설정 메일 요청", "Auth");
        Self::send(
            self.request(reqwest::Method::POST, "/recover")
                .json(&json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn change_email(&self, access_token: &str, new_email: &str) -> Result<AuthUser, AuthError> {
        info!("{:<12} --> 이메일 변경 요청", "Auth");
        let response = Self::send(
            self.request(reqwest::Method::PUT, "/user")
                .bearer_auth(access_token)
                .json(&json!({ "email": new_email })),
        )
        .await?;
        Self::parse(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = Self::send(
            self.request(reqwest::Method::GET, "/user")
                .bearer_auth(access_token),
        )
        .await?;
        Self::parse(response).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        info!("{:<12} --> 로그아웃 요청", "Auth");
        Self::send(
            self.request(reqwest::Method::POST, "/logout")
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }
}
// endregion: --- Hosted Auth Client
