/// 상품 사진 저장소
// region:    --- Imports
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Object Path
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// 허용 이미지 형식의 확장자
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// 저장 경로: listings/{user}/{millis}-{seq}.{ext}
pub fn object_path(user_id: &str, extension: &str) -> String {
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "listings/{}/{}-{}.{}",
        user_id,
        Utc::now().timestamp_millis(),
        seq,
        extension
    )
}

/// 해당 사용자가 업로드한 경로인지 (listings/{user}/ 아래, 상위 경로 금지)
pub fn is_user_path(user_id: &str, path: &str) -> bool {
    let prefix = format!("listings/{user_id}/");
    path.strip_prefix(&prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.split('/').any(|part| part == ".."))
}
// endregion: --- Object Path

// region:    --- Image Storage Trait
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), String>;
    fn public_url(&self, path: &str) -> String;
}
// endregion: --- Image Storage Trait

// region:    --- Hosted Storage Client
/// REST 스토리지 클라이언트 (공개 버킷)
pub struct HostedStorageClient {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl HostedStorageClient {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ImageStorage for HostedStorageClient {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), String> {
        info!(
            "{:<12} --> 이미지 업로드: {} ({} bytes)",
            "Storage",
            path,
            bytes.len()
        );
        let response = self
            .client
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url, self.bucket, path
            ))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                "{:<12} --> 이미지 업로드 실패: status={}, body={}",
                "Storage", status, body
            );
            return Err(format!("upload failed with status {status}"));
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}
// endregion: --- Hosted Storage Client

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_web_images_are_accepted() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/PNG"), Some("png"));
        assert_eq!(extension_for("image/webp; charset=binary"), Some("webp"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn object_paths_are_unique_per_upload() {
        let a = object_path("user-1", "jpg");
        let b = object_path("user-1", "jpg");
        assert!(a.starts_with("listings/user-1/"));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
        assert!(is_user_path("user-1", &a));
        assert!(!is_user_path("user-2", &a));
    }

    #[test]
    fn user_paths_stay_under_own_prefix() {
        assert!(is_user_path("u1", "listings/u1/1-0.jpg"));
        assert!(!is_user_path("u1", "listings/u1/"));
        assert!(!is_user_path("u1", "listings/u1/../u2/1-0.jpg"));
        assert!(!is_user_path("u1", "listings/u10/1-0.jpg"));
        assert!(!is_user_path("u1", "https://cdn.example/listings/u1/1-0.jpg"));
    }

    #[test]
    fn public_url_points_at_public_bucket() {
        let client = HostedStorageClient::new("https://example.test/", "key", "listing-images");
        assert_eq!(
            client.public_url("listings/u/1-0.jpg"),
            "https://example.test/storage/v1/object/public/listing-images/listings/u/1-0.jpg"
        );
    }
}
// endregion: --- Tests
