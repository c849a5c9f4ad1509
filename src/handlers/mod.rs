//! HTTP 핸들러
//!
//! 핸들러는 추출기로 사용자와 입력을 받고, 커맨드/쿼리 함수를 호출한 뒤
//! JSON 으로 응답한다. 실패는 모두 `AppError` 응답으로 변환된다.
pub mod account;
pub mod admin;
pub mod checkout;
pub mod listings;
pub mod messages;
pub mod payouts;

use axum::Json;
use serde_json::{json, Value};

/// 헬스 체크
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
