use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 출품 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub seller_id: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub size: String,
    pub color: String,
    pub condition: String,
    pub category: String,
    pub silhouette: Option<String>,
    pub neckline: Option<String>,
    pub bust: Option<i32>,
    pub waist: Option<i32>,
    pub hip: Option<i32>,
    pub length: Option<i32>,
    pub images: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn status(&self) -> Option<ListingStatus> {
        ListingStatus::parse(&self.status)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.seller_id == user_id
    }

    /// 공개(published, sold) 상품은 누구나, 그 외는 판매자 본인만 볼 수 있다
    pub fn is_visible_to(&self, viewer: Option<&str>) -> bool {
        self.status().is_some_and(ListingStatus::is_public)
            || viewer.is_some_and(|id| self.is_owned_by(id))
    }
}

// 저장 전 상품 레코드 (위저드/편집 화면에서 조립)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub size: String,
    pub color: String,
    pub condition: String,
    pub category: String,
    pub silhouette: Option<String>,
    pub neckline: Option<String>,
    pub bust: Option<i32>,
    pub waist: Option<i32>,
    pub hip: Option<i32>,
    pub length: Option<i32>,
    pub images: Vec<String>,
}

// 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Published,
    Sold,
    Inactive,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Sold => "sold",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "sold" => Some(Self::Sold),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Published | Self::Sold)
    }

    /// 판매자가 직접 바꿀 수 있는 상태 전이인지 확인
    /// sold 는 결제 완료 이벤트로만 진입한다.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ListingStatus::*;
        matches!(
            (self, next),
            (Draft, Published)
                | (Published, Inactive)
                | (Inactive, Published)
                | (Published, Draft)
                | (Inactive, Draft)
        )
    }
}
