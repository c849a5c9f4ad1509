/// 상품 검색
/// 공개 상품 목록을 받아 메모리에서 필터링/정렬한다.
use super::model::Listing;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub keyword: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub condition: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: SortOrder,
}

fn same(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => wanted.eq_ignore_ascii_case(value.trim()),
    }
}

impl ListingQuery {
    pub fn matches(&self, listing: &Listing) -> bool {
        let keyword_hit = match self.keyword.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(keyword) => {
                let keyword = keyword.to_lowercase();
                [&listing.title, &listing.brand, &listing.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&keyword))
            }
        };

        keyword_hit
            && same(&self.brand, &listing.brand)
            && same(&self.size, &listing.size)
            && same(&self.color, &listing.color)
            && same(&self.condition, &listing.condition)
            && same(&self.category, &listing.category)
            && self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        let mut found: Vec<Listing> = listings.into_iter().filter(|l| self.matches(l)).collect();
        match self.sort {
            SortOrder::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
            SortOrder::PriceAsc => found.sort_by(|a, b| a.price.cmp(&b.price).then(b.id.cmp(&a.id))),
            SortOrder::PriceDesc => found.sort_by(|a, b| b.price.cmp(&a.price).then(b.id.cmp(&a.id))),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn listing(id: i64, brand: &str, title: &str, price: i64, age_days: i64) -> Listing {
        let created = Utc::now() - Duration::days(age_days);
        Listing {
            id,
            seller_id: "seller".into(),
            title: title.into(),
            description: String::new(),
            brand: brand.into(),
            price,
            original_price: None,
            size: "9号".into(),
            color: "ホワイト".into(),
            condition: "未使用に近い".into(),
            category: "Aライン".into(),
            silhouette: None,
            neckline: None,
            bust: None,
            waist: None,
            hip: None,
            length: None,
            images: vec![],
            status: "published".into(),
            created_at: created,
            updated_at: created,
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing(1, "Vera Wang", "Hayley", 250_000, 3),
            listing(2, "Pronovias", "Lace mermaid", 120_000, 1),
            listing(3, "Vera Wang", "Balloon tulle", 180_000, 2),
        ]
    }

    fn ids(found: &[Listing]) -> Vec<i64> {
        found.iter().map(|l| l.id).collect()
    }

    #[test]
    fn empty_query_returns_newest_first() {
        let found = ListingQuery::default().apply(sample());
        assert_eq!(ids(&found), vec![2, 3, 1]);
    }

    #[test]
    fn keyword_is_case_insensitive_over_title_and_brand() {
        let query = ListingQuery {
            keyword: Some("vera".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(sample())), vec![3, 1]);

        let query = ListingQuery {
            keyword: Some("LACE".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(sample())), vec![2]);
    }

    #[test]
    fn price_range_and_sort() {
        let query = ListingQuery {
            min_price: Some(150_000),
            max_price: Some(250_000),
            sort: SortOrder::PriceAsc,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(sample())), vec![3, 1]);

        let query = ListingQuery {
            sort: SortOrder::PriceDesc,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(sample())), vec![1, 3, 2]);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = ListingQuery {
            brand: Some("  ".into()),
            keyword: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query.apply(sample()).len(), 3);
    }

    #[test]
    fn attribute_filters_must_match() {
        let query = ListingQuery {
            brand: Some("pronovias".into()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(sample())), vec![2]);

        let query = ListingQuery {
            size: Some("11号".into()),
            ..Default::default()
        };
        assert!(query.apply(sample()).is_empty());
    }
}
