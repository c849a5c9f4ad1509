/// 관리자 일괄 등록
/// 여러 건의 출품 폼을 탭으로 관리하고, 전체를 초안으로 한 번에 저장한다.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::listing::commands::bind_record;
use crate::listing::images::check_image_paths;
use crate::listing::model::{Listing, ListingStatus};
use crate::listing::wizard::{validate_for_publish, ListingForm};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Import Batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportBatch {
    #[serde(default)]
    drafts: Vec<ListingForm>,
    #[serde(default)]
    active: usize,
}

/// 검증 실패 항목 (탭 번호, 메시지)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportIssue {
    pub index: usize,
    pub message: String,
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drafts(drafts: Vec<ListingForm>) -> Self {
        Self { drafts, active: 0 }
    }

    pub fn drafts(&self) -> &[ListingForm] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn select(&mut self, index: usize) -> AppResult<()> {
        self.check_index(index)?;
        self.active = index;
        Ok(())
    }

    /// 빈 폼 추가 후 새 탭 선택
    pub fn add(&mut self) -> usize {
        self.drafts.push(ListingForm::default());
        self.active = self.drafts.len() - 1;
        self.active
    }

    pub fn update(&mut self, index: usize, form: ListingForm) -> AppResult<()> {
        self.check_index(index)?;
        self.drafts[index] = form;
        Ok(())
    }

    /// 탭 삭제 (선택 탭은 범위 안으로 보정)
    pub fn remove(&mut self, index: usize) -> AppResult<ListingForm> {
        self.check_index(index)?;
        let removed = self.drafts.remove(index);
        if self.active > index || self.active >= self.drafts.len() {
            self.active = self.active.saturating_sub(1);
        }
        Ok(removed)
    }

    /// 전체 검증 (실패한 탭 전부 보고)
    pub fn validate_all(&self) -> Vec<ImportIssue> {
        self.drafts
            .iter()
            .enumerate()
            .filter_map(|(index, form)| {
                validate_for_publish(form).err().map(|e| ImportIssue {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> AppResult<()> {
        if index >= self.drafts.len() {
            return Err(AppError::Validation(format!(
                "{}番目の商品は存在しません",
                index + 1
            )));
        }
        Ok(())
    }
}
// endregion: --- Import Batch

// region:    --- Import Command
/// 전체를 초안 상품으로 저장 (하나라도 실패하면 전부 취소)
pub async fn import_drafts(
    db_manager: &DatabaseManager,
    admin_id: &str,
    batch: ImportBatch,
) -> AppResult<Vec<Listing>> {
    if batch.is_empty() {
        return Err(AppError::Validation(
            "登録する商品がありません".to_string(),
        ));
    }
    info!(
        "{:<12} --> 일괄 등록 시작: admin={}, count={}",
        "Command",
        admin_id,
        batch.len()
    );

    let records: Vec<_> = batch.drafts.iter().map(ListingForm::to_record).collect();
    for record in &records {
        check_image_paths(&record.images, admin_id, &[])?;
    }
    let admin_id = admin_id.to_string();
    let listings = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let sql = "INSERT INTO listings (seller_id, title, description, brand, price, original_price, size, color, condition, category, silhouette, neckline, bust, waist, hip, length, images, status)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                     RETURNING id, seller_id, title, description, brand, price, original_price, size, color, condition, category, silhouette, neckline, bust, waist, hip, length, images, status, created_at, updated_at";
                let mut listings = Vec::with_capacity(records.len());
                for record in &records {
                    let listing = bind_record(sqlx::query_as::<_, Listing>(sql).bind(&admin_id), record)
                        .bind(ListingStatus::Draft.as_str())
                        .fetch_one(&mut **tx)
                        .await?;
                    listings.push(listing);
                }
                Ok::<_, sqlx::Error>(listings)
            })
        })
        .await?;

    info!("{:<12} --> 일괄 등록 완료: {}건", "Command", listings.len());
    Ok(listings)
}
// endregion: --- Import Command

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form(title: &str) -> ListingForm {
        ListingForm {
            images: vec!["listings/a/1.jpg".into()],
            size: "9号".into(),
            bust: Some(82),
            waist: Some(64),
            hip: Some(88),
            brand: "Vera Wang".into(),
            title: title.into(),
            condition: "目立った傷や汚れなし".into(),
            color: "アイボリー".into(),
            category: "Aライン".into(),
            price: "180,000".into(),
            ..ListingForm::default()
        }
    }

    #[test]
    fn add_selects_the_new_tab() {
        let mut batch = ImportBatch::new();
        assert_eq!(batch.add(), 0);
        assert_eq!(batch.add(), 1);
        assert_eq!(batch.active(), 1);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn removing_clamps_active_tab() {
        let mut batch = ImportBatch::new();
        batch.add();
        batch.add();
        batch.add();
        assert_eq!(batch.active(), 2);

        batch.remove(2).unwrap();
        assert_eq!(batch.active(), 1);

        batch.select(1).unwrap();
        batch.remove(0).unwrap();
        assert_eq!(batch.active(), 0);

        batch.remove(0).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.active(), 0);
    }

    #[test]
    fn removing_before_active_keeps_same_draft_selected() {
        let mut batch = ImportBatch::from_drafts(vec![
            complete_form("A"),
            complete_form("B"),
            complete_form("C"),
        ]);
        batch.select(2).unwrap();
        batch.remove(0).unwrap();
        assert_eq!(batch.active(), 1);
        assert_eq!(batch.drafts()[batch.active()].title, "C");
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut batch = ImportBatch::new();
        assert!(batch.update(0, ListingForm::default()).is_err());
        assert!(batch.remove(0).is_err());
        assert!(batch.select(3).is_err());
    }

    #[test]
    fn validate_all_reports_every_failing_draft() {
        let mut missing_price = complete_form("B");
        missing_price.price.clear();
        let batch = ImportBatch::from_drafts(vec![
            complete_form("A"),
            missing_price,
            ListingForm::default(),
        ]);

        let issues = batch.validate_all();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].index, 1);
        assert_eq!(issues[0].message, "販売価格を正しく入力してください");
        assert_eq!(issues[1].index, 2);
        assert_eq!(issues[1].message, "写真を1枚以上追加してください");
    }
}
// endregion: --- Tests
