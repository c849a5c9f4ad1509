/// 출품 위저드
/// 1. 사진 -> 2. 사이즈/치수 -> 3. 브랜드/상세 -> 4. 가격
/// 단계마다 폼 전체에 대한 검증 함수가 있고, 통과해야 다음 단계로 넘어간다.
// region:    --- Imports
use super::images::MAX_IMAGES;
use super::model::{Listing, ListingRecord};
use super::pricing::{parse_price, parse_yen, MAX_PRICE_YEN};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Listing Form
/// 위저드 전체 입력 값 (편집 화면도 같은 폼을 사용)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingForm {
    pub images: Vec<String>,
    pub size: String,
    pub bust: Option<i32>,
    pub waist: Option<i32>,
    pub hip: Option<i32>,
    pub length: Option<i32>,
    pub brand: String,
    pub title: String,
    pub description: String,
    pub condition: String,
    pub color: String,
    pub category: String,
    pub silhouette: String,
    pub neckline: String,
    pub price: String,
    pub original_price: String,
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn positive(value: Option<i32>) -> bool {
    value.is_some_and(|v| v > 0)
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ListingForm {
    /// 저장용 레코드 조립
    /// 숫자로 해석할 수 없거나 상한을 넘는 가격은 0(정가는 없음)으로 저장한다.
    pub fn to_record(&self) -> ListingRecord {
        ListingRecord {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            brand: self.brand.trim().to_string(),
            price: parse_price(&self.price).unwrap_or(0),
            original_price: parse_price(&self.original_price),
            size: self.size.trim().to_string(),
            color: self.color.trim().to_string(),
            condition: self.condition.trim().to_string(),
            category: self.category.trim().to_string(),
            silhouette: optional_text(&self.silhouette),
            neckline: optional_text(&self.neckline),
            bust: self.bust,
            waist: self.waist,
            hip: self.hip,
            length: self.length,
            images: self.images.clone(),
        }
    }
}

impl From<&Listing> for ListingForm {
    fn from(listing: &Listing) -> Self {
        Self {
            images: listing.images.clone(),
            size: listing.size.clone(),
            bust: listing.bust,
            waist: listing.waist,
            hip: listing.hip,
            length: listing.length,
            brand: listing.brand.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            condition: listing.condition.clone(),
            color: listing.color.clone(),
            category: listing.category.clone(),
            silhouette: listing.silhouette.clone().unwrap_or_default(),
            neckline: listing.neckline.clone().unwrap_or_default(),
            price: listing.price.to_string(),
            original_price: listing
                .original_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
        }
    }
}
// endregion: --- Listing Form

// region:    --- Wizard Steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Photos,
    Measurements,
    BrandDetails,
    Pricing,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Photos,
        WizardStep::Measurements,
        WizardStep::BrandDetails,
        WizardStep::Pricing,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Photos => 1,
            Self::Measurements => 2,
            Self::BrandDetails => 3,
            Self::Pricing => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == n)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// 단계 검증 실패 메시지
    pub fn error_message(self) -> &'static str {
        match self {
            Self::Photos => "写真を1枚以上追加してください",
            Self::Measurements => "サイズと採寸（バスト・ウエスト・ヒップ）を入力してください",
            Self::BrandDetails => "ブランド・タイトル・状態・カラー・カテゴリーを入力してください",
            Self::Pricing => "販売価格を正しく入力してください",
        }
    }
}

/// 단계별 필수 항목 검증
pub fn validate_step(form: &ListingForm, step: WizardStep) -> bool {
    match step {
        WizardStep::Photos => !form.images.is_empty() && form.images.len() <= MAX_IMAGES,
        WizardStep::Measurements => {
            filled(&form.size) && positive(form.bust) && positive(form.waist) && positive(form.hip)
        }
        WizardStep::BrandDetails => {
            filled(&form.brand)
                && filled(&form.title)
                && filled(&form.condition)
                && filled(&form.color)
                && filled(&form.category)
        }
        WizardStep::Pricing => {
            parse_price(&form.price).is_some_and(|p| p > 0)
                && (!filled(&form.original_price) || parse_price(&form.original_price).is_some())
        }
    }
}

pub fn check_step(form: &ListingForm, step: WizardStep) -> Result<(), AppError> {
    if validate_step(form, step) {
        Ok(())
    } else {
        Err(AppError::Validation(step.error_message().to_string()))
    }
}

/// 공개 전 전체 검증 (첫 번째 실패 단계 메시지)
pub fn validate_for_publish(form: &ListingForm) -> Result<(), AppError> {
    WizardStep::ALL
        .into_iter()
        .try_for_each(|step| check_step(form, step))
}
// endregion: --- Wizard Steps

// region:    --- Wizard State
/// 위저드 진행 상태
#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    form: ListingForm,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(ListingForm::default())
    }
}

impl Wizard {
    pub fn new(form: ListingForm) -> Self {
        Self {
            step: WizardStep::Photos,
            form,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &ListingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ListingForm {
        &mut self.form
    }

    /// "다음" 버튼 활성화 여부
    pub fn can_advance(&self) -> bool {
        validate_step(&self.form, self.step)
    }

    pub fn advance(&mut self) -> Result<WizardStep, AppError> {
        check_step(&self.form, self.step)?;
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(next)
            }
            None => Err(AppError::Validation("最後のステップです".to_string())),
        }
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// 제출
    pub fn submit(&self, mode: SubmitMode) -> Result<ListingRecord, AppError> {
        prepare_submission(&self.form, mode)
    }
}
// endregion: --- Wizard State

// region:    --- Submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// 필수 항목 검증 없이 저장
    Draft,
    #[default]
    Publish,
}

pub fn prepare_submission(form: &ListingForm, mode: SubmitMode) -> Result<ListingRecord, AppError> {
    if mode == SubmitMode::Publish {
        validate_for_publish(form)?;
    }
    Ok(form.to_record())
}
// endregion: --- Submission

// region:    --- Edit Validation
/// 편집 화면 전용 검증 (항목별 메시지)
pub fn validate_edit(form: &ListingForm) -> Result<(), AppError> {
    let fail = |message: &str| Err(AppError::Validation(message.to_string()));

    if !filled(&form.title) {
        return fail("商品タイトルを入力してください");
    }
    if !filled(&form.brand) {
        return fail("ブランドを入力してください");
    }
    if !filled(&form.size) {
        return fail("サイズを入力してください");
    }
    if !filled(&form.condition) {
        return fail("商品の状態を選択してください");
    }
    if !filled(&form.price) {
        return fail("価格を入力してください");
    }
    let Some(price) = parse_yen(&form.price).filter(|p| *p > 0) else {
        return fail("価格は1円以上で入力してください");
    };
    if price > MAX_PRICE_YEN {
        return fail("価格は100,000,000円以下で入力してください");
    }
    if filled(&form.original_price) && parse_price(&form.original_price).is_none() {
        return fail("定価を正しく入力してください");
    }
    Ok(())
}
// endregion: --- Edit Validation

// endregion: --- Tests
