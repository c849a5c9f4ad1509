// region:    --- Imports
use crate::error::AppError;
use crate::storage::is_user_path;
use serde::Serialize;

// endregion: --- Imports

/// 상품당 최대 사진 수
pub const MAX_IMAGES: usize = 10;

/// 저장 전 사진 목록 검증
/// 장수 제한은 초안에도 적용되고, 새로 들어온 경로는 판매자 본인 업로드여야 한다.
/// `existing` 은 이미 상품에 붙어 있던 경로 (편집 시).
pub fn check_image_paths(
    paths: &[String],
    seller_id: &str,
    existing: &[String],
) -> Result<(), AppError> {
    if paths.len() > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "写真は{MAX_IMAGES}枚まで追加できます"
        )));
    }
    let foreign = paths
        .iter()
        .any(|p| !existing.contains(p) && !is_user_path(seller_id, p));
    if foreign {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

// region:    --- Image Set
/// 업로드 파일 경로와 미리보기 URL 목록
///
/// 두 배열은 항상 같은 길이이고 같은 인덱스가 같은 사진을 가리킨다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageSet {
    files: Vec<String>,
    previews: Vec<String>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 경로 목록에서 생성 (미리보기 URL은 `preview` 로 계산)
    pub fn from_paths<F>(paths: Vec<String>, preview: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let previews = paths.iter().map(|p| preview(p)).collect();
        Self {
            files: paths,
            previews,
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn previews(&self) -> &[String] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<String> {
        self.files
    }

    pub fn push(&mut self, file: String, preview: String) -> Result<(), AppError> {
        if self.files.len() >= MAX_IMAGES {
            return Err(AppError::Validation(format!(
                "写真は{MAX_IMAGES}枚まで追加できます"
            )));
        }
        self.files.push(file);
        self.previews.push(preview);
        Ok(())
    }

    /// from 위치의 사진을 to 위치로 이동 (두 배열 동일하게)
    pub fn move_image(&mut self, from: usize, to: usize) -> Result<(), AppError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let file = self.files.remove(from);
        self.files.insert(to, file);
        let preview = self.previews.remove(from);
        self.previews.insert(to, preview);
        Ok(())
    }

    /// index 위치의 사진 한 장 삭제
    pub fn remove_image(&mut self, index: usize) -> Result<(String, String), AppError> {
        self.check_index(index)?;
        Ok((self.files.remove(index), self.previews.remove(index)))
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index < self.files.len() {
            Ok(())
        } else {
            Err(AppError::Validation("指定された写真が見つかりません".to_string()))
        }
    }
}
// endregion: --- Image Set

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: usize) -> ImageSet {
        ImageSet::from_paths((0..n).map(|i| format!("f{i}")).collect(), |p| {
            format!("https://cdn/{p}")
        })
    }

    fn assert_paired(images: &ImageSet) {
        assert_eq!(images.files().len(), images.previews().len());
        for (file, preview) in images.files().iter().zip(images.previews()) {
            assert_eq!(preview, &format!("https://cdn/{file}"));
        }
    }

    #[test]
    fn move_forward_and_backward_keeps_pairs() {
        let mut images = set(5);
        images.move_image(0, 3).unwrap();
        assert_eq!(images.files(), ["f1", "f2", "f3", "f0", "f4"]);
        assert_paired(&images);

        images.move_image(4, 1).unwrap();
        assert_eq!(images.files(), ["f1", "f4", "f2", "f3", "f0"]);
        assert_paired(&images);
    }

    #[test]
    fn remove_shifts_later_indices_down() {
        let mut images = set(4);
        let (file, preview) = images.remove_image(1).unwrap();
        assert_eq!(file, "f1");
        assert_eq!(preview, "https://cdn/f1");
        assert_eq!(images.files(), ["f0", "f2", "f3"]);
        assert_eq!(images.len(), 3);
        assert_paired(&images);
    }

    #[test]
    fn out_of_range_leaves_arrays_untouched() {
        let mut images = set(3);
        let before = images.clone();
        assert!(images.move_image(0, 3).is_err());
        assert!(images.remove_image(3).is_err());
        assert_eq!(images, before);
    }

    #[test]
    fn push_respects_limit() {
        let mut images = set(MAX_IMAGES - 1);
        assert!(images.push("last".into(), "https://cdn/last".into()).is_ok());
        assert!(images.push("extra".into(), "https://cdn/extra".into()).is_err());
        assert_eq!(images.len(), MAX_IMAGES);
        assert_paired(&images);
    }

    fn own_paths(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("listings/s1/{i}.jpg")).collect()
    }

    #[test]
    fn image_paths_are_limited_to_ten() {
        assert!(check_image_paths(&own_paths(MAX_IMAGES), "s1", &[]).is_ok());
        assert!(matches!(
            check_image_paths(&own_paths(MAX_IMAGES + 1), "s1", &[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn image_paths_must_belong_to_seller() {
        let mut paths = own_paths(2);
        paths.push("listings/other/1.jpg".into());
        assert!(matches!(
            check_image_paths(&paths, "s1", &[]),
            Err(AppError::Forbidden)
        ));
        // 이미 붙어 있던 경로는 그대로 둘 수 있다
        let existing = vec!["listings/other/1.jpg".to_string()];
        assert!(check_image_paths(&paths, "s1", &existing).is_ok());
    }
}
// endregion: --- Tests
