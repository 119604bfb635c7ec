//! Writes the final post image to the output directory

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::core::safe_file_stem;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::ImageCompositor;
use crate::types::RawImage;

/// Stores the generated image as `post_<word>.jpg`
pub struct FileCompositor {
    output_dir: PathBuf,
}

impl FileCompositor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn target_path(&self, item: &str) -> GeneratorResult<PathBuf> {
        let stem = safe_file_stem(item.trim());
        if stem.is_empty() {
            return Err(GeneratorError::invalid(format!("word '{item}' has no file-safe characters")));
        }
        Ok(self.output_dir.join(format!("post_{stem}.jpg")))
    }
}

#[async_trait]
impl ImageCompositor for FileCompositor {
    async fn compose(&self, image: &RawImage, item: &str) -> GeneratorResult<PathBuf> {
        if image.is_empty() {
            return Err(GeneratorError::invalid("cannot compose an empty image"));
        }

        let path = self.target_path(item)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, &image.bytes).await?;

        info!("Post image saved: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_compose_writes_file_named_after_word() {
        let dir = TempDir::new().unwrap();
        let compositor = FileCompositor::new(dir.path().join("out"));
        let image = RawImage::new(vec![0xFF, 0xD8, 0xFF], Some("image/jpeg".to_string()));

        let path = compositor.compose(&image, "well-being").await.unwrap();

        assert_eq!(path, dir.path().join("out").join("post_well-being.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let compositor = FileCompositor::new(dir.path());

        let err = compositor.compose(&RawImage::new(Vec::new(), None), "alpha").await.unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidInput { .. }));
    }

    #[test]
    fn test_unsafe_word_is_rejected() {
        let compositor = FileCompositor::new("/tmp");
        assert!(compositor.target_path("../..").is_err());
    }
}
