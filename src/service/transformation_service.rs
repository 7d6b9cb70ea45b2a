use std::sync::Arc;

use crate::{
    domain::{TransformationEntry, TransformationInput, GALLERY_CAPACITY},
    error::{AppError, Result},
    integrations::ImageStore,
    repository::TransformationRepository,
};

const IMAGE_FOLDER: &str = "transformations";

/// Keyed before/after galleries for the public site. Saving a gallery
/// uploads every submitted image through the store before the record is
/// written, so stored entries only ever carry durable URLs.
pub struct TransformationService {
    repo: Arc<dyn TransformationRepository>,
    images: Option<Arc<dyn ImageStore>>,
}

impl TransformationService {
    pub fn new(
        repo: Arc<dyn TransformationRepository>,
        images: Option<Arc<dyn ImageStore>>,
    ) -> Self {
        Self { repo, images }
    }

    /// Unsaved keys read as an empty gallery, not an error.
    pub async fn gallery(&self, key: &str) -> Result<Vec<TransformationEntry>> {
        Ok(self
            .repo
            .find_by_key(key)
            .await?
            .map(|set| set.entries)
            .unwrap_or_default())
    }

    /// Replaces the gallery for `key`. Submissions beyond the capacity
    /// are dropped from the tail; both images are required per entry.
    pub async fn replace_gallery(
        &self,
        key: &str,
        mut inputs: Vec<TransformationInput>,
    ) -> Result<Vec<TransformationEntry>> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| AppError::External("Image storage not configured".to_string()))?;

        inputs.truncate(GALLERY_CAPACITY);

        let mut entries = Vec::with_capacity(inputs.len());
        for input in inputs {
            let before = input
                .before_image
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("before and after images are required".to_string())
                })?;
            let after = input
                .after_image
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("before and after images are required".to_string())
                })?;

            let before_image = images.store(before, IMAGE_FOLDER).await?;
            let after_image = images.store(after, IMAGE_FOLDER).await?;

            entries.push(TransformationEntry {
                name: input.name.unwrap_or_default(),
                duration: input.duration.unwrap_or_default(),
                weight_lost: input.weight_lost.unwrap_or_default(),
                before_image,
                after_image,
            });
        }

        Ok(self.repo.upsert(key, &entries).await?.entries)
    }
}
