use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::ImagesConfig,
    error::{AppError, Result},
};

/// Stores an image from a client-supplied source (a data URL or a
/// remote URL) and returns the public URL of the stored copy.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, source: &str, folder: &str) -> Result<String>;
}

pub struct HttpImageStore {
    config: ImagesConfig,
    client: reqwest::Client,
}

impl HttpImageStore {
    pub fn new(config: Option<ImagesConfig>) -> Option<Self> {
        config.and_then(|cfg| {
            if !cfg.enabled {
                return None;
            }
            let client = match reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Failed to build image store client: {}", e);
                    return None;
                }
            };
            Some(Self {
                config: cfg,
                client,
            })
        })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn store(&self, source: &str, folder: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.config.upload_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&json!({
                "source": source,
                "folder": folder,
            }))
            .send()
            .await
            .map_err(|e| AppError::External(format!("Image upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "Image store returned {}",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Invalid image store response: {}", e)))?;

        Ok(uploaded.url)
    }
}
