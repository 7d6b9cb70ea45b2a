use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    config::SmsConfig,
    error::{AppError, Result},
};

/// Outbound SMS delivery. Callers treat failures as best-effort: a
/// member-status change or an OTP issuance is never blocked by the
/// gateway being down.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

pub struct HttpSmsSender {
    config: SmsConfig,
    client: reqwest::Client,
}

impl HttpSmsSender {
    pub fn new(config: Option<SmsConfig>) -> Option<Self> {
        config.and_then(|cfg| {
            if !cfg.enabled {
                return None;
            }
            let client = match reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Failed to build SMS client: {}", e);
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

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.config.gateway_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&json!({
                "to": to,
                "from": self.config.sender_id,
                "message": body,
            }))
            .send()
            .await
            .map_err(|e| AppError::External(format!("SMS gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "SMS gateway returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Stand-in used when no gateway is configured: logs the message and
/// reports success so the calling flow proceeds as in production.
pub struct NullSmsSender;

#[async_trait]
impl SmsSender for NullSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        tracing::info!("SMS gateway disabled; would send to {}: {}", to, body);
        Ok(())
    }
}

pub fn sms_sender_from_config(config: Option<SmsConfig>) -> Arc<dyn SmsSender> {
    match HttpSmsSender::new(config) {
        Some(sender) => Arc::new(sender),
        None => Arc::new(NullSmsSender),
    }
}
