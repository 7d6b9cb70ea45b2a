use std::time::Duration;

use askama::Template;
use async_trait::async_trait;
use chrono::Utc;

use crate::{
    config::PdfConfig,
    domain::{DietPlan, Meal, StoredPdf},
    error::{AppError, Result},
};

/// Renders a diet plan to PDF and stores the result. The whole sequence
/// is best-effort from the caller's perspective: a failed publish leaves
/// the plan without a PDF until the next update triggers regeneration.
#[async_trait]
pub trait PdfPublisher: Send + Sync {
    async fn publish(&self, plan: &DietPlan) -> Result<StoredPdf>;
    async fn discard(&self, storage_id: &str) -> Result<()>;
}

#[derive(Template)]
#[template(path = "diet_plan.html")]
struct DietPlanDocument<'a> {
    title: &'a str,
    target_audience: String,
    duration: &'a str,
    total_calories: f64,
    total_protein: f64,
    meals: &'a [Meal],
    notes: &'a str,
    generated_date: String,
}

impl<'a> DietPlanDocument<'a> {
    fn for_plan(plan: &'a DietPlan) -> Self {
        Self {
            title: &plan.title,
            target_audience: plan.target_audience.display(),
            duration: &plan.duration,
            total_calories: plan.total_calories,
            total_protein: plan.total_protein,
            meals: &plan.meals,
            notes: plan.notes.as_deref().unwrap_or(""),
            generated_date: Utc::now().format("%d/%m/%Y").to_string(),
        }
    }
}

/// Sends rendered HTML to a headless-chromium renderer service, then
/// uploads the returned PDF bytes to object storage.
pub struct HttpPdfPublisher {
    config: PdfConfig,
    client: reqwest::Client,
}

impl HttpPdfPublisher {
    pub fn new(config: Option<PdfConfig>) -> Option<Self> {
        config.and_then(|cfg| {
            if !cfg.enabled {
                return None;
            }
            let client = match reqwest::Client::builder()
                .timeout(Duration::from_secs(cfg.timeout_secs))
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("Failed to build PDF renderer client: {}", e);
                    return None;
                }
            };
            Some(Self {
                config: cfg,
                client,
            })
        })
    }

    async fn render(&self, html: String) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.config.renderer_url)
            .header("Content-Type", "text/html")
            .body(html)
            .send()
            .await
            .map_err(|e| AppError::External(format!("PDF renderer request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "PDF renderer returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::External(format!("Failed to read rendered PDF: {}", e)))?;

        Ok(bytes.to_vec())
    }

    async fn upload(&self, storage_id: &str, pdf: Vec<u8>) -> Result<String> {
        let response = self
            .client
            .put(format!("{}/{}", self.config.storage_url, storage_id))
            .header("Authorization", format!("Bearer {}", self.config.storage_api_key))
            .header("Content-Type", "application/pdf")
            .body(pdf)
            .send()
            .await
            .map_err(|e| AppError::External(format!("PDF upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "Object storage returned {}",
                response.status()
            )));
        }

        Ok(format!("{}/{}", self.config.public_base_url, storage_id))
    }
}

#[async_trait]
impl PdfPublisher for HttpPdfPublisher {
    async fn publish(&self, plan: &DietPlan) -> Result<StoredPdf> {
        let html = DietPlanDocument::for_plan(plan)
            .render()
            .map_err(|e| AppError::Internal(format!("Template rendering failed: {}", e)))?;

        let pdf = self.render(html).await?;
        tracing::debug!(
            "Rendered PDF for diet plan {} ({} bytes)",
            plan.id,
            pdf.len()
        );

        let storage_id = format!(
            "diet-plans/plan_{}_{}.pdf",
            plan.id,
            Utc::now().timestamp()
        );
        let url = self.upload(&storage_id, pdf).await?;

        Ok(StoredPdf { url, storage_id })
    }

    async fn discard(&self, storage_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{}", self.config.storage_url, storage_id))
            .header("Authorization", format!("Bearer {}", self.config.storage_api_key))
            .send()
            .await
            .map_err(|e| AppError::External(format!("PDF delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "Object storage returned {} on delete",
                response.status()
            )));
        }

        Ok(())
    }
}
