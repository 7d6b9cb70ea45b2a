use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{
        normalize_meals, nutrition_totals, validate_nutrition, CreateDietPlan, DietPlan,
        DietPlanFilter, DietPlanPatch,
    },
    error::{AppError, Result},
    integrations::PdfPublisher,
    repository::{DietPlanRepository, Page},
};

/// Diet-plan authoring plus coordination with the external PDF
/// renderer/storage. PDF work is dispatched after the domain write
/// succeeds and its failure never rolls that write back.
pub struct DietPlanService {
    repo: Arc<dyn DietPlanRepository>,
    publisher: Option<Arc<dyn PdfPublisher>>,
}

impl DietPlanService {
    pub fn new(repo: Arc<dyn DietPlanRepository>, publisher: Option<Arc<dyn PdfPublisher>>) -> Self {
        Self { repo, publisher }
    }

    pub async fn create(&self, input: CreateDietPlan, author: Uuid) -> Result<(DietPlan, bool)> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }

        let meals = normalize_meals(input.meals);
        validate_nutrition(&meals)?;
        let (total_calories, total_protein) = nutrition_totals(&meals);

        let now = Utc::now();
        let plan = DietPlan {
            id: Uuid::new_v4(),
            title: input.title,
            target_audience: input.target_audience,
            meals,
            total_calories,
            total_protein,
            duration: input.duration.unwrap_or_else(|| "1 week".to_string()),
            notes: input.notes,
            pdf_url: None,
            pdf_storage_id: None,
            created_by: author,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut plan = self.repo.insert(&plan).await?;
        let pdf_generated = self.generate_pdf(&mut plan).await;
        Ok((plan, pdf_generated))
    }

    pub async fn get(&self, id: Uuid) -> Result<DietPlan> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound("Diet plan not found".to_string()))
    }

    pub async fn list(&self, filter: &DietPlanFilter) -> Result<Page<DietPlan>> {
        self.repo.list(filter).await
    }

    pub async fn update(&self, id: Uuid, patch: DietPlanPatch) -> Result<(DietPlan, bool)> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Diet plan not found".to_string()))?;

        // Edits to the rendered content invalidate the stored PDF.
        let content_changed =
            patch.meals.is_some() || patch.title.is_some() || patch.notes.is_some();

        let meals = match patch.meals {
            Some(inputs) => {
                let meals = normalize_meals(inputs);
                validate_nutrition(&meals)?;
                meals
            }
            None => current.meals.clone(),
        };
        let (total_calories, total_protein) = nutrition_totals(&meals);

        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(AppError::Validation("title is required".to_string()));
            }
        }

        let updated = DietPlan {
            title: patch.title.unwrap_or_else(|| current.title.clone()),
            target_audience: patch.target_audience.unwrap_or(current.target_audience),
            meals,
            total_calories,
            total_protein,
            duration: patch.duration.unwrap_or_else(|| current.duration.clone()),
            notes: patch.notes.or_else(|| current.notes.clone()),
            ..current.clone()
        };

        let mut updated = self.repo.update(&updated).await?;

        let mut pdf_regenerated = false;
        if content_changed {
            self.discard_pdf(&current).await;
            pdf_regenerated = self.generate_pdf(&mut updated).await;
        }

        Ok((updated, pdf_regenerated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Diet plan not found".to_string()))?;

        self.discard_pdf(&current).await;

        self.repo.soft_delete(id).await?;
        Ok(())
    }

    // Best-effort publish; returns whether a PDF is now stored.
    async fn generate_pdf(&self, plan: &mut DietPlan) -> bool {
        let Some(publisher) = &self.publisher else {
            return false;
        };

        match publisher.publish(plan).await {
            Ok(stored) => {
                if let Err(e) = self.repo.set_pdf(plan.id, Some(&stored)).await {
                    tracing::error!("Failed to record PDF for plan {}: {}", plan.id, e);
                    return false;
                }
                plan.pdf_url = Some(stored.url);
                plan.pdf_storage_id = Some(stored.storage_id);
                true
            }
            Err(e) => {
                tracing::warn!("PDF generation for plan {} failed: {}", plan.id, e);
                false
            }
        }
    }

    // Best-effort delete of the previously stored PDF.
    async fn discard_pdf(&self, plan: &DietPlan) {
        if let (Some(publisher), Some(storage_id)) =
            (&self.publisher, plan.pdf_storage_id.as_deref())
        {
            if let Err(e) = publisher.discard(storage_id).await {
                tracing::warn!("Failed to delete stored PDF {}: {}", storage_id, e);
            }
        }
    }
}
