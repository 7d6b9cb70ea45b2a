use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{DietPlan, DietPlanFilter, Meal, StoredPdf, TargetAudience},
    error::{AppError, Result},
    repository::{DietPlanRepository, Page},
};

const PLAN_COLUMNS: &str = "id, title, target_audience, meals, total_calories, total_protein, \
     duration, notes, pdf_url, pdf_storage_id, created_by, is_active, created_at, updated_at";

// The meals array lives in a JSON text column; the ordered structure
// has no relational consumers, so a document-style column keeps the
// schema flat.
#[derive(FromRow)]
struct DietPlanRow {
    id: String,
    title: String,
    target_audience: String,
    meals: String,
    total_calories: f64,
    total_protein: f64,
    duration: String,
    notes: Option<String>,
    pdf_url: Option<String>,
    pdf_storage_id: Option<String>,
    created_by: String,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteDietPlanRepository {
    pool: SqlitePool,
}

impl SqliteDietPlanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_plan(row: DietPlanRow) -> Result<DietPlan> {
        let meals: Vec<Meal> = serde_json::from_str(&row.meals)
            .map_err(|e| AppError::Database(format!("Invalid meals payload: {}", e)))?;

        Ok(DietPlan {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            target_audience: TargetAudience::parse(&row.target_audience).ok_or_else(|| {
                AppError::Database(format!("Invalid target audience: {}", row.target_audience))
            })?,
            meals,
            total_calories: row.total_calories,
            total_protein: row.total_protein,
            duration: row.duration,
            notes: row.notes,
            pdf_url: row.pdf_url,
            pdf_storage_id: row.pdf_storage_id,
            created_by: Uuid::parse_str(&row.created_by)
                .map_err(|e| AppError::Database(e.to_string()))?,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn meals_json(meals: &[Meal]) -> Result<String> {
        serde_json::to_string(meals)
            .map_err(|e| AppError::Internal(format!("Failed to encode meals: {}", e)))
    }
}

#[async_trait]
impl DietPlanRepository for SqliteDietPlanRepository {
    async fn insert(&self, plan: &DietPlan) -> Result<DietPlan> {
        sqlx::query(
            r#"
            INSERT INTO diet_plans (
                id, title, target_audience, meals, total_calories, total_protein,
                duration, notes, pdf_url, pdf_storage_id, created_by, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(plan.id.to_string())
        .bind(&plan.title)
        .bind(plan.target_audience.as_str())
        .bind(Self::meals_json(&plan.meals)?)
        .bind(plan.total_calories)
        .bind(plan.total_protein)
        .bind(&plan.duration)
        .bind(&plan.notes)
        .bind(&plan.pdf_url)
        .bind(&plan.pdf_storage_id)
        .bind(plan.created_by.to_string())
        .bind(plan.is_active as i32)
        .bind(plan.created_at.naive_utc())
        .bind(plan.updated_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(plan.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created diet plan".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DietPlan>> {
        let row = sqlx::query_as::<_, DietPlanRow>(&format!(
            "SELECT {} FROM diet_plans WHERE id = ?",
            PLAN_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_plan(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &DietPlanFilter) -> Result<Page<DietPlan>> {
        let push_filters = |qb: &mut QueryBuilder<'_, Sqlite>| {
            qb.push(" WHERE is_active = 1");
            if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
                qb.push(" AND title LIKE ")
                    .push_bind(format!("%{}%", search));
            }
            if let Some(audience) = filter.target_audience {
                qb.push(" AND target_audience = ").push_bind(audience.as_str());
            }
        };

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM diet_plans");
        push_filters(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM diet_plans", PLAN_COLUMNS));
        push_filters(&mut qb);
        qb.push(" ORDER BY created_at DESC");

        let limit = filter.limit.max(1);
        let offset = (filter.page.max(1) - 1) * limit;
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<DietPlanRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = rows
            .into_iter()
            .map(Self::row_to_plan)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, total })
    }

    async fn update(&self, plan: &DietPlan) -> Result<DietPlan> {
        sqlx::query(
            r#"
            UPDATE diet_plans
            SET title = ?,
                target_audience = ?,
                meals = ?,
                total_calories = ?,
                total_protein = ?,
                duration = ?,
                notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&plan.title)
        .bind(plan.target_audience.as_str())
        .bind(Self::meals_json(&plan.meals)?)
        .bind(plan.total_calories)
        .bind(plan.total_protein)
        .bind(&plan.duration)
        .bind(&plan.notes)
        .bind(Utc::now().naive_utc())
        .bind(plan.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(plan.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated diet plan".to_string())
        })
    }

    async fn set_pdf(&self, id: Uuid, pdf: Option<&StoredPdf>) -> Result<()> {
        sqlx::query(
            "UPDATE diet_plans SET pdf_url = ?, pdf_storage_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(pdf.map(|p| p.url.as_str()))
        .bind(pdf.map(|p| p.storage_id.as_str()))
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE diet_plans SET is_active = 0, updated_at = ? WHERE id = ?")
                .bind(Utc::now().naive_utc())
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
