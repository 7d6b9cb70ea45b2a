use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::middleware::auth::CurrentAdmin,
    api::state::AppState,
    domain::{CreateDietPlan, DietPlanFilter, DietPlanPatch, MealInput, TargetAudience},
    error::{AppError, Result},
};

fn parse_audience(s: &str) -> Result<TargetAudience> {
    TargetAudience::parse(s)
        .ok_or_else(|| AppError::Validation("Invalid target audience".to_string()))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDietPlanDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub meals: Vec<MealInput>,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(dto): Json<CreateDietPlanDto>,
) -> Result<(StatusCode, Json<Value>)> {
    dto.validate()?;

    let target_audience = match dto.target_audience.as_deref() {
        Some(s) => parse_audience(s)?,
        None => TargetAudience::General,
    };

    let (plan, pdf_generated) = state
        .service_context
        .diet_plan_service
        .create(
            CreateDietPlan {
                title: dto.title,
                target_audience,
                meals: dto.meals,
                duration: dto.duration,
                notes: dto.notes,
            },
            current.admin.id,
        )
        .await?;

    let message = if pdf_generated {
        "Diet plan created successfully with PDF"
    } else {
        "Diet plan created successfully (PDF generation failed)"
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message,
            "pdfGenerated": pdf_generated,
            "dietPlan": plan,
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub target_audience: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let target_audience = match params.target_audience.as_deref() {
        None | Some("") => None,
        Some(s) => Some(parse_audience(s)?),
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);

    let result = state
        .service_context
        .diet_plan_service
        .list(&DietPlanFilter {
            search: params.search,
            target_audience,
            page,
            limit,
        })
        .await?;
    let total_pages = (result.total + limit - 1) / limit;
    let count = result.items.len();

    Ok(Json(json!({
        "success": true,
        "dietPlans": result.items,
        "pagination": {
            "current": page,
            "total": total_pages,
            "count": count,
            "totalPlans": result.total,
        },
    })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    let plan = state.service_context.diet_plan_service.get(id).await?;

    Ok(Json(json!({
        "success": true,
        "dietPlan": plan,
    })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDietPlanDto {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub target_audience: Option<String>,
    pub meals: Option<Vec<MealInput>>,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateDietPlanDto>,
) -> Result<Json<Value>> {
    dto.validate()?;

    let target_audience = match dto.target_audience.as_deref() {
        None => None,
        Some(s) => Some(parse_audience(s)?),
    };

    let (plan, pdf_regenerated) = state
        .service_context
        .diet_plan_service
        .update(
            id,
            DietPlanPatch {
                title: dto.title,
                target_audience,
                meals: dto.meals,
                duration: dto.duration,
                notes: dto.notes,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Diet plan updated successfully",
        "pdfRegenerated": pdf_regenerated,
        "dietPlan": plan,
    })))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>> {
    state.service_context.diet_plan_service.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Diet plan deleted successfully",
    })))
}
