use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    api::handlers::members::MemberDto,
    api::state::AppState,
    error::Result,
};

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Value>> {
    let analytics = state.service_context.analytics_service.dashboard().await?;

    Ok(Json(json!({
        "success": true,
        "analytics": analytics,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ExpiringParams {
    pub days: Option<i64>,
}

pub async fn expiring_members(
    State(state): State<AppState>,
    Query(params): Query<ExpiringParams>,
) -> Result<Json<Value>> {
    let days = params.days.unwrap_or(7).clamp(1, 365);
    let members = state
        .service_context
        .analytics_service
        .expiring_members(days)
        .await?;
    let members: Vec<MemberDto> = members.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "success": true,
        "count": members.len(),
        "expiringMembers": members,
    })))
}
