use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{api::state::AppState, domain::TransformationInput, error::Result};

/// The one gallery slot the site currently renders.
const HOME_KEY: &str = "home";

pub async fn home_gallery(State(state): State<AppState>) -> Result<Json<Value>> {
    let entries = state
        .service_context
        .transformation_service
        .gallery(HOME_KEY)
        .await?;

    Ok(Json(json!({
        "success": true,
        "transformations": entries,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpsertGalleryRequest {
    #[serde(default)]
    pub transformations: Vec<TransformationInput>,
}

pub async fn upsert_home_gallery(
    State(state): State<AppState>,
    Json(req): Json<UpsertGalleryRequest>,
) -> Result<Json<Value>> {
    let entries = state
        .service_context
        .transformation_service
        .replace_gallery(HOME_KEY, req.transformations)
        .await?;

    Ok(Json(json!({
        "success": true,
        "transformations": entries,
    })))
}
