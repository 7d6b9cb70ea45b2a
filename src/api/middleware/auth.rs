use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{api::state::AppState, domain::Admin, error::AppError};

#[derive(Clone)]
pub struct CurrentAdmin {
    pub admin: Admin,
}

/// Guards admin endpoints: validates the bearer token, resolves the
/// admin behind it, and exposes it to handlers as a request extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or(AppError::Unauthorized)?;

    let admin = state
        .service_context
        .auth_service
        .admin_for_token(&token)
        .await?;

    request.extensions_mut().insert(CurrentAdmin { admin });

    Ok(next.run(request).await)
}
