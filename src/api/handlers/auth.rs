use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{api::handlers::MOBILE_RE, api::state::AppState, error::Result};

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(regex(path = *MOBILE_RE, message = "Invalid mobile number format"))]
    pub mobile: String,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let issued = state
        .service_context
        .auth_service
        .send_otp(&req.mobile)
        .await?;

    let mut body = json!({
        "success": true,
        "message": "OTP sent successfully",
    });
    // Development convenience: surfaces the code when the SMS gateway
    // is not wired up.
    if let Some(code) = issued.debug_code {
        body["otp"] = json!(code);
    }

    Ok(Json(body))
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(regex(path = *MOBILE_RE, message = "Invalid mobile number format"))]
    pub mobile: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let (admin, token) = state
        .service_context
        .auth_service
        .verify_otp(&req.mobile, &req.otp)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "admin": {
            "id": admin.id,
            "name": admin.name,
            "mobile": admin.mobile,
        },
    })))
}
