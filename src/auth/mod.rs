use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    domain::{Admin, OtpChallenge},
    error::{AppError, Result},
    integrations::SmsSender,
    repository::AdminRepository,
};

/// Bearer-token claims for an authenticated admin.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub mobile: String,
    pub iat: i64,
    pub exp: i64,
}

/// Outcome of an OTP issuance. The code itself is only echoed back when
/// `auth.expose_otp` is enabled (development environments without a
/// working SMS gateway).
pub struct OtpIssued {
    pub debug_code: Option<String>,
}

pub struct AuthService {
    admin_repo: Arc<dyn AdminRepository>,
    sms: Arc<dyn SmsSender>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        admin_repo: Arc<dyn AdminRepository>,
        sms: Arc<dyn SmsSender>,
        config: AuthConfig,
    ) -> Self {
        Self {
            admin_repo,
            sms,
            config,
        }
    }

    fn generate_otp() -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }

    /// Issues a fresh OTP for the admin behind this mobile number,
    /// superseding any previous code. Delivery failure is non-fatal:
    /// the code is persisted and counts as sent.
    pub async fn send_otp(&self, mobile: &str) -> Result<OtpIssued> {
        let admin = self
            .admin_repo
            .find_by_mobile(mobile)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::NotFound("Unauthorized mobile number".to_string()))?;

        let challenge = OtpChallenge {
            code: Self::generate_otp(),
            expires_at: Utc::now() + Duration::minutes(self.config.otp_ttl_minutes),
        };
        self.admin_repo.set_otp(admin.id, &challenge).await?;

        let body = format!(
            "Your gym admin login OTP is: {}. Valid for {} minutes.",
            challenge.code, self.config.otp_ttl_minutes
        );
        if let Err(e) = self.sms.send(mobile, &body).await {
            tracing::warn!("OTP delivery to {} failed: {}", mobile, e);
        }

        Ok(OtpIssued {
            debug_code: self.config.expose_otp.then_some(challenge.code),
        })
    }

    /// Verifies the submitted code, clears it, and mints a bearer token.
    pub async fn verify_otp(&self, mobile: &str, code: &str) -> Result<(Admin, String)> {
        let admin = self
            .admin_repo
            .find_by_mobile(mobile)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

        let challenge = admin
            .otp
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("OTP expired or invalid".to_string()))?;

        if challenge.is_expired(Utc::now()) {
            return Err(AppError::BadRequest("OTP expired or invalid".to_string()));
        }
        if challenge.code != code {
            return Err(AppError::BadRequest("Invalid OTP".to_string()));
        }

        self.admin_repo.clear_otp(admin.id).await?;

        let token = self.issue_token(&admin)?;
        Ok((admin, token))
    }

    pub fn issue_token(&self, admin: &Admin) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id,
            mobile: admin.mobile.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_duration_hours)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }

    /// Resolves the admin behind a validated token; inactive or deleted
    /// admins are treated as unauthorized.
    pub async fn admin_for_token(&self, token: &str) -> Result<Admin> {
        let claims = self.decode_token(token)?;
        self.admin_repo
            .find_by_id(claims.sub)
            .await?
            .filter(|a| a.is_active)
            .ok_or(AppError::Unauthorized)
    }
}
