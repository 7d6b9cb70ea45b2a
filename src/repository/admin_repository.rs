use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Admin, OtpChallenge},
    error::{AppError, Result},
    repository::AdminRepository,
};

#[derive(FromRow)]
struct AdminRow {
    id: String,
    mobile: String,
    name: String,
    otp_code: Option<String>,
    otp_expires_at: Option<NaiveDateTime>,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteAdminRepository {
    pool: SqlitePool,
}

impl SqliteAdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_admin(row: AdminRow) -> Result<Admin> {
        let otp = match (row.otp_code, row.otp_expires_at) {
            (Some(code), Some(expires_at)) => Some(OtpChallenge {
                code,
                expires_at: DateTime::from_naive_utc_and_offset(expires_at, Utc),
            }),
            _ => None,
        };

        Ok(Admin {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            mobile: row.mobile,
            name: row.name,
            otp,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl AdminRepository for SqliteAdminRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, mobile, name, otp_code, otp_expires_at, is_active, created_at, updated_at \
             FROM admins WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_admin(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, mobile, name, otp_code, otp_expires_at, is_active, created_at, updated_at \
             FROM admins WHERE mobile = ?",
        )
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_admin(r)?)),
            None => Ok(None),
        }
    }

    async fn seed_if_absent(&self, mobile: &str, name: &str) -> Result<Admin> {
        if let Some(existing) = self.find_by_mobile(mobile).await? {
            return Ok(existing);
        }

        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            "INSERT INTO admins (id, mobile, name, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(id.to_string())
        .bind(mobile)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!("Seeded admin account for {}", mobile);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve seeded admin".to_string()))
    }

    async fn set_otp(&self, id: Uuid, challenge: &OtpChallenge) -> Result<()> {
        sqlx::query(
            "UPDATE admins SET otp_code = ?, otp_expires_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&challenge.code)
        .bind(challenge.expires_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn clear_otp(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE admins SET otp_code = NULL, otp_expires_at = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now().naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
