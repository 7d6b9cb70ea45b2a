use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{TransformationEntry, TransformationSet},
    error::{AppError, Result},
    repository::TransformationRepository,
};

// Like the diet-plan meals, the gallery entries live in a JSON text
// column keyed by page slot.
#[derive(FromRow)]
struct TransformationRow {
    key: String,
    entries: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteTransformationRepository {
    pool: SqlitePool,
}

impl SqliteTransformationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_set(row: TransformationRow) -> Result<TransformationSet> {
        let entries: Vec<TransformationEntry> = serde_json::from_str(&row.entries)
            .map_err(|e| AppError::Database(format!("Invalid gallery payload: {}", e)))?;

        Ok(TransformationSet {
            key: row.key,
            entries,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl TransformationRepository for SqliteTransformationRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<TransformationSet>> {
        let row = sqlx::query_as::<_, TransformationRow>(
            "SELECT key, entries, created_at, updated_at FROM transformations WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_set(r)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, key: &str, entries: &[TransformationEntry]) -> Result<TransformationSet> {
        let payload = serde_json::to_string(entries)
            .map_err(|e| AppError::Internal(format!("Failed to encode gallery: {}", e)))?;
        let now = Utc::now().naive_utc();

        sqlx::query(
            "INSERT INTO transformations (key, entries, created_at, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET entries = excluded.entries, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_key(key).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve saved gallery".to_string())
        })
    }
}
