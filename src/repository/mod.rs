use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod admin_repository;
pub mod diet_plan_repository;
pub mod member_repository;
pub mod transformation_repository;

pub use admin_repository::SqliteAdminRepository;
pub use diet_plan_repository::SqliteDietPlanRepository;
pub use member_repository::SqliteMemberRepository;
pub use transformation_repository::SqliteTransformationRepository;

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Result of an expiry sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn insert(&self, member: &Member) -> Result<Member>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>>;
    async fn list(&self, filter: &MemberFilter) -> Result<Page<Member>>;
    async fn update(&self, member: &Member) -> Result<Member>;
    /// Returns false when no row with this id exists. Flipping an
    /// already-inactive row is not an error.
    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
    async fn bulk_soft_delete(&self, ids: &[Uuid]) -> Result<u64>;
    /// Promotes approved-but-past-due active members to expired.
    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<SweepOutcome>;
    /// Approved active members whose ending date falls within
    /// `[now, now + days]`, soonest first.
    async fn expiring_within(&self, now: DateTime<Utc>, days: i64) -> Result<Vec<Member>>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>>;
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Admin>>;
    async fn seed_if_absent(&self, mobile: &str, name: &str) -> Result<Admin>;
    async fn set_otp(&self, id: Uuid, challenge: &OtpChallenge) -> Result<()>;
    async fn clear_otp(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TransformationRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<TransformationSet>>;
    /// Replaces the whole gallery for `key`, creating the record on
    /// first save.
    async fn upsert(&self, key: &str, entries: &[TransformationEntry])
        -> Result<TransformationSet>;
}

#[async_trait]
pub trait DietPlanRepository: Send + Sync {
    async fn insert(&self, plan: &DietPlan) -> Result<DietPlan>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DietPlan>>;
    async fn list(&self, filter: &DietPlanFilter) -> Result<Page<DietPlan>>;
    async fn update(&self, plan: &DietPlan) -> Result<DietPlan>;
    async fn set_pdf(&self, id: Uuid, pdf: Option<&StoredPdf>) -> Result<()>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool>;
}
