use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    domain::Member,
    error::{AppError, Result},
    repository::MemberRepository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub total_members: i64,
    pub approved_members: i64,
    pub pending_members: i64,
    /// Raw past-due count (`ending_date < now`), regardless of whether
    /// the sweep has updated the stored status yet.
    pub expired_members: i64,
    pub new_members_this_month: i64,
    pub total_revenue: f64,
    pub total_diet_plans: i64,
    pub expiring_members_count: i64,
    pub monthly_stats: Vec<MonthlyStat>,
    pub status_distribution: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub members: i64,
    pub revenue: f64,
}

/// On-demand aggregation over the member and diet-plan tables. Every
/// dashboard load recomputes from scratch; there is no cached or
/// incremental state to maintain.
pub struct AnalyticsService {
    pool: SqlitePool,
    member_repo: Arc<dyn MemberRepository>,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool, member_repo: Arc<dyn MemberRepository>) -> Self {
        Self { pool, member_repo }
    }

    // Half-open [start, end) window for the calendar month that lies
    // `months_back` months before now.
    fn month_window(
        now: DateTime<Utc>,
        months_back: u32,
    ) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let first_of_current = now
            .date_naive()
            .with_day(1)
            .ok_or_else(|| AppError::Internal("Invalid calendar date".to_string()))?;
        let start = first_of_current
            .checked_sub_months(Months::new(months_back))
            .ok_or_else(|| AppError::Internal("Month window underflow".to_string()))?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::Internal("Month window overflow".to_string()))?;
        Ok((
            start.and_time(NaiveTime::MIN),
            end.and_time(NaiveTime::MIN),
        ))
    }

    async fn count(&self, sql: &str, binds: &[NaiveDateTime]) -> Result<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // Revenue as recorded: fees of approved members who *joined* in the
    // window. Renewal payments and later fee additions to existing
    // members are not attributed to the month they were paid in.
    async fn revenue_for_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<f64> {
        let revenue: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(fees) FROM members \
             WHERE is_active = 1 AND status = 'approved' \
               AND joining_date >= ? AND joining_date < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(revenue.unwrap_or(0.0))
    }

    pub async fn dashboard(&self) -> Result<DashboardAnalytics> {
        let now = Utc::now();
        let now_naive = now.naive_utc();
        let week_out = (now + Duration::days(7)).naive_utc();
        let (month_start, month_end) = Self::month_window(now, 0)?;

        let total_members = self
            .count("SELECT COUNT(*) FROM members WHERE is_active = 1", &[])
            .await?;
        let approved_members = self
            .count(
                "SELECT COUNT(*) FROM members WHERE is_active = 1 AND status = 'approved'",
                &[],
            )
            .await?;
        let pending_members = self
            .count(
                "SELECT COUNT(*) FROM members WHERE is_active = 1 AND status = 'pending'",
                &[],
            )
            .await?;
        let expired_members = self
            .count(
                "SELECT COUNT(*) FROM members WHERE is_active = 1 AND ending_date < ?",
                &[now_naive],
            )
            .await?;
        let new_members_this_month = self
            .count(
                "SELECT COUNT(*) FROM members \
                 WHERE is_active = 1 AND joining_date >= ? AND joining_date < ?",
                &[month_start, month_end],
            )
            .await?;
        let total_revenue = self.revenue_for_window(month_start, month_end).await?;
        let total_diet_plans = self
            .count("SELECT COUNT(*) FROM diet_plans WHERE is_active = 1", &[])
            .await?;
        let expiring_members_count = self
            .count(
                "SELECT COUNT(*) FROM members \
                 WHERE is_active = 1 AND status = 'approved' \
                   AND ending_date >= ? AND ending_date <= ?",
                &[now_naive, week_out],
            )
            .await?;

        // Trailing six calendar months, oldest first.
        let mut monthly_stats = Vec::with_capacity(6);
        for months_back in (0..6).rev() {
            let (start, end) = Self::month_window(now, months_back)?;
            let members = self
                .count(
                    "SELECT COUNT(*) FROM members \
                     WHERE is_active = 1 AND joining_date >= ? AND joining_date < ?",
                    &[start, end],
                )
                .await?;
            let revenue = self.revenue_for_window(start, end).await?;
            monthly_stats.push(MonthlyStat {
                month: start.format("%b %Y").to_string(),
                members,
                revenue,
            });
        }

        let distribution_rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM members WHERE is_active = 1 GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        let status_distribution = distribution_rows.into_iter().collect();

        Ok(DashboardAnalytics {
            total_members,
            approved_members,
            pending_members,
            expired_members,
            new_members_this_month,
            total_revenue,
            total_diet_plans,
            expiring_members_count,
            monthly_stats,
            status_distribution,
        })
    }

    /// Approved active members whose subscription ends within the next
    /// `days` days, soonest first.
    pub async fn expiring_members(&self, days: i64) -> Result<Vec<Member>> {
        self.member_repo.expiring_within(Utc::now(), days).await
    }
}
