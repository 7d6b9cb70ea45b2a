use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use fitdesk::{
    domain::{ending_date_for, Member, MemberStatus},
    repository::{MemberRepository, SqliteMemberRepository},
    service::AnalyticsService,
};

async fn setup() -> anyhow::Result<(AnalyticsService, Arc<SqliteMemberRepository>)> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = Arc::new(SqliteMemberRepository::new(pool.clone()));
    let service = AnalyticsService::new(pool, repo.clone());
    Ok((service, repo))
}

fn member(status: MemberStatus, fees: f64, joined_days_ago: i64, month: u32) -> Member {
    let now = Utc::now();
    let joining = now - Duration::days(joined_days_ago);
    Member {
        id: Uuid::new_v4(),
        name: "Member".to_string(),
        mobile: "+919876543210".to_string(),
        joining_date: joining,
        ending_date: ending_date_for(joining, month).unwrap(),
        month,
        fees,
        description: None,
        status,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_dashboard_counts_and_revenue() -> anyhow::Result<()> {
    let (service, repo) = setup().await?;

    // Three approved members who joined today, 1000 each
    for _ in 0..3 {
        repo.insert(&member(MemberStatus::Approved, 1000.0, 0, 6)).await?;
    }
    // Two pending signups
    for _ in 0..2 {
        repo.insert(&member(MemberStatus::Pending, 0.0, 0, 1)).await?;
    }
    // One explicitly expired member, joined long ago
    repo.insert(&member(MemberStatus::Expired, 500.0, 200, 1)).await?;
    // One deactivated member, invisible everywhere
    let removed = member(MemberStatus::Approved, 9999.0, 0, 6);
    repo.insert(&removed).await?;
    repo.soft_delete(removed.id).await?;

    let analytics = service.dashboard().await?;

    assert_eq!(analytics.total_members, 6);
    assert_eq!(analytics.approved_members, 3);
    assert_eq!(analytics.pending_members, 2);
    // The expired member joined 200 days ago on a 1-month plan, so the
    // ending date is well past
    assert_eq!(analytics.expired_members, 1);
    assert_eq!(analytics.new_members_this_month, 5);
    // Revenue only counts approved members who joined this month
    assert_eq!(analytics.total_revenue, 3000.0);
    assert_eq!(analytics.total_diet_plans, 0);

    assert_eq!(analytics.monthly_stats.len(), 6);
    let current = analytics.monthly_stats.last().unwrap();
    assert_eq!(current.members, 5);
    assert_eq!(current.revenue, 3000.0);

    assert_eq!(analytics.status_distribution.get("approved"), Some(&3));
    assert_eq!(analytics.status_distribution.get("pending"), Some(&2));
    assert_eq!(analytics.status_distribution.get("expired"), Some(&1));

    Ok(())
}

#[tokio::test]
async fn test_expiring_members_window() -> anyhow::Result<()> {
    let (service, repo) = setup().await?;

    let now = Utc::now();
    let mut soon = member(MemberStatus::Approved, 1000.0, 0, 1);
    soon.ending_date = now + Duration::days(3);
    let mut later = member(MemberStatus::Approved, 1000.0, 0, 1);
    later.ending_date = now + Duration::days(15);
    repo.insert(&soon).await?;
    repo.insert(&later).await?;

    let expiring = service.expiring_members(7).await?;
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].id, soon.id);

    let expiring = service.expiring_members(30).await?;
    assert_eq!(expiring.len(), 2);

    Ok(())
}
