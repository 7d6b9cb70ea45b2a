use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Member, MemberFilter, MemberStatus, SortOrder, StatusFilter},
    error::{AppError, Result},
    repository::{MemberRepository, Page, SweepOutcome},
};

const MEMBER_COLUMNS: &str = "id, name, mobile, joining_date, ending_date, month, fees, \
     description, status, is_active, created_at, updated_at";

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct MemberRow {
    id: String,
    name: String,
    mobile: String,
    joining_date: NaiveDateTime,
    ending_date: NaiveDateTime,
    month: i64,
    fees: f64,
    description: Option<String>,
    status: String,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_member(row: MemberRow) -> Result<Member> {
        Ok(Member {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            mobile: row.mobile,
            joining_date: DateTime::from_naive_utc_and_offset(row.joining_date, Utc),
            ending_date: DateTime::from_naive_utc_and_offset(row.ending_date, Utc),
            month: u32::try_from(row.month).map_err(|e| AppError::Database(e.to_string()))?,
            fees: row.fees,
            description: row.description,
            status: MemberStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid member status: {}", row.status)))?,
            is_active: row.is_active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    // API sort keys are camelCase; anything unknown falls back to
    // created_at. Whitelisting keeps user input out of the ORDER BY.
    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "name" => "name",
            "mobile" => "mobile",
            "joiningDate" => "joining_date",
            "endingDate" => "ending_date",
            "fees" => "fees",
            "status" => "status",
            _ => "created_at",
        }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MemberFilter, now: DateTime<Utc>) {
        let now_naive = now.naive_utc();
        let week_out = (now + Duration::days(7)).naive_utc();

        qb.push(" WHERE is_active = 1");

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            qb.push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR mobile LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        match filter.status {
            StatusFilter::Any => {}
            StatusFilter::Pending => {
                qb.push(" AND status = 'pending'");
            }
            StatusFilter::Expired => {
                qb.push(" AND (status = 'expired' OR (status = 'approved' AND ending_date < ")
                    .push_bind(now_naive)
                    .push("))");
            }
            StatusFilter::Expiring => {
                qb.push(" AND ending_date >= ")
                    .push_bind(now_naive)
                    .push(" AND ending_date <= ")
                    .push_bind(week_out);
            }
            StatusFilter::SafelyActive => {
                qb.push(" AND status = 'approved' AND ending_date > ")
                    .push_bind(week_out);
            }
        }
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn insert(&self, member: &Member) -> Result<Member> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, name, mobile, joining_date, ending_date, month, fees,
                description, status, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(member.id.to_string())
        .bind(&member.name)
        .bind(&member.mobile)
        .bind(member.joining_date.naive_utc())
        .bind(member.ending_date.naive_utc())
        .bind(member.month as i64)
        .bind(member.fees)
        .bind(&member.description)
        .bind(member.status.as_str())
        .bind(member.is_active as i32)
        .bind(member.created_at.naive_utc())
        .bind(member.updated_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(member.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created member".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_member(r)?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM members WHERE is_active = 1 AND id IN (",
            MEMBER_COLUMNS
        ));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        qb.push(")");

        let rows: Vec<MemberRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Page<Member>> {
        let now = Utc::now();

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM members");
        Self::push_filters(&mut count_qb, filter, now);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM members", MEMBER_COLUMNS));
        Self::push_filters(&mut qb, filter, now);

        let direction = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        qb.push(format!(
            " ORDER BY {} {}",
            Self::sort_column(&filter.sort_by),
            direction
        ));

        let limit = filter.limit.max(1);
        let offset = (filter.page.max(1) - 1) * limit;
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<MemberRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = rows
            .into_iter()
            .map(Self::row_to_member)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, total })
    }

    async fn update(&self, member: &Member) -> Result<Member> {
        sqlx::query(
            r#"
            UPDATE members
            SET name = ?,
                mobile = ?,
                joining_date = ?,
                ending_date = ?,
                month = ?,
                fees = ?,
                description = ?,
                status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.name)
        .bind(&member.mobile)
        .bind(member.joining_date.naive_utc())
        .bind(member.ending_date.naive_utc())
        .bind(member.month as i64)
        .bind(member.fees)
        .bind(&member.description)
        .bind(member.status.as_str())
        .bind(Utc::now().naive_utc())
        .bind(member.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(member.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated member".to_string())
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE members SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn bulk_soft_delete(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE members SET is_active = 0, updated_at = ");
        qb.push_bind(Utc::now().naive_utc());
        qb.push(" WHERE is_active = 1 AND id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        qb.push(")");

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<SweepOutcome> {
        let now_naive = now.naive_utc();

        let matched: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM members \
             WHERE is_active = 1 AND status = 'approved' AND ending_date < ?",
        )
        .bind(now_naive)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE members SET status = 'expired', updated_at = ? \
             WHERE is_active = 1 AND status = 'approved' AND ending_date < ?",
        )
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(SweepOutcome {
            matched: matched as u64,
            modified: result.rows_affected(),
        })
    }

    async fn expiring_within(&self, now: DateTime<Utc>, days: i64) -> Result<Vec<Member>> {
        let until = now + Duration::days(days);

        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM members \
             WHERE is_active = 1 AND status = 'approved' \
               AND ending_date >= ? AND ending_date <= ? \
             ORDER BY ending_date ASC",
            MEMBER_COLUMNS
        ))
        .bind(now.naive_utc())
        .bind(until.naive_utc())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_member).collect()
    }
}
