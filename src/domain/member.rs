use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub joining_date: DateTime<Utc>,
    pub ending_date: DateTime<Utc>,
    pub month: u32,
    pub fees: f64,
    pub description: Option<String>,
    pub status: MemberStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Logical expiry state, independent of whether the sweep has
    /// physically updated the stored status yet.
    pub fn is_effectively_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == MemberStatus::Expired
            || (self.status == MemberStatus::Approved && self.ending_date < now)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Pending,
    Approved,
    Expired,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Approved => "approved",
            MemberStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MemberStatus::Pending),
            "approved" => Some(MemberStatus::Approved),
            "expired" => Some(MemberStatus::Expired),
            _ => None,
        }
    }
}

/// Validated input for member registration. Status is never part of the
/// input; it is derived from the fee paid at creation.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub mobile: String,
    pub joining_date: Option<DateTime<Utc>>,
    pub month: u32,
    pub fees: f64,
    pub description: Option<String>,
}

/// Admin-initiated partial update. `status` has already been parsed from
/// the wire; values outside the enum are rejected before this point.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub joining_date: Option<DateTime<Utc>>,
    pub month: Option<u32>,
    pub fees: Option<f64>,
    pub description: Option<String>,
    pub status: Option<MemberStatus>,
}

/// Listing filter for the member query service.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Any,
    Pending,
    /// Approved and not ending within the next 7 days.
    SafelyActive,
    /// Effective-expired: stored `expired`, or `approved` with an ending
    /// date already in the past.
    Expired,
    /// Ending date within the next 7 days, regardless of stored status.
    Expiring,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(StatusFilter::Any),
            "pending" => Some(StatusFilter::Pending),
            "approved" | "active" => Some(StatusFilter::SafelyActive),
            "expired" => Some(StatusFilter::Expired),
            "expiring" => Some(StatusFilter::Expiring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Fields recomputed by [`derive_membership_fields`] and written back on
/// every create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub joining_date: DateTime<Utc>,
    pub month: u32,
    pub fees: f64,
    pub ending_date: DateTime<Utc>,
    pub status: MemberStatus,
}

/// Subscription end: joining date plus the purchased number of calendar
/// months.
pub fn ending_date_for(joining_date: DateTime<Utc>, month: u32) -> Result<DateTime<Utc>> {
    joining_date
        .checked_add_months(Months::new(month))
        .ok_or_else(|| AppError::Validation("month is out of range".to_string()))
}

pub fn initial_status(fees: f64) -> MemberStatus {
    if fees > 0.0 {
        MemberStatus::Approved
    } else {
        MemberStatus::Pending
    }
}

/// Derivation rule for membership fields, applied before persistence on
/// both create (`existing == None`) and update.
///
/// Status transitions:
/// - creation: `approved` when fees are positive, else `pending`;
/// - a fee payment while `pending` promotes the member to `approved`;
/// - an explicit status patch may only move to `approved` or `expired`,
///   and wins over the automatic fee transition;
/// - patching back to `pending` is rejected and leaves the record
///   untouched.
///
/// The ending date is recomputed whenever the joining date or month
/// count changes; it is never directly editable.
pub fn derive_membership_fields(
    existing: Option<&Member>,
    patch: &MemberPatch,
    now: DateTime<Utc>,
) -> Result<DerivedFields> {
    if patch.status == Some(MemberStatus::Pending) {
        return Err(AppError::Validation(
            "status cannot be set to pending directly".to_string(),
        ));
    }

    match existing {
        None => {
            let joining_date = patch.joining_date.unwrap_or(now);
            let month = patch
                .month
                .ok_or_else(|| AppError::Validation("month is required".to_string()))?;
            let fees = patch.fees.unwrap_or(0.0);
            Ok(DerivedFields {
                joining_date,
                month,
                fees,
                ending_date: ending_date_for(joining_date, month)?,
                status: initial_status(fees),
            })
        }
        Some(current) => {
            let joining_date = patch.joining_date.unwrap_or(current.joining_date);
            let month = patch.month.unwrap_or(current.month);
            let fees = patch.fees.unwrap_or(current.fees);

            let ending_date = if patch.joining_date.is_some() || patch.month.is_some() {
                ending_date_for(joining_date, month)?
            } else {
                current.ending_date
            };

            let status = match patch.status {
                Some(explicit) => explicit,
                None => {
                    let fee_paid =
                        patch.fees.map(|f| f > 0.0).unwrap_or(false) && current.fees <= 0.0;
                    if current.status == MemberStatus::Pending && fee_paid {
                        MemberStatus::Approved
                    } else {
                        current.status
                    }
                }
            };

            Ok(DerivedFields {
                joining_date,
                month,
                fees,
                ending_date,
                status,
            })
        }
    }
}
