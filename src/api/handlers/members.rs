use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::handlers::MOBILE_RE,
    api::state::AppState,
    domain::{Member, MemberFilter, MemberPatch, MemberStatus, NewMember, SortOrder, StatusFilter},
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub joining_date: DateTime<Utc>,
    pub ending_date: DateTime<Utc>,
    pub month: u32,
    pub fees: f64,
    pub description: Option<String>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            mobile: member.mobile,
            joining_date: member.joining_date,
            ending_date: member.ending_date,
            month: member.month,
            fees: member.fees,
            description: member.description,
            status: member.status,
            created_at: member.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = *MOBILE_RE, message = "Invalid mobile number"))]
    pub mobile: String,
    pub joining_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Month must be a positive integer"))]
    pub month: u32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Fees must be a positive number"))]
    pub fees: f64,
    pub description: Option<String>,
}

/// Public registration endpoint; also used by admins adding members.
pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateMemberDto>,
) -> Result<(StatusCode, Json<Value>)> {
    dto.validate()?;

    let member = state
        .service_context
        .member_service
        .register(NewMember {
            name: dto.name.trim().to_string(),
            mobile: dto.mobile,
            joining_date: dto.joining_date,
            month: dto.month,
            fees: dto.fees,
            description: dto.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Member added successfully",
            "member": MemberDto::from(member),
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let status = StatusFilter::parse(params.status.as_deref().unwrap_or(""))
        .ok_or_else(|| AppError::Validation("Invalid status filter".to_string()))?;
    let sort_order = match params.sort_order.as_deref() {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);

    let filter = MemberFilter {
        search: params.search,
        status,
        sort_by: params.sort_by.unwrap_or_else(|| "createdAt".to_string()),
        sort_order,
        page,
        limit,
    };

    let result = state.service_context.member_service.list(&filter).await?;
    let members: Vec<MemberDto> = result.items.into_iter().map(Into::into).collect();
    let total_pages = (result.total + limit - 1) / limit;

    Ok(Json(json!({
        "success": true,
        "members": members,
        "pagination": {
            "current": page,
            "total": total_pages,
            "count": members.len(),
            "totalMembers": result.total,
        },
    })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberDto {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(regex(path = *MOBILE_RE, message = "Invalid mobile number"))]
    pub mobile: Option<String>,
    pub joining_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Month must be a positive integer"))]
    pub month: Option<u32>,
    #[validate(range(min = 0.0, message = "Fees must be a positive number"))]
    pub fees: Option<f64>,
    pub description: Option<String>,
    pub status: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateMemberDto>,
) -> Result<Json<Value>> {
    dto.validate()?;

    // Unknown status values are rejected here; the pending restriction
    // is enforced by the derivation rule itself.
    let status = match dto.status.as_deref() {
        None => None,
        Some(s) => Some(
            MemberStatus::parse(s)
                .ok_or_else(|| AppError::Validation("Invalid status value".to_string()))?,
        ),
    };

    let member = state
        .service_context
        .member_service
        .update(
            id,
            MemberPatch {
                name: dto.name,
                mobile: dto.mobile,
                joining_date: dto.joining_date,
                month: dto.month,
                fees: dto.fees,
                description: dto.description,
                status,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Member updated successfully",
        "member": MemberDto::from(member),
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.service_context.member_service.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Member deleted successfully",
    })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "Please provide valid member IDs"))]
    pub member_ids: Vec<Uuid>,
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let intended = state
        .service_context
        .member_service
        .bulk_delete(&req.member_ids)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} members deleted successfully", intended),
    })))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Please provide valid member IDs"))]
    pub member_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(default)]
    pub include_link: bool,
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let delivery = state
        .service_context
        .member_service
        .send_message(&req.member_ids, &req.message, req.include_link)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Messages sent: {} successful, {} failed",
            delivery.successful, delivery.failed
        ),
        "results": delivery.results,
    })))
}

/// Operator-triggered run of the daily expiry sweep.
pub async fn sweep_expired(State(state): State<AppState>) -> Result<Json<Value>> {
    let outcome = state.service_context.member_service.sweep_expired().await?;

    Ok(Json(json!({
        "success": true,
        "matched": outcome.matched,
        "modified": outcome.modified,
    })))
}
