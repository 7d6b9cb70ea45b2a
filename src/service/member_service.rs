use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{derive_membership_fields, Member, MemberFilter, MemberPatch, NewMember},
    error::{AppError, Result},
    integrations::SmsSender,
    repository::{MemberRepository, Page, SweepOutcome},
};

#[derive(Debug, Serialize)]
pub struct MessageResult {
    pub mobile: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageDelivery {
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<MessageResult>,
}

pub struct MemberService {
    repo: Arc<dyn MemberRepository>,
    sms: Arc<dyn SmsSender>,
    portal_url: String,
}

impl MemberService {
    pub fn new(repo: Arc<dyn MemberRepository>, sms: Arc<dyn SmsSender>, portal_url: String) -> Self {
        Self {
            repo,
            sms,
            portal_url,
        }
    }

    /// Registration path, both admin-initiated and public self-signup.
    /// The ending date and initial status are derived, never taken from
    /// the input.
    pub async fn register(&self, input: NewMember) -> Result<Member> {
        let now = Utc::now();
        let patch = MemberPatch {
            joining_date: input.joining_date,
            month: Some(input.month),
            fees: Some(input.fees),
            ..Default::default()
        };
        let derived = derive_membership_fields(None, &patch, now)?;

        let member = Member {
            id: Uuid::new_v4(),
            name: input.name,
            mobile: input.mobile,
            joining_date: derived.joining_date,
            ending_date: derived.ending_date,
            month: derived.month,
            fees: derived.fees,
            description: input.description,
            status: derived.status,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&member).await
    }

    pub async fn update(&self, id: Uuid, patch: MemberPatch) -> Result<Member> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let derived = derive_membership_fields(Some(&current), &patch, Utc::now())?;

        let mut updated = current;
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(mobile) = patch.mobile {
            updated.mobile = mobile;
        }
        if let Some(description) = patch.description {
            updated.description = Some(description);
        }
        updated.joining_date = derived.joining_date;
        updated.ending_date = derived.ending_date;
        updated.month = derived.month;
        updated.fees = derived.fees;
        updated.status = derived.status;

        self.repo.update(&updated).await
    }

    pub async fn list(&self, filter: &MemberFilter) -> Result<Page<Member>> {
        self.repo.list(filter).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        Ok(())
    }

    /// Reports the intended count (input length); unknown ids are
    /// silently skipped, matching the historical contract.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize> {
        let affected = self.repo.bulk_soft_delete(ids).await?;
        tracing::debug!("Bulk delete: {} requested, {} deactivated", ids.len(), affected);
        Ok(ids.len())
    }

    /// Promotes approved-but-past-due members to expired. Idempotent;
    /// runs daily from the background task and on demand from the
    /// operator endpoint.
    pub async fn sweep_expired(&self) -> Result<SweepOutcome> {
        let outcome = self.repo.mark_expired(Utc::now()).await?;
        if outcome.modified > 0 {
            tracing::info!("Expiry sweep marked {} members expired", outcome.modified);
        }
        Ok(outcome)
    }

    /// Best-effort SMS broadcast to the selected active members.
    /// Per-number delivery failures are tallied, never propagated.
    pub async fn send_message(
        &self,
        ids: &[Uuid],
        message: &str,
        include_link: bool,
    ) -> Result<MessageDelivery> {
        let members = self.repo.find_active_by_ids(ids).await?;

        let text = if include_link {
            format!("{}\n\nGym Portal: {}", message, self.portal_url)
        } else {
            message.to_string()
        };

        let mut results = Vec::with_capacity(members.len());
        for member in &members {
            match self.sms.send(&member.mobile, &text).await {
                Ok(()) => results.push(MessageResult {
                    mobile: member.mobile.clone(),
                    success: true,
                }),
                Err(e) => {
                    tracing::warn!("Message to {} failed: {}", member.mobile, e);
                    results.push(MessageResult {
                        mobile: member.mobile.clone(),
                        success: false,
                    });
                }
            }
        }

        let successful = results.iter().filter(|r| r.success).count();
        let failed = results.len() - successful;
        Ok(MessageDelivery {
            successful,
            failed,
            results,
        })
    }
}
