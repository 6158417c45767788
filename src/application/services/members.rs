//! Member management service
//!
//! Registration and correction of member accounts. Balance fields normally
//! move only through invoices; editing them here is a data-correction path
//! and is logged as such.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::domain::member::{BulkCreateFailure, BulkCreateResult};
use crate::domain::{DomainError, DomainResult, Member, MemberType, NewMember, RepositoryProvider};
use crate::shared::money::round_money;
use crate::shared::validations::validate_mobile;
use crate::shared::{PaginatedResult, PaginationParams};

/// Partial member update; absent fields are kept.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    pub flat_number: Option<String>,
    pub name: Option<String>,
    pub member_type: Option<MemberType>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub units_used: Option<u64>,
    pub pending_amount: Option<Decimal>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim and check a member's fields.
fn normalize(member: NewMember) -> DomainResult<NewMember> {
    let flat_number = member.flat_number.trim().to_string();
    let name = member.name.trim().to_string();
    if flat_number.is_empty() {
        return Err(DomainError::Validation("flat_number is required".into()));
    }
    if name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }

    let mobile = non_blank(member.mobile);
    if let Some(m) = mobile.as_deref() {
        validate_mobile(m)
            .map_err(|_| DomainError::Validation("mobile must be 10 digits".into()))?;
    }
    let email = non_blank(member.email);
    if let Some(e) = email.as_deref() {
        if !e.validate_email() {
            return Err(DomainError::Validation(format!("invalid email: {}", e)));
        }
    }
    if member.pending_amount < Decimal::ZERO {
        return Err(DomainError::Validation(
            "pending_amount must not be negative".into(),
        ));
    }

    Ok(NewMember {
        flat_number,
        name,
        member_type: member.member_type,
        mobile,
        email,
        units_used: member.units_used,
        pending_amount: round_money(member.pending_amount),
    })
}

pub struct MemberService {
    repos: Arc<dyn RepositoryProvider>,
}

impl MemberService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, member: NewMember) -> DomainResult<Member> {
        let member = normalize(member)?;
        if self
            .repos
            .members()
            .find_by_flat_number(&member.flat_number)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Flat {} already has a member",
                member.flat_number
            )));
        }

        let created = self.repos.members().create(member).await?;
        info!(member_id = created.id, flat = created.flat_number.as_str(), "Member created");
        Ok(created)
    }

    /// Insert each entry independently, collecting per-entry failures.
    pub async fn bulk_create(&self, members: Vec<NewMember>) -> DomainResult<BulkCreateResult> {
        let mut result = BulkCreateResult::default();
        let mut seen = HashSet::new();

        for member in members {
            let flat_number = member.flat_number.trim().to_string();
            if !seen.insert(flat_number.to_lowercase()) {
                result.failed.push(BulkCreateFailure {
                    flat_number,
                    reason: "Duplicate flat number in batch".into(),
                });
                continue;
            }

            match self.create(member).await {
                Ok(created) => result.successful.push(created),
                Err(e @ DomainError::Storage(_)) => return Err(e),
                Err(e) => result.failed.push(BulkCreateFailure {
                    flat_number,
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            created = result.successful.len(),
            failed = result.failed.len(),
            "Bulk member import finished"
        );
        Ok(result)
    }

    pub async fn get(&self, id: i32) -> DomainResult<Member> {
        self.repos
            .members()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Member", "id", id))
    }

    /// Ordered by flat number, optionally filtered by flat or name.
    pub async fn list(
        &self,
        search: Option<&str>,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Member>> {
        let members = self.repos.members().find_all().await?;
        let matching = match search {
            Some(needle) => members
                .into_iter()
                .filter(|m| m.matches_search(needle))
                .collect(),
            None => members,
        };
        Ok(PaginatedResult::from_vec(matching, params))
    }

    pub async fn update(&self, id: i32, update: MemberUpdate) -> DomainResult<Member> {
        let current = self.get(id).await?;

        let candidate = normalize(NewMember {
            flat_number: update
                .flat_number
                .unwrap_or_else(|| current.flat_number.clone()),
            name: update.name.unwrap_or_else(|| current.name.clone()),
            member_type: update.member_type.unwrap_or(current.member_type),
            mobile: update.mobile.or_else(|| current.mobile.clone()),
            email: update.email.or_else(|| current.email.clone()),
            units_used: update.units_used.unwrap_or(current.units_used),
            pending_amount: update.pending_amount.unwrap_or(current.pending_amount),
        })?;

        if !candidate
            .flat_number
            .eq_ignore_ascii_case(&current.flat_number)
        {
            if let Some(other) = self
                .repos
                .members()
                .find_by_flat_number(&candidate.flat_number)
                .await?
            {
                if other.id != id {
                    return Err(DomainError::Conflict(format!(
                        "Flat {} already has a member",
                        candidate.flat_number
                    )));
                }
            }
        }

        if candidate.units_used != current.units_used
            || candidate.pending_amount != current.pending_amount
        {
            warn!(
                member_id = id,
                old_units = current.units_used,
                new_units = candidate.units_used,
                old_pending = %current.pending_amount,
                new_pending = %candidate.pending_amount,
                "Member balance corrected outside billing"
            );
        }

        let updated = self
            .repos
            .members()
            .update(Member {
                id,
                flat_number: candidate.flat_number,
                name: candidate.name,
                member_type: candidate.member_type,
                mobile: candidate.mobile,
                email: candidate.email,
                units_used: candidate.units_used,
                pending_amount: candidate.pending_amount,
                created_at: current.created_at,
                updated_at: current.updated_at,
            })
            .await?;
        info!(member_id = id, "Member updated");
        Ok(updated)
    }

    /// Refused while the member still has invoices.
    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.get(id).await?;
        let invoices = self.repos.invoices().count_for_member(id).await?;
        if invoices > 0 {
            return Err(DomainError::Conflict(format!(
                "Member {} has {} invoice(s); delete them first",
                id, invoices
            )));
        }
        self.repos.members().delete(id).await?;
        info!(member_id = id, "Member deleted");
        Ok(())
    }
}
