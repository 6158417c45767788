//! Member repository interface

use async_trait::async_trait;

use super::model::{Member, NewMember};
use crate::domain::DomainResult;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Member>>;
    async fn find_by_flat_number(&self, flat_number: &str) -> DomainResult<Option<Member>>;
    /// Ordered by flat number.
    async fn find_all(&self) -> DomainResult<Vec<Member>>;
    async fn create(&self, member: NewMember) -> DomainResult<Member>;
    /// Overwrites every editable field, including the balance (correction path).
    async fn update(&self, member: Member) -> DomainResult<Member>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
