//! Invoice repository and billing ledger interfaces

use async_trait::async_trait;

use super::model::{Invoice, NewInvoice};
use crate::domain::member::MemberBalance;
use crate::domain::DomainResult;

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Invoice>>;
    /// Newest first.
    async fn find_all(&self) -> DomainResult<Vec<Invoice>>;
    /// Newest first.
    async fn find_by_member(&self, member_id: i32) -> DomainResult<Vec<Invoice>>;
    /// First invoice of `member_id` created after `invoice_id`, if any.
    async fn find_newer_for_member(
        &self,
        member_id: i32,
        invoice_id: i32,
    ) -> DomainResult<Option<i32>>;
    async fn count_for_member(&self, member_id: i32) -> DomainResult<u64>;
}

/// Atomic invoice + member writes.
///
/// Every operation runs in one transaction and first checks that the
/// member's stored balance still equals `expected` (the snapshot the
/// calculator ran against). A mismatch fails with `DomainError::Conflict`
/// and nothing is written. `amend` and `remove` additionally re-check,
/// inside the transaction, that no newer invoice exists for the member.
#[async_trait]
pub trait BillingLedger: Send + Sync {
    async fn record(
        &self,
        invoice: NewInvoice,
        expected: MemberBalance,
        update: MemberBalance,
    ) -> DomainResult<Invoice>;

    async fn amend(
        &self,
        invoice: Invoice,
        expected: MemberBalance,
        update: Option<MemberBalance>,
    ) -> DomainResult<Invoice>;

    async fn remove(
        &self,
        invoice: &Invoice,
        expected: MemberBalance,
        restore: MemberBalance,
    ) -> DomainResult<()>;
}
