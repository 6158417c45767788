//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::expense::ExpenseRepository;
use super::invoice::{BillingLedger, InvoiceRepository};
use super::member::MemberRepository;
use super::rates::RateRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let member = repos.members().find_by_id(1).await?;
///     let invoices = repos.invoices().find_by_member(1).await?;
/// }
/// ```
///
/// Reads go through the per-aggregate repositories; every write that
/// touches an invoice and its member together goes through `ledger()`.
pub trait RepositoryProvider: Send + Sync {
    fn members(&self) -> &dyn MemberRepository;
    fn rates(&self) -> &dyn RateRepository;
    fn invoices(&self) -> &dyn InvoiceRepository;
    fn ledger(&self) -> &dyn BillingLedger;
    fn expenses(&self) -> &dyn ExpenseRepository;
}
