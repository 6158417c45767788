//! Billing service: creates, amends and deletes maintenance invoices
//!
//! Every mutation for a member runs under that member's async mutex and
//! persists through the ledger, which re-checks the member snapshot inside
//! the database transaction. Transient storage failures are retried.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::rates::current_schedule;
use crate::domain::billing::{self, compute_invoice, compute_rollback, compute_update};
use crate::domain::{
    BillingError, DomainError, DomainResult, Invoice, InvoiceAmendment, InvoiceComputation,
    InvoiceInput, Member, RepositoryProvider,
};
use crate::shared::money::round_money;
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::{PaginatedResult, PaginationParams};

/// How an update changes the collected amount.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CollectionChange {
    #[default]
    Keep,
    /// Replace the collected amount.
    Set(Decimal),
    /// Add a later payment to what was already collected.
    Add(Decimal),
}

/// Operator request to amend an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceUpdateRequest {
    pub new_reading_units: Option<u64>,
    pub collection: CollectionChange,
    pub updated_by: String,
    pub reason: Option<String>,
}

impl InvoiceUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.new_reading_units.is_none() && self.collection == CollectionChange::Keep
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub search: Option<String>,
    pub member_id: Option<i32>,
}

/// Service for maintenance invoice operations
pub struct BillingService {
    repos: Arc<dyn RepositoryProvider>,
    member_locks: DashMap<i32, Arc<Mutex<()>>>,
    retry: RetryConfig,
    invoice_prefix: String,
}

impl BillingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, invoice_prefix: impl Into<String>) -> Self {
        Self {
            repos,
            member_locks: DashMap::new(),
            retry: RetryConfig::default(),
            invoice_prefix: invoice_prefix.into(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn invoice_prefix(&self) -> &str {
        &self.invoice_prefix
    }

    fn member_lock(&self, member_id: i32) -> Arc<Mutex<()>> {
        self.member_locks.entry(member_id).or_default().clone()
    }

    async fn load_member(&self, member_id: i32) -> DomainResult<Member> {
        self.repos
            .members()
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Member", "id", member_id))
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_invoice(&self, id: i32) -> DomainResult<Invoice> {
        self.repos
            .invoices()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invoice", "id", id))
    }

    /// Newest first, filtered by member and free-text search.
    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Invoice>> {
        let invoices = match filter.member_id {
            Some(member_id) => self.repos.invoices().find_by_member(member_id).await?,
            None => self.repos.invoices().find_all().await?,
        };

        let matching: Vec<Invoice> = match filter.search.as_deref() {
            Some(needle) => invoices
                .into_iter()
                .filter(|i| i.matches_search(needle, &self.invoice_prefix))
                .collect(),
            None => invoices,
        };

        Ok(PaginatedResult::from_vec(matching, params))
    }

    /// Run the calculator against current member state without persisting.
    pub async fn preview_invoice(
        &self,
        member_id: i32,
        input: InvoiceInput,
    ) -> DomainResult<InvoiceComputation> {
        let input = normalize_input(input)?;
        let member = self.load_member(member_id).await?;
        let rates = current_schedule(self.repos.as_ref()).await?;
        let computation = compute_invoice(&member, &rates, &input).inspect_err(record_rejection)?;
        Ok(computation)
    }

    // ── Mutations ───────────────────────────────────────────────

    pub async fn create_invoice(&self, member_id: i32, input: InvoiceInput) -> DomainResult<Invoice> {
        let input = normalize_input(input)?;
        let lock = self.member_lock(member_id);
        let _guard = lock.lock().await;

        let input = &input;
        let invoice = retry_with_backoff(
            &self.retry,
            move || self.try_create(member_id, input),
            DomainError::is_transient,
            "create_invoice",
        )
        .await
        .inspect_err(|e| log_failure("create", member_id, e))?;

        metrics::counter!("billing_invoices_created_total").increment(1);
        info!(
            invoice_id = invoice.id,
            member_id,
            flat = invoice.flat_number.as_str(),
            total = %invoice.total_maintenance_amount,
            collected = %invoice.collection_amount,
            pending = %invoice.pending_amount,
            "Invoice created"
        );
        Ok(invoice)
    }

    async fn try_create(&self, member_id: i32, input: &InvoiceInput) -> DomainResult<Invoice> {
        let member = self.load_member(member_id).await?;
        let rates = current_schedule(self.repos.as_ref()).await?;
        let computation = compute_invoice(&member, &rates, input)?;
        self.repos
            .ledger()
            .record(computation.invoice, member.balance(), computation.member_update)
            .await
    }

    /// Amend the member's latest invoice.
    ///
    /// A request that changes nothing returns the invoice untouched.
    pub async fn update_invoice(
        &self,
        id: i32,
        request: InvoiceUpdateRequest,
    ) -> DomainResult<Invoice> {
        let updated_by = request.updated_by.trim();
        if updated_by.is_empty() {
            return Err(DomainError::Validation("updated_by is required".into()));
        }
        if let CollectionChange::Add(extra) = request.collection {
            if extra < Decimal::ZERO {
                return Err(DomainError::Validation(
                    "additional_collection must not be negative".into(),
                ));
            }
        }

        let member_id = self.get_invoice(id).await?.member_id;
        let lock = self.member_lock(member_id);
        let _guard = lock.lock().await;

        let request = &request;
        let (invoice, changed) = retry_with_backoff(
            &self.retry,
            move || self.try_update(id, request, updated_by),
            DomainError::is_transient,
            "update_invoice",
        )
        .await
        .inspect_err(|e| log_failure("update", member_id, e))?;

        if changed {
            metrics::counter!("billing_invoices_updated_total").increment(1);
            info!(
                invoice_id = id,
                member_id,
                updated_by,
                pending = %invoice.pending_amount,
                "Invoice updated"
            );
        }
        Ok(invoice)
    }

    async fn try_update(
        &self,
        id: i32,
        request: &InvoiceUpdateRequest,
        updated_by: &str,
    ) -> DomainResult<(Invoice, bool)> {
        let invoice = self.get_invoice(id).await?;
        let newer = self
            .repos
            .invoices()
            .find_newer_for_member(invoice.member_id, invoice.id)
            .await?;
        billing::ensure_latest(&invoice, newer)?;

        let amendment = InvoiceAmendment {
            new_reading_units: request.new_reading_units,
            collection_amount: match request.collection {
                CollectionChange::Keep => None,
                CollectionChange::Set(amount) => Some(round_money(amount)),
                CollectionChange::Add(extra) => Some(round_money(
                    invoice
                        .collection_amount
                        .checked_add(extra)
                        .ok_or(BillingError::AmountOverflow)?,
                )),
            },
        };

        let revision = compute_update(
            &invoice,
            &amendment,
            updated_by,
            request.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()),
            Utc::now(),
        )?;
        if revision.is_unchanged() {
            return Ok((revision.invoice, false));
        }

        let member = self.load_member(invoice.member_id).await?;
        let saved = self
            .repos
            .ledger()
            .amend(revision.invoice, member.balance(), revision.member_update)
            .await?;
        Ok((saved, true))
    }

    /// Delete the member's latest invoice and restore the member's prior state.
    pub async fn delete_invoice(&self, id: i32) -> DomainResult<()> {
        let member_id = self.get_invoice(id).await?.member_id;
        let lock = self.member_lock(member_id);
        let _guard = lock.lock().await;

        retry_with_backoff(
            &self.retry,
            move || self.try_delete(id),
            DomainError::is_transient,
            "delete_invoice",
        )
        .await
        .inspect_err(|e| log_failure("delete", member_id, e))?;

        metrics::counter!("billing_invoices_deleted_total").increment(1);
        info!(invoice_id = id, member_id, "Invoice deleted, member rolled back");
        Ok(())
    }

    async fn try_delete(&self, id: i32) -> DomainResult<()> {
        let invoice = self.get_invoice(id).await?;
        let newer = self
            .repos
            .invoices()
            .find_newer_for_member(invoice.member_id, invoice.id)
            .await?;
        let restore = compute_rollback(&invoice, newer)?;
        let member = self.load_member(invoice.member_id).await?;
        self.repos
            .ledger()
            .remove(&invoice, member.balance(), restore)
            .await
    }
}

/// Reject negative fines and round operator amounts to the money scale.
fn normalize_input(input: InvoiceInput) -> DomainResult<InvoiceInput> {
    if input.fine_amount < Decimal::ZERO {
        return Err(DomainError::Validation(
            "fine_amount must not be negative".into(),
        ));
    }
    Ok(InvoiceInput {
        fine_amount: round_money(input.fine_amount),
        collection_amount: round_money(input.collection_amount),
        fine_reason: input
            .fine_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
        ..input
    })
}

fn record_rejection(e: &BillingError) {
    metrics::counter!("billing_rejections_total", "kind" => e.kind()).increment(1);
}

fn log_failure(action: &'static str, member_id: i32, e: &DomainError) {
    match e {
        DomainError::Billing(b) => {
            record_rejection(b);
            info!(member_id, action, kind = b.kind(), "Billing request rejected: {}", b);
        }
        DomainError::Storage(_) => {
            warn!(member_id, action, error = %e, "Billing storage failure");
        }
        _ => {}
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberType, NewMember};
    use crate::infrastructure::InMemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn setup(units: u64, pending: Decimal) -> (BillingService, Arc<InMemoryStorage>, i32) {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .rates()
            .create_maintenance_rate(dec!(500), dec!(300))
            .await
            .unwrap();
        storage.rates().create_water_rate(dec!(10)).await.unwrap();
        let member = storage
            .members()
            .create(NewMember {
                flat_number: "A-101".into(),
                name: "John Doe".into(),
                member_type: MemberType::Owner,
                mobile: None,
                email: None,
                units_used: units,
                pending_amount: pending,
            })
            .await
            .unwrap();
        let service = BillingService::new(storage.clone(), "MNT");
        (service, storage, member.id)
    }

    fn sample_input(reading: u64, collection: Decimal) -> InvoiceInput {
        InvoiceInput {
            new_reading_units: reading,
            fine_amount: Decimal::ZERO,
            fine_reason: None,
            collection_amount: collection,
            collection_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        }
    }

    fn sample_update(collection: CollectionChange) -> InvoiceUpdateRequest {
        InvoiceUpdateRequest {
            new_reading_units: None,
            collection,
            updated_by: "admin".into(),
            reason: None,
        }
    }

    #[tokio::test]
    async fn create_persists_invoice_and_member_state() {
        let (service, storage, member_id) = setup(100, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(120, dec!(300)))
            .await
            .unwrap();

        assert_eq!(invoice.total_maintenance_amount, dec!(700));
        assert_eq!(invoice.pending_amount, dec!(400));
        let member = storage.members().find_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(member.units_used, 120);
        assert_eq!(member.pending_amount, dec!(400));
    }

    #[tokio::test]
    async fn rejected_create_leaves_member_untouched() {
        let (service, storage, member_id) = setup(100, dec!(0)).await;
        let err = service
            .create_invoice(member_id, sample_input(90, dec!(0)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Billing(BillingError::InvalidReading { .. })
        ));
        let member = storage.members().find_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(member.units_used, 100);
        assert_eq!(storage.invoices().count_for_member(member_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_rates_block_billing() {
        let storage = Arc::new(InMemoryStorage::new());
        let member = storage
            .members()
            .create(NewMember {
                flat_number: "B-1".into(),
                name: "X".into(),
                member_type: MemberType::Rent,
                mobile: None,
                email: None,
                units_used: 0,
                pending_amount: Decimal::ZERO,
            })
            .await
            .unwrap();
        let service = BillingService::new(storage, "MNT");
        let err = service
            .create_invoice(member.id, sample_input(1, dec!(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn negative_fine_rejected() {
        let (service, _, member_id) = setup(0, dec!(0)).await;
        let mut input = sample_input(0, dec!(0));
        input.fine_amount = dec!(-5);
        let err = service.create_invoice(member_id, input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn preview_does_not_persist() {
        let (service, storage, member_id) = setup(100, dec!(50)).await;
        let preview = service
            .preview_invoice(member_id, sample_input(110, dec!(0)))
            .await
            .unwrap();

        assert_eq!(preview.invoice.total_maintenance_amount, dec!(650));
        assert_eq!(storage.invoices().count_for_member(member_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn additional_collection_adds_to_existing() {
        let (service, storage, member_id) = setup(100, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(120, dec!(300)))
            .await
            .unwrap();

        let updated = service
            .update_invoice(invoice.id, sample_update(CollectionChange::Add(dec!(250))))
            .await
            .unwrap();

        assert_eq!(updated.collection_amount, dec!(550));
        assert_eq!(updated.pending_amount, dec!(150));
        assert_eq!(updated.update_history.len(), 1);
        let member = storage.members().find_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(member.pending_amount, dec!(150));
    }

    #[tokio::test]
    async fn noop_update_adds_no_history() {
        let (service, _, member_id) = setup(100, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(120, dec!(300)))
            .await
            .unwrap();

        let same = service
            .update_invoice(invoice.id, sample_update(CollectionChange::Set(dec!(300))))
            .await
            .unwrap();
        assert!(same.update_history.is_empty());
        assert_eq!(same, invoice);
    }

    #[tokio::test]
    async fn update_requires_actor() {
        let (service, _, member_id) = setup(0, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(0, dec!(0)))
            .await
            .unwrap();
        let mut request = sample_update(CollectionChange::Set(dec!(100)));
        request.updated_by = "  ".into();
        let err = service.update_invoice(invoice.id, request).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_restores_previous_state() {
        let (service, storage, member_id) = setup(100, dec!(25)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(140, dec!(100)))
            .await
            .unwrap();

        service.delete_invoice(invoice.id).await.unwrap();

        let member = storage.members().find_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(member.units_used, 100);
        assert_eq!(member.pending_amount, dec!(25));
        assert!(matches!(
            service.get_invoice(invoice.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn only_latest_invoice_can_change() {
        let (service, _, member_id) = setup(0, dec!(0)).await;
        let first = service
            .create_invoice(member_id, sample_input(10, dec!(0)))
            .await
            .unwrap();
        let second = service
            .create_invoice(member_id, sample_input(20, dec!(0)))
            .await
            .unwrap();

        let err = service.delete_invoice(first.id).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Billing(BillingError::OrderingViolation { blocking_invoice_id, .. })
                if blocking_invoice_id == second.id
        ));

        let err = service
            .update_invoice(first.id, sample_update(CollectionChange::Set(dec!(1))))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Billing(BillingError::OrderingViolation { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_creates_for_one_member_serialize() {
        let (service, storage, member_id) = setup(0, dec!(0)).await;
        let service = Arc::new(service);

        // Same reading every time, so spawn order cannot cause a rejection.
        let mut handles = Vec::new();
        for collection in [dec!(0), dec!(100), dec!(200), dec!(300), dec!(400)] {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create_invoice(member_id, sample_input(10, collection))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut chain = storage.invoices().find_by_member(member_id).await.unwrap();
        assert_eq!(chain.len(), 5);
        chain.sort_by_key(|i| i.id);

        assert_eq!(chain[0].previous_unit_used, 0);
        assert_eq!(chain[0].previous_pending_amount, dec!(0));
        for pair in chain.windows(2) {
            assert_eq!(pair[1].previous_unit_used, pair[0].new_reading_units);
            assert_eq!(pair[1].previous_pending_amount, pair[0].pending_amount);
        }

        let last = chain.last().unwrap();
        let member = storage.members().find_by_id(member_id).await.unwrap().unwrap();
        assert_eq!(member.units_used, 10);
        assert_eq!(member.pending_amount, last.pending_amount);
        // 100 water once plus five fixed charges of 500, less 1000 collected.
        assert_eq!(member.pending_amount, dec!(1600));
    }

    #[tokio::test]
    async fn additional_collection_overflow_is_rejected() {
        let (service, _, member_id) = setup(0, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(0, dec!(500)))
            .await
            .unwrap();
        let err = service
            .update_invoice(invoice.id, sample_update(CollectionChange::Add(Decimal::MAX)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Billing(BillingError::AmountOverflow)
        ));
    }

    #[tokio::test]
    async fn list_filters_by_search_and_member() {
        let (service, _, member_id) = setup(0, dec!(0)).await;
        let invoice = service
            .create_invoice(member_id, sample_input(5, dec!(0)))
            .await
            .unwrap();

        let by_no = service
            .list_invoices(
                &InvoiceFilter {
                    search: Some(invoice.maintenance_no("MNT")),
                    member_id: None,
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_no.total, 1);

        let other = service
            .list_invoices(
                &InvoiceFilter {
                    search: None,
                    member_id: Some(member_id + 1),
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(other.total, 0);
    }
}
