//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::domain::billing::ensure_latest;
use crate::domain::expense::ExpenseRepository;
use crate::domain::invoice::{BillingLedger, InvoiceRepository};
use crate::domain::member::MemberRepository;
use crate::domain::rates::RateRepository;
use crate::domain::{
    DomainError, DomainResult, Expense, Invoice, MaintenanceRate, Member, MemberBalance, NewInvoice,
    NewExpense, NewMember, RepositoryProvider, WaterRate,
};

/// In-memory storage for development and testing
///
/// Ledger writes are serialized by one async mutex; each write then holds
/// the member's map entry while it checks and updates the balance.
pub struct InMemoryStorage {
    members: DashMap<i32, Member>,
    invoices: DashMap<i32, Invoice>,
    maintenance_rate: DashMap<i32, MaintenanceRate>,
    water_rate: DashMap<i32, WaterRate>,
    expenses: DashMap<i32, Expense>,
    member_counter: AtomicI32,
    invoice_counter: AtomicI32,
    rate_counter: AtomicI32,
    expense_counter: AtomicI32,
    ledger_lock: Mutex<()>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            invoices: DashMap::new(),
            maintenance_rate: DashMap::new(),
            water_rate: DashMap::new(),
            expenses: DashMap::new(),
            member_counter: AtomicI32::new(1),
            invoice_counter: AtomicI32::new(1),
            rate_counter: AtomicI32::new(1),
            expense_counter: AtomicI32::new(1),
            ledger_lock: Mutex::new(()),
        }
    }

    fn newer_for_member(&self, member_id: i32, invoice_id: i32) -> Option<i32> {
        self.invoices
            .iter()
            .filter(|e| e.member_id == member_id && e.id > invoice_id)
            .map(|e| e.id)
            .min()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn balance_conflict(member_id: i32, expected: MemberBalance, actual: MemberBalance) -> DomainError {
    DomainError::Conflict(format!(
        "Member {} changed concurrently (expected units {} / pending {}, found units {} / pending {})",
        member_id,
        expected.units_used,
        expected.pending_amount,
        actual.units_used,
        actual.pending_amount
    ))
}

fn newest_first(mut invoices: Vec<Invoice>) -> Vec<Invoice> {
    invoices.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    invoices
}

// ── Members ────────────────────────────────────────────────────

#[async_trait]
impl MemberRepository for InMemoryStorage {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Member>> {
        Ok(self.members.get(&id).map(|m| m.clone()))
    }

    async fn find_by_flat_number(&self, flat_number: &str) -> DomainResult<Option<Member>> {
        Ok(self
            .members
            .iter()
            .find(|m| m.flat_number.eq_ignore_ascii_case(flat_number))
            .map(|m| m.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Member>> {
        let mut members: Vec<Member> = self.members.iter().map(|e| e.value().clone()).collect();
        members.sort_by(|a, b| a.flat_number.cmp(&b.flat_number));
        Ok(members)
    }

    async fn create(&self, member: NewMember) -> DomainResult<Member> {
        if MemberRepository::find_by_flat_number(self, &member.flat_number)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Flat {} already has a member",
                member.flat_number
            )));
        }

        let now = Utc::now();
        let id = self.member_counter.fetch_add(1, Ordering::SeqCst);
        let created = Member {
            id,
            flat_number: member.flat_number,
            name: member.name,
            member_type: member.member_type,
            mobile: member.mobile,
            email: member.email,
            units_used: member.units_used,
            pending_amount: member.pending_amount,
            created_at: now,
            updated_at: now,
        };
        self.members.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, member: Member) -> DomainResult<Member> {
        let mut entry = self
            .members
            .get_mut(&member.id)
            .ok_or_else(|| DomainError::not_found("Member", "id", member.id))?;
        let updated = Member {
            updated_at: Utc::now(),
            ..member
        };
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.members
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Member", "id", id))?;
        Ok(())
    }
}

// ── Rates ──────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for InMemoryStorage {
    async fn get_maintenance_rate(&self) -> DomainResult<Option<MaintenanceRate>> {
        Ok(self.maintenance_rate.iter().next().map(|r| r.clone()))
    }

    async fn create_maintenance_rate(
        &self,
        owner_rate: Decimal,
        rent_rate: Decimal,
    ) -> DomainResult<MaintenanceRate> {
        if !self.maintenance_rate.is_empty() {
            return Err(DomainError::Conflict(
                "Maintenance rate already configured".into(),
            ));
        }
        let now = Utc::now();
        let rate = MaintenanceRate {
            id: self.rate_counter.fetch_add(1, Ordering::SeqCst),
            owner_rate,
            rent_rate,
            created_at: now,
            updated_at: now,
        };
        self.maintenance_rate.insert(rate.id, rate.clone());
        Ok(rate)
    }

    async fn update_maintenance_rate(&self, rate: MaintenanceRate) -> DomainResult<MaintenanceRate> {
        let mut entry = self
            .maintenance_rate
            .get_mut(&rate.id)
            .ok_or_else(|| DomainError::not_found("MaintenanceRate", "id", rate.id))?;
        let updated = MaintenanceRate {
            updated_at: Utc::now(),
            ..rate
        };
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete_maintenance_rate(&self, id: i32) -> DomainResult<()> {
        self.maintenance_rate
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("MaintenanceRate", "id", id))?;
        Ok(())
    }

    async fn get_water_rate(&self) -> DomainResult<Option<WaterRate>> {
        Ok(self.water_rate.iter().next().map(|r| r.clone()))
    }

    async fn create_water_rate(&self, unit_rate: Decimal) -> DomainResult<WaterRate> {
        if !self.water_rate.is_empty() {
            return Err(DomainError::Conflict("Water rate already configured".into()));
        }
        let now = Utc::now();
        let rate = WaterRate {
            id: self.rate_counter.fetch_add(1, Ordering::SeqCst),
            unit_rate,
            created_at: now,
            updated_at: now,
        };
        self.water_rate.insert(rate.id, rate.clone());
        Ok(rate)
    }

    async fn update_water_rate(&self, rate: WaterRate) -> DomainResult<WaterRate> {
        let mut entry = self
            .water_rate
            .get_mut(&rate.id)
            .ok_or_else(|| DomainError::not_found("WaterRate", "id", rate.id))?;
        let updated = WaterRate {
            updated_at: Utc::now(),
            ..rate
        };
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete_water_rate(&self, id: i32) -> DomainResult<()> {
        self.water_rate
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("WaterRate", "id", id))?;
        Ok(())
    }
}

// ── Invoices ───────────────────────────────────────────────────

#[async_trait]
impl InvoiceRepository for InMemoryStorage {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Invoice>> {
        Ok(self.invoices.get(&id).map(|i| i.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Invoice>> {
        Ok(newest_first(
            self.invoices.iter().map(|e| e.value().clone()).collect(),
        ))
    }

    async fn find_by_member(&self, member_id: i32) -> DomainResult<Vec<Invoice>> {
        Ok(newest_first(
            self.invoices
                .iter()
                .filter(|e| e.member_id == member_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn find_newer_for_member(
        &self,
        member_id: i32,
        invoice_id: i32,
    ) -> DomainResult<Option<i32>> {
        Ok(self.newer_for_member(member_id, invoice_id))
    }

    async fn count_for_member(&self, member_id: i32) -> DomainResult<u64> {
        Ok(self
            .invoices
            .iter()
            .filter(|e| e.member_id == member_id)
            .count() as u64)
    }
}

// ── Ledger ─────────────────────────────────────────────────────

#[async_trait]
impl BillingLedger for InMemoryStorage {
    async fn record(
        &self,
        invoice: NewInvoice,
        expected: MemberBalance,
        update: MemberBalance,
    ) -> DomainResult<Invoice> {
        let _guard = self.ledger_lock.lock().await;

        let member_id = invoice.member_id;
        let mut member = self
            .members
            .get_mut(&member_id)
            .ok_or_else(|| DomainError::not_found("Member", "id", member_id))?;
        if member.balance() != expected {
            return Err(balance_conflict(member_id, expected, member.balance()));
        }

        let now = Utc::now();
        let id = self.invoice_counter.fetch_add(1, Ordering::SeqCst);
        let created = Invoice::from_new(id, invoice, now);
        self.invoices.insert(id, created.clone());

        member.units_used = update.units_used;
        member.pending_amount = update.pending_amount;
        member.updated_at = now;

        Ok(created)
    }

    async fn amend(
        &self,
        invoice: Invoice,
        expected: MemberBalance,
        update: Option<MemberBalance>,
    ) -> DomainResult<Invoice> {
        let _guard = self.ledger_lock.lock().await;

        if !self.invoices.contains_key(&invoice.id) {
            return Err(DomainError::not_found("Invoice", "id", invoice.id));
        }
        ensure_latest(&invoice, self.newer_for_member(invoice.member_id, invoice.id))?;

        let mut member = self
            .members
            .get_mut(&invoice.member_id)
            .ok_or_else(|| DomainError::not_found("Member", "id", invoice.member_id))?;
        if member.balance() != expected {
            return Err(balance_conflict(invoice.member_id, expected, member.balance()));
        }

        self.invoices.insert(invoice.id, invoice.clone());
        if let Some(update) = update {
            member.units_used = update.units_used;
            member.pending_amount = update.pending_amount;
            member.updated_at = invoice.updated_at;
        }

        Ok(invoice)
    }

    async fn remove(
        &self,
        invoice: &Invoice,
        expected: MemberBalance,
        restore: MemberBalance,
    ) -> DomainResult<()> {
        let _guard = self.ledger_lock.lock().await;

        if !self.invoices.contains_key(&invoice.id) {
            return Err(DomainError::not_found("Invoice", "id", invoice.id));
        }
        ensure_latest(invoice, self.newer_for_member(invoice.member_id, invoice.id))?;

        let mut member = self
            .members
            .get_mut(&invoice.member_id)
            .ok_or_else(|| DomainError::not_found("Member", "id", invoice.member_id))?;
        if member.balance() != expected {
            return Err(balance_conflict(invoice.member_id, expected, member.balance()));
        }

        self.invoices.remove(&invoice.id);
        member.units_used = restore.units_used;
        member.pending_amount = restore.pending_amount;
        member.updated_at = Utc::now();

        Ok(())
    }
}

// ── Expenses ───────────────────────────────────────────────────

#[async_trait]
impl ExpenseRepository for InMemoryStorage {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Expense>> {
        Ok(self.expenses.get(&id).map(|e| e.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Expense>> {
        let mut expenses: Vec<Expense> =
            self.expenses.iter().map(|e| e.value().clone()).collect();
        expenses.sort_by(|a, b| {
            b.date_from
                .cmp(&a.date_from)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(expenses)
    }

    async fn create(&self, expense: NewExpense) -> DomainResult<Expense> {
        let now = Utc::now();
        let created = Expense {
            id: self.expense_counter.fetch_add(1, Ordering::SeqCst),
            date_from: expense.date_from,
            date_to: expense.date_to,
            category: expense.category,
            description: expense.description,
            amount: expense.amount,
            payment_mode: expense.payment_mode,
            payment_status: expense.payment_status,
            vendor_name: expense.vendor_name,
            vendor_type: expense.vendor_type,
            vendor_contact: expense.vendor_contact,
            created_at: now,
            updated_at: now,
        };
        self.expenses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, expense: Expense) -> DomainResult<Expense> {
        let mut entry = self
            .expenses
            .get_mut(&expense.id)
            .ok_or_else(|| DomainError::not_found("Expense", "id", expense.id))?;
        let updated = Expense {
            updated_at: Utc::now(),
            ..expense
        };
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.expenses
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Expense", "id", id))?;
        Ok(())
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn members(&self) -> &dyn MemberRepository {
        self
    }

    fn rates(&self) -> &dyn RateRepository {
        self
    }

    fn invoices(&self) -> &dyn InvoiceRepository {
        self
    }

    fn ledger(&self) -> &dyn BillingLedger {
        self
    }

    fn expenses(&self) -> &dyn ExpenseRepository {
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BillingError, ExpenseCategory, MemberType, PaymentMode, PaymentStatus, VendorType,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_member(flat: &str) -> NewMember {
        NewMember {
            flat_number: flat.into(),
            name: "Resident".into(),
            member_type: MemberType::Owner,
            mobile: None,
            email: None,
            units_used: 0,
            pending_amount: Decimal::ZERO,
        }
    }

    fn sample_invoice(member: &Member, new_reading: u64, pending: Decimal) -> NewInvoice {
        NewInvoice {
            member_id: member.id,
            flat_number: member.flat_number.clone(),
            member_name: member.name.clone(),
            member_type: member.member_type,
            collection_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            previous_unit_used: member.units_used,
            new_reading_units: new_reading,
            total_units: new_reading - member.units_used,
            water_unit_rate: dec!(1),
            water_maintenance_amount: Decimal::from(new_reading - member.units_used),
            fixed_maintenance_rate: Decimal::ZERO,
            fixed_maintenance_amount: Decimal::ZERO,
            previous_pending_amount: member.pending_amount,
            fine_amount: Decimal::ZERO,
            fine_reason: None,
            total_maintenance_amount: pending,
            collection_amount: Decimal::ZERO,
            pending_amount: pending,
        }
    }

    #[tokio::test]
    async fn duplicate_flat_rejected() {
        let storage = InMemoryStorage::new();
        storage.members().create(sample_member("A-1")).await.unwrap();
        let err = storage.members().create(sample_member("a-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn record_updates_member_balance() {
        let storage = InMemoryStorage::new();
        let member = storage.members().create(sample_member("A-1")).await.unwrap();
        let update = MemberBalance {
            units_used: 10,
            pending_amount: dec!(10),
        };

        let invoice = storage
            .ledger()
            .record(sample_invoice(&member, 10, dec!(10)), member.balance(), update)
            .await
            .unwrap();

        let stored = storage.members().find_by_id(member.id).await.unwrap().unwrap();
        assert_eq!(stored.balance(), update);
        assert_eq!(storage.invoices().count_for_member(member.id).await.unwrap(), 1);
        assert_eq!(
            storage.invoices().find_by_id(invoice.id).await.unwrap(),
            Some(invoice)
        );
    }

    #[tokio::test]
    async fn stale_snapshot_writes_nothing() {
        let storage = InMemoryStorage::new();
        let member = storage.members().create(sample_member("A-1")).await.unwrap();
        let stale = MemberBalance {
            units_used: 5,
            pending_amount: Decimal::ZERO,
        };

        let err = storage
            .ledger()
            .record(
                sample_invoice(&member, 10, dec!(10)),
                stale,
                MemberBalance::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(storage.invoices().count_for_member(member.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_blocked_by_newer_invoice() {
        let storage = InMemoryStorage::new();
        let mut member = storage.members().create(sample_member("A-1")).await.unwrap();

        let first_balance = MemberBalance {
            units_used: 10,
            pending_amount: dec!(10),
        };
        let first = storage
            .ledger()
            .record(sample_invoice(&member, 10, dec!(10)), member.balance(), first_balance)
            .await
            .unwrap();
        member.units_used = 10;
        member.pending_amount = dec!(10);

        let second_balance = MemberBalance {
            units_used: 15,
            pending_amount: dec!(15),
        };
        let second = storage
            .ledger()
            .record(sample_invoice(&member, 15, dec!(15)), first_balance, second_balance)
            .await
            .unwrap();

        assert_eq!(
            storage
                .invoices()
                .find_newer_for_member(member.id, first.id)
                .await
                .unwrap(),
            Some(second.id)
        );

        let err = storage
            .ledger()
            .remove(&first, second_balance, MemberBalance::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Billing(BillingError::OrderingViolation { blocking_invoice_id, .. })
                if blocking_invoice_id == second.id
        ));

        let listed = storage.invoices().find_by_member(member.id).await.unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    fn sample_expense(month: u32) -> NewExpense {
        NewExpense {
            date_from: NaiveDate::from_ymd_opt(2025, month, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, month, 28).unwrap(),
            category: ExpenseCategory::Security,
            description: "Guard salary".into(),
            amount: dec!(12000),
            payment_mode: PaymentMode::Cash,
            payment_status: PaymentStatus::Pending,
            vendor_name: "Shield Services".into(),
            vendor_type: VendorType::Company,
            vendor_contact: None,
        }
    }

    #[tokio::test]
    async fn expenses_listed_latest_period_first() {
        let storage = InMemoryStorage::new();
        let march = storage.expenses().create(sample_expense(3)).await.unwrap();
        let may = storage.expenses().create(sample_expense(5)).await.unwrap();
        let april = storage.expenses().create(sample_expense(4)).await.unwrap();

        let ids: Vec<i32> = storage
            .expenses()
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![may.id, april.id, march.id]);
    }

    #[tokio::test]
    async fn expense_update_and_delete() {
        let storage = InMemoryStorage::new();
        let mut expense = storage.expenses().create(sample_expense(3)).await.unwrap();
        expense.payment_status = PaymentStatus::Paid;

        let updated = storage.expenses().update(expense.clone()).await.unwrap();
        assert!(!updated.is_pending());

        storage.expenses().delete(expense.id).await.unwrap();
        let err = storage.expenses().delete(expense.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(storage.expenses().update(expense).await.is_err());
    }
}
