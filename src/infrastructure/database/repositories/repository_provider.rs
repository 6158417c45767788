//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::expense::ExpenseRepository;
use crate::domain::invoice::{BillingLedger, InvoiceRepository};
use crate::domain::member::MemberRepository;
use crate::domain::rates::RateRepository;
use crate::domain::repositories::RepositoryProvider;

use super::expense_repository::SeaOrmExpenseRepository;
use super::invoice_repository::{SeaOrmBillingLedger, SeaOrmInvoiceRepository};
use super::member_repository::SeaOrmMemberRepository;
use super::rate_repository::SeaOrmRateRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let member = repos.members().find_by_flat_number("A-101").await?;
/// let invoices = repos.invoices().find_by_member(member.id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    members: SeaOrmMemberRepository,
    rates: SeaOrmRateRepository,
    invoices: SeaOrmInvoiceRepository,
    ledger: SeaOrmBillingLedger,
    expenses: SeaOrmExpenseRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            members: SeaOrmMemberRepository::new(db.clone()),
            rates: SeaOrmRateRepository::new(db.clone()),
            invoices: SeaOrmInvoiceRepository::new(db.clone()),
            ledger: SeaOrmBillingLedger::new(db.clone()),
            expenses: SeaOrmExpenseRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn members(&self) -> &dyn MemberRepository {
        &self.members
    }

    fn rates(&self) -> &dyn RateRepository {
        &self.rates
    }

    fn invoices(&self) -> &dyn InvoiceRepository {
        &self.invoices
    }

    fn ledger(&self) -> &dyn BillingLedger {
        &self.ledger
    }

    fn expenses(&self) -> &dyn ExpenseRepository {
        &self.expenses
    }
}
