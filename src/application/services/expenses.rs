//! Expense book-keeping service

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{
    DomainError, DomainResult, Expense, ExpenseCategory, NewExpense, PaymentMode, PaymentStatus,
    RepositoryProvider, VendorType,
};
use crate::shared::money::round_money;
use crate::shared::validations::MAX_AMOUNT;
use crate::shared::{PaginatedResult, PaginationParams};

/// List filter. Dates bound the start of the expense period, inclusive.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub search: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub status: Option<PaymentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ExpenseFilter {
    fn matches(&self, expense: &Expense, prefix: &str) -> bool {
        self.search
            .as_deref()
            .map_or(true, |s| expense.matches_search(s, prefix))
            && self.category.map_or(true, |c| expense.category == c)
            && self.status.map_or(true, |s| expense.payment_status == s)
            && self.date_from.map_or(true, |d| expense.date_from >= d)
            && self.date_to.map_or(true, |d| expense.date_from <= d)
    }
}

/// Partial expense update; absent fields are kept.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_mode: Option<PaymentMode>,
    pub payment_status: Option<PaymentStatus>,
    pub vendor_name: Option<String>,
    pub vendor_type: Option<VendorType>,
    pub vendor_contact: Option<String>,
}

fn required(field: &str, value: String) -> DomainResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

fn normalize(expense: NewExpense) -> DomainResult<NewExpense> {
    if expense.date_to < expense.date_from {
        return Err(DomainError::Validation(format!(
            "date_to {} is before date_from {}",
            expense.date_to, expense.date_from
        )));
    }
    if expense.amount <= Decimal::ZERO {
        return Err(DomainError::Validation("amount must be positive".into()));
    }
    if expense.amount > MAX_AMOUNT {
        return Err(DomainError::Validation(format!(
            "amount must not exceed {}",
            MAX_AMOUNT
        )));
    }

    Ok(NewExpense {
        date_from: expense.date_from,
        date_to: expense.date_to,
        category: expense.category,
        description: required("description", expense.description)?,
        amount: round_money(expense.amount),
        payment_mode: expense.payment_mode,
        payment_status: expense.payment_status,
        vendor_name: required("vendor_name", expense.vendor_name)?,
        vendor_type: expense.vendor_type,
        vendor_contact: expense
            .vendor_contact
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    })
}

pub struct ExpenseService {
    repos: Arc<dyn RepositoryProvider>,
    expense_prefix: String,
}

impl ExpenseService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, expense_prefix: impl Into<String>) -> Self {
        Self {
            repos,
            expense_prefix: expense_prefix.into(),
        }
    }

    pub fn expense_prefix(&self) -> &str {
        &self.expense_prefix
    }

    pub async fn create(&self, expense: NewExpense) -> DomainResult<Expense> {
        let created = self.repos.expenses().create(normalize(expense)?).await?;
        info!(
            expense_id = created.id,
            category = created.category.as_str(),
            amount = %created.amount,
            "Expense recorded"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> DomainResult<Expense> {
        self.repos
            .expenses()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Expense", "id", id))
    }

    /// Latest period first.
    pub async fn list(
        &self,
        filter: &ExpenseFilter,
        params: PaginationParams,
    ) -> DomainResult<PaginatedResult<Expense>> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if to < from {
                return Err(DomainError::Validation(
                    "date_to must not be before date_from".into(),
                ));
            }
        }
        let matching: Vec<Expense> = self
            .repos
            .expenses()
            .find_all()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e, &self.expense_prefix))
            .collect();
        Ok(PaginatedResult::from_vec(matching, params))
    }

    pub async fn update(&self, id: i32, update: ExpenseUpdate) -> DomainResult<Expense> {
        let current = self.get(id).await?;
        let candidate = normalize(NewExpense {
            date_from: update.date_from.unwrap_or(current.date_from),
            date_to: update.date_to.unwrap_or(current.date_to),
            category: update.category.unwrap_or(current.category),
            description: update
                .description
                .unwrap_or_else(|| current.description.clone()),
            amount: update.amount.unwrap_or(current.amount),
            payment_mode: update.payment_mode.unwrap_or(current.payment_mode),
            payment_status: update.payment_status.unwrap_or(current.payment_status),
            vendor_name: update
                .vendor_name
                .unwrap_or_else(|| current.vendor_name.clone()),
            vendor_type: update.vendor_type.unwrap_or(current.vendor_type),
            vendor_contact: update
                .vendor_contact
                .or_else(|| current.vendor_contact.clone()),
        })?;

        let updated = self
            .repos
            .expenses()
            .update(Expense {
                id,
                date_from: candidate.date_from,
                date_to: candidate.date_to,
                category: candidate.category,
                description: candidate.description,
                amount: candidate.amount,
                payment_mode: candidate.payment_mode,
                payment_status: candidate.payment_status,
                vendor_name: candidate.vendor_name,
                vendor_type: candidate.vendor_type,
                vendor_contact: candidate.vendor_contact,
                created_at: current.created_at,
                updated_at: current.updated_at,
            })
            .await?;
        info!(
            expense_id = id,
            status = updated.payment_status.as_str(),
            "Expense updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> DomainResult<()> {
        self.repos.expenses().delete(id).await?;
        info!(expense_id = id, "Expense deleted");
        Ok(())
    }
}
