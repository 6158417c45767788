//! Dashboard aggregation over invoices, expenses and member balances

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult, Expense, Invoice, RepositoryProvider};

const RECENT_LIMIT: usize = 5;

/// Period filter; `None` means every year (or every month).
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCollection {
    pub year: i32,
    pub month: u32,
    pub invoice_count: usize,
    pub billed: Decimal,
    pub collected: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub filter: DashboardFilter,
    pub invoice_count: usize,
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub total_fines: Decimal,
    pub total_water: Decimal,
    pub total_fixed: Decimal,
    /// Current balances across all members, independent of the period.
    pub outstanding_pending: Decimal,
    pub members_with_pending: usize,
    pub member_count: usize,
    /// Ascending by (year, month).
    pub monthly: Vec<MonthlyCollection>,
    /// Expenses whose period starts inside the filter.
    pub total_expenses: Decimal,
    pub pending_expense_count: usize,
    pub pending_expense_amount: Decimal,
    /// Newest first.
    pub recent: Vec<Invoice>,
    /// Latest period first.
    pub recent_expenses: Vec<Expense>,
    /// Descending.
    pub available_years: Vec<i32>,
}

pub struct DashboardService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DashboardService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn summary(&self, filter: DashboardFilter) -> DomainResult<DashboardSummary> {
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(DomainError::Validation(format!(
                    "month must be between 1 and 12, got {}",
                    month
                )));
            }
        }

        let all = self.repos.invoices().find_all().await?;
        let members = self.repos.members().find_all().await?;
        let expenses = self.repos.expenses().find_all().await?;

        let available_years: Vec<i32> = all
            .iter()
            .map(Invoice::year)
            .chain(expenses.iter().map(Expense::year))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect();

        let in_period: Vec<Invoice> = all
            .into_iter()
            .filter(|i| filter.year.map_or(true, |y| i.year() == y))
            .filter(|i| filter.month.map_or(true, |m| i.month() == m))
            .collect();
        let expenses_in_period: Vec<Expense> = expenses
            .into_iter()
            .filter(|e| filter.year.map_or(true, |y| e.year() == y))
            .filter(|e| filter.month.map_or(true, |m| e.month() == m))
            .collect();

        let mut monthly: BTreeMap<(i32, u32), MonthlyCollection> = BTreeMap::new();
        let mut summary = DashboardSummary {
            filter,
            invoice_count: in_period.len(),
            total_billed: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_fines: Decimal::ZERO,
            total_water: Decimal::ZERO,
            total_fixed: Decimal::ZERO,
            outstanding_pending: members.iter().map(|m| m.pending_amount).sum(),
            members_with_pending: members
                .iter()
                .filter(|m| m.pending_amount > Decimal::ZERO)
                .count(),
            member_count: members.len(),
            total_expenses: Decimal::ZERO,
            pending_expense_count: 0,
            pending_expense_amount: Decimal::ZERO,
            monthly: Vec::new(),
            recent: Vec::new(),
            recent_expenses: Vec::new(),
            available_years,
        };

        for invoice in &in_period {
            summary.total_billed += invoice.total_maintenance_amount;
            summary.total_collected += invoice.collection_amount;
            summary.total_fines += invoice.fine_amount;
            summary.total_water += invoice.water_maintenance_amount;
            summary.total_fixed += invoice.fixed_maintenance_amount;

            let entry = month_entry(&mut monthly, invoice.year(), invoice.month());
            entry.invoice_count += 1;
            entry.billed += invoice.total_maintenance_amount;
            entry.collected += invoice.collection_amount;
        }

        for expense in &expenses_in_period {
            summary.total_expenses += expense.amount;
            if expense.is_pending() {
                summary.pending_expense_count += 1;
                summary.pending_expense_amount += expense.amount;
            }
            month_entry(&mut monthly, expense.year(), expense.month()).expenses +=
                expense.amount;
        }

        summary.monthly = monthly.into_values().collect();
        summary.recent = in_period.into_iter().take(RECENT_LIMIT).collect();
        summary.recent_expenses = expenses_in_period
            .into_iter()
            .take(RECENT_LIMIT)
            .collect();
        Ok(summary)
    }
}

fn month_entry(
    monthly: &mut BTreeMap<(i32, u32), MonthlyCollection>,
    year: i32,
    month: u32,
) -> &mut MonthlyCollection {
    monthly
        .entry((year, month))
        .or_insert_with(|| MonthlyCollection {
            year,
            month,
            invoice_count: 0,
            billed: Decimal::ZERO,
            collected: Decimal::ZERO,
            expenses: Decimal::ZERO,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::BillingService;
    use crate::domain::{
        ExpenseCategory, InvoiceInput, MemberType, NewExpense, NewMember, PaymentMode,
        PaymentStatus, VendorType,
    };
    use crate::infrastructure::InMemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn seeded() -> Arc<InMemoryStorage> {
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
                flat_number: "A-1".into(),
                name: "Asha".into(),
                member_type: MemberType::Owner,
                mobile: None,
                email: None,
                units_used: 0,
                pending_amount: Decimal::ZERO,
            })
            .await
            .unwrap();

        let billing = BillingService::new(storage.clone(), "MNT");
        for (reading, fine, collected, (y, m)) in [
            (10u64, dec!(0), dec!(600), (2024, 12)),
            (20, dec!(50), dec!(200), (2025, 1)),
            (25, dec!(0), dec!(100), (2025, 2)),
        ] {
            billing
                .create_invoice(
                    member.id,
                    InvoiceInput {
                        new_reading_units: reading,
                        fine_amount: fine,
                        fine_reason: None,
                        collection_amount: collected,
                        collection_date: NaiveDate::from_ymd_opt(y, m, 3).unwrap(),
                    },
                )
                .await
                .unwrap();
        }

        for (amount, status, (y, m)) in [
            (dec!(1200), PaymentStatus::Paid, (2025, 1)),
            (dec!(800), PaymentStatus::Pending, (2025, 3)),
            (dec!(300), PaymentStatus::Pending, (2023, 6)),
        ] {
            storage
                .expenses()
                .create(NewExpense {
                    date_from: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
                    date_to: NaiveDate::from_ymd_opt(y, m, 28).unwrap(),
                    category: ExpenseCategory::Water,
                    description: "Tanker supply".into(),
                    amount,
                    payment_mode: PaymentMode::Cash,
                    payment_status: status,
                    vendor_name: "Tanker Co".into(),
                    vendor_type: VendorType::Individual,
                    vendor_contact: None,
                })
                .await
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn summary_for_one_year() {
        let service = DashboardService::new(seeded().await);
        let s = service
            .summary(DashboardFilter {
                year: Some(2025),
                month: None,
            })
            .await
            .unwrap();

        assert_eq!(s.invoice_count, 2);
        assert_eq!(s.total_fines, dec!(50));
        assert_eq!(s.total_collected, dec!(300));
        assert_eq!(s.total_water, dec!(150));
        assert_eq!(s.total_fixed, dec!(1000));
        assert_eq!(s.available_years, vec![2025, 2024, 2023]);
        assert_eq!(
            s.monthly.iter().map(|m| m.month).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // 600 - 600 = 0; 0 + 100 + 500 + 50 - 200 = 450; 450 + 50 + 500 - 100 = 900
        assert_eq!(s.outstanding_pending, dec!(900));
        assert_eq!(s.members_with_pending, 1);
    }

    #[tokio::test]
    async fn expenses_totalled_for_period() {
        let service = DashboardService::new(seeded().await);
        let s = service
            .summary(DashboardFilter {
                year: Some(2025),
                month: None,
            })
            .await
            .unwrap();

        assert_eq!(s.total_expenses, dec!(2000));
        assert_eq!(s.pending_expense_count, 1);
        assert_eq!(s.pending_expense_amount, dec!(800));
        assert_eq!(s.recent_expenses.len(), 2);
        assert_eq!(s.recent_expenses[0].month(), 3);

        let march = s.monthly.iter().find(|m| m.month == 3).unwrap();
        assert_eq!(march.invoice_count, 0);
        assert_eq!(march.expenses, dec!(800));
        let january = s.monthly.iter().find(|m| m.month == 1).unwrap();
        assert_eq!((january.invoice_count, january.expenses), (1, dec!(1200)));
    }

    #[tokio::test]
    async fn month_filter_narrows_period() {
        let service = DashboardService::new(seeded().await);
        let s = service
            .summary(DashboardFilter {
                year: None,
                month: Some(12),
            })
            .await
            .unwrap();
        assert_eq!(s.invoice_count, 1);
        assert_eq!(s.total_billed, dec!(600));
        assert_eq!(s.recent.len(), 1);
    }

    #[tokio::test]
    async fn invalid_month_rejected() {
        let service = DashboardService::new(seeded().await);
        assert!(matches!(
            service
                .summary(DashboardFilter {
                    year: None,
                    month: Some(13)
                })
                .await,
            Err(DomainError::Validation(_))
        ));
    }
}
