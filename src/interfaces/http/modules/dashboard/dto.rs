//! Dashboard DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::{DashboardFilter, DashboardSummary, MonthlyCollection};
use crate::interfaces::http::modules::expenses::ExpenseResponse;
use crate::interfaces::http::modules::maintenance::MaintenanceRecordResponse;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Calendar year of `collection_date` (expenses: `date_from`); omit for all years
    pub year: Option<i32>,
    /// 1..12; omit for the whole year
    pub month: Option<u32>,
}

impl From<DashboardQuery> for DashboardFilter {
    fn from(q: DashboardQuery) -> Self {
        Self {
            year: q.year,
            month: q.month,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyCollectionResponse {
    pub year: i32,
    pub month: u32,
    pub invoice_count: usize,
    #[schema(value_type = String)]
    pub billed: Decimal,
    #[schema(value_type = String)]
    pub collected: Decimal,
    #[schema(value_type = String)]
    pub expenses: Decimal,
}

impl From<MonthlyCollection> for MonthlyCollectionResponse {
    fn from(m: MonthlyCollection) -> Self {
        Self {
            year: m.year,
            month: m.month,
            invoice_count: m.invoice_count,
            billed: m.billed,
            collected: m.collected,
            expenses: m.expenses,
        }
    }
}

/// Period totals plus society-wide outstanding balance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub currency: String,
    pub invoice_count: usize,
    #[schema(value_type = String)]
    pub total_billed: Decimal,
    #[schema(value_type = String)]
    pub total_collected: Decimal,
    #[schema(value_type = String)]
    pub total_fines: Decimal,
    #[schema(value_type = String)]
    pub total_water: Decimal,
    #[schema(value_type = String)]
    pub total_fixed: Decimal,
    /// Sum of every member's current pending amount, regardless of period
    #[schema(value_type = String)]
    pub outstanding_pending: Decimal,
    pub members_with_pending: usize,
    pub member_count: usize,
    #[schema(value_type = String)]
    pub total_expenses: Decimal,
    pub pending_expense_count: usize,
    #[schema(value_type = String)]
    pub pending_expense_amount: Decimal,
    pub monthly: Vec<MonthlyCollectionResponse>,
    pub recent: Vec<MaintenanceRecordResponse>,
    pub recent_expenses: Vec<ExpenseResponse>,
    pub available_years: Vec<i32>,
}

impl DashboardResponse {
    pub fn new(
        summary: DashboardSummary,
        invoice_prefix: &str,
        expense_prefix: &str,
        currency: &str,
    ) -> Self {
        Self {
            year: summary.filter.year,
            month: summary.filter.month,
            currency: currency.to_string(),
            invoice_count: summary.invoice_count,
            total_billed: summary.total_billed,
            total_collected: summary.total_collected,
            total_fines: summary.total_fines,
            total_water: summary.total_water,
            total_fixed: summary.total_fixed,
            outstanding_pending: summary.outstanding_pending,
            members_with_pending: summary.members_with_pending,
            member_count: summary.member_count,
            total_expenses: summary.total_expenses,
            pending_expense_count: summary.pending_expense_count,
            pending_expense_amount: summary.pending_expense_amount,
            monthly: summary.monthly.into_iter().map(Into::into).collect(),
            recent: summary
                .recent
                .into_iter()
                .map(|i| MaintenanceRecordResponse::new(i, invoice_prefix, currency))
                .collect(),
            recent_expenses: summary
                .recent_expenses
                .into_iter()
                .map(|e| ExpenseResponse::new(e, expense_prefix, currency))
                .collect(),
            available_years: summary.available_years,
        }
    }
}
