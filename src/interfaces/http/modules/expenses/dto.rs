//! Expense DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{ExpenseFilter, ExpenseUpdate};
use crate::domain::{Expense, NewExpense, PaymentStatus};
use crate::shared::validations::validate_amount;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: i32,
    /// Voucher number, e.g. `EXP-000007`
    pub expense_no: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// e.g. `ELECTRICITY`, `OFFICE_ADMIN`
    pub category: String,
    pub description: String,
    #[schema(value_type = String, example = "4200.00")]
    pub amount: Decimal,
    pub currency: String,
    /// `CASH`, `BANK_TRANSFER`, `CHEQUE` or `UPI`
    pub payment_mode: String,
    /// `PAID` or `PENDING`
    pub payment_status: String,
    pub vendor_name: String,
    /// `INDIVIDUAL` or `COMPANY`
    pub vendor_type: String,
    pub vendor_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExpenseResponse {
    pub fn new(e: Expense, prefix: &str, currency: &str) -> Self {
        Self {
            expense_no: e.expense_no(prefix),
            id: e.id,
            date_from: e.date_from,
            date_to: e.date_to,
            category: e.category.to_string(),
            description: e.description,
            amount: e.amount,
            currency: currency.to_string(),
            payment_mode: e.payment_mode.to_string(),
            payment_status: e.payment_status.to_string(),
            vendor_name: e.vendor_name,
            vendor_type: e.vendor_type.to_string(),
            vendor_contact: e.vendor_contact,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Enum fields take their labels case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExpenseRequest {
    pub date_from: NaiveDate,
    /// Must not be before `date_from`
    pub date_to: NaiveDate,
    pub category: String,
    #[validate(length(min = 1, max = 500, message = "description is required"))]
    pub description: String,
    #[schema(value_type = String, example = "4200")]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub payment_mode: String,
    /// Defaults to `PENDING`
    pub payment_status: Option<String>,
    #[validate(length(min = 1, max = 100, message = "vendor_name is required"))]
    pub vendor_name: String,
    pub vendor_type: String,
    #[validate(length(max = 100))]
    pub vendor_contact: Option<String>,
}

impl CreateExpenseRequest {
    pub fn into_new_expense(self) -> Result<NewExpense, String> {
        Ok(NewExpense {
            date_from: self.date_from,
            date_to: self.date_to,
            category: self.category.parse()?,
            description: self.description,
            amount: self.amount,
            payment_mode: self.payment_mode.parse()?,
            payment_status: match self.payment_status.as_deref() {
                Some(raw) => raw.parse()?,
                None => PaymentStatus::default(),
            },
            vendor_name: self.vendor_name,
            vendor_type: self.vendor_type.parse()?,
            vendor_contact: self.vendor_contact,
        })
    }
}

/// Absent fields are kept.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateExpenseRequest {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub category: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<Decimal>,
    pub payment_mode: Option<String>,
    pub payment_status: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub vendor_name: Option<String>,
    pub vendor_type: Option<String>,
    #[validate(length(max = 100))]
    pub vendor_contact: Option<String>,
}

fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, String>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(str::parse).transpose()
}

impl UpdateExpenseRequest {
    pub fn into_update(self) -> Result<ExpenseUpdate, String> {
        Ok(ExpenseUpdate {
            date_from: self.date_from,
            date_to: self.date_to,
            category: parse_opt(self.category.as_deref())?,
            description: self.description,
            amount: self.amount,
            payment_mode: parse_opt(self.payment_mode.as_deref())?,
            payment_status: parse_opt(self.payment_status.as_deref())?,
            vendor_name: self.vendor_name,
            vendor_type: parse_opt(self.vendor_type.as_deref())?,
            vendor_contact: self.vendor_contact,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseListQuery {
    /// Matches voucher number, description, vendor name or contact
    pub search: Option<String>,
    pub category: Option<String>,
    /// `PAID` or `PENDING`
    pub status: Option<String>,
    /// Earliest period start, inclusive
    pub date_from: Option<NaiveDate>,
    /// Latest period start, inclusive
    pub date_to: Option<NaiveDate>,
    /// 1-based, default 1
    pub page: Option<u32>,
    /// 1..100, default 20
    pub limit: Option<u32>,
}

impl ExpenseListQuery {
    pub fn filter(&self) -> Result<ExpenseFilter, String> {
        Ok(ExpenseFilter {
            search: self.search.clone(),
            category: parse_opt(self.category.as_deref())?,
            status: parse_opt(self.status.as_deref())?,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }
}
