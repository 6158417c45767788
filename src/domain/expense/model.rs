//! Expense domain entity

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Budget head an expense is booked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Electricity,
    Water,
    Maintenance,
    Security,
    Housekeeping,
    Repairs,
    OfficeAdmin,
    FestivalEvent,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [Self; 9] = [
        Self::Electricity,
        Self::Water,
        Self::Maintenance,
        Self::Security,
        Self::Housekeeping,
        Self::Repairs,
        Self::OfficeAdmin,
        Self::FestivalEvent,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "ELECTRICITY",
            Self::Water => "WATER",
            Self::Maintenance => "MAINTENANCE",
            Self::Security => "SECURITY",
            Self::Housekeeping => "HOUSEKEEPING",
            Self::Repairs => "REPAIRS",
            Self::OfficeAdmin => "OFFICE_ADMIN",
            Self::FestivalEvent => "FESTIVAL_EVENT",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    BankTransfer,
    Cheque,
    Upi,
}

impl PaymentMode {
    pub const ALL: [Self; 4] = [Self::Cash, Self::BankTransfer, Self::Cheque, Self::Upi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cheque => "CHEQUE",
            Self::Upi => "UPI",
        }
    }
}

/// Whether the society has settled the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
}

impl PaymentStatus {
    pub const ALL: [Self; 2] = [Self::Paid, Self::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Pending => "PENDING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorType {
    Individual,
    Company,
}

impl VendorType {
    pub const ALL: [Self; 2] = [Self::Individual, Self::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Company => "COMPANY",
        }
    }
}

/// Display and case-insensitive parsing from the wire labels.
macro_rules! impl_label {
    ($ty:ty, $what:literal) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_uppercase();
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| format!("unknown {}: {}", $what, s.trim()))
            }
        }
    };
}

impl_label!(ExpenseCategory, "expense category");
impl_label!(PaymentMode, "payment mode");
impl_label!(PaymentStatus, "payment status");
impl_label!(VendorType, "vendor type");

/// A bill the society pays out, covering the period `date_from..=date_to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub vendor_name: String,
    pub vendor_type: VendorType,
    pub vendor_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Voucher number, e.g. `EXP-000007`.
    pub fn expense_no(&self, prefix: &str) -> String {
        format!("{}-{:06}", prefix, self.id)
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }

    /// Expenses are reported in the month their period starts.
    pub fn year(&self) -> i32 {
        self.date_from.year()
    }

    pub fn month(&self) -> u32 {
        self.date_from.month()
    }

    pub fn matches_search(&self, needle: &str, prefix: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.expense_no(prefix).to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.vendor_name.to_lowercase().contains(&needle)
            || self
                .vendor_contact
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}

/// Fields accepted when booking an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub vendor_name: String,
    pub vendor_type: VendorType,
    pub vendor_contact: Option<String>,
}
