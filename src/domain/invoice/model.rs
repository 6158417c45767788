//! Maintenance invoice entity

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::member::MemberType;

/// One billing cycle's charges and payment for one member.
///
/// Rates and the member's prior state are frozen onto the invoice when it
/// is created; amendments recompute against those frozen values.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i32,
    pub member_id: i32,
    pub flat_number: String,
    pub member_name: String,
    pub member_type: MemberType,
    pub collection_date: NaiveDate,

    pub previous_unit_used: u64,
    pub new_reading_units: u64,
    pub total_units: u64,

    pub water_unit_rate: Decimal,
    pub water_maintenance_amount: Decimal,
    pub fixed_maintenance_rate: Decimal,
    pub fixed_maintenance_amount: Decimal,

    pub previous_pending_amount: Decimal,
    pub fine_amount: Decimal,
    pub fine_reason: Option<String>,
    pub total_maintenance_amount: Decimal,
    pub collection_amount: Decimal,
    pub pending_amount: Decimal,

    pub update_history: Vec<UpdateHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Materialize a computed invoice once storage has assigned its id.
    pub fn from_new(id: i32, new: NewInvoice, at: DateTime<Utc>) -> Self {
        Self {
            id,
            member_id: new.member_id,
            flat_number: new.flat_number,
            member_name: new.member_name,
            member_type: new.member_type,
            collection_date: new.collection_date,
            previous_unit_used: new.previous_unit_used,
            new_reading_units: new.new_reading_units,
            total_units: new.total_units,
            water_unit_rate: new.water_unit_rate,
            water_maintenance_amount: new.water_maintenance_amount,
            fixed_maintenance_rate: new.fixed_maintenance_rate,
            fixed_maintenance_amount: new.fixed_maintenance_amount,
            previous_pending_amount: new.previous_pending_amount,
            fine_amount: new.fine_amount,
            fine_reason: new.fine_reason,
            total_maintenance_amount: new.total_maintenance_amount,
            collection_amount: new.collection_amount,
            pending_amount: new.pending_amount,
            update_history: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Human-facing receipt number, e.g. `MNT-000042`.
    pub fn maintenance_no(&self, prefix: &str) -> String {
        format!("{}-{:06}", prefix, self.id)
    }

    pub fn year(&self) -> i32 {
        self.collection_date.year()
    }

    pub fn month(&self) -> u32 {
        self.collection_date.month()
    }

    /// `pending = max(0, total - collection)` and `total_units = new - previous`.
    pub fn is_consistent(&self) -> bool {
        let expected_pending =
            (self.total_maintenance_amount - self.collection_amount).max(Decimal::ZERO);
        self.pending_amount == expected_pending
            && self.total_units == self.new_reading_units.saturating_sub(self.previous_unit_used)
    }

    pub fn matches_search(&self, needle: &str, prefix: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.flat_number.to_lowercase().contains(&needle)
            || self.member_name.to_lowercase().contains(&needle)
            || self.maintenance_no(prefix).to_lowercase().contains(&needle)
    }
}

/// A computed invoice not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub member_id: i32,
    pub flat_number: String,
    pub member_name: String,
    pub member_type: MemberType,
    pub collection_date: NaiveDate,
    pub previous_unit_used: u64,
    pub new_reading_units: u64,
    pub total_units: u64,
    pub water_unit_rate: Decimal,
    pub water_maintenance_amount: Decimal,
    pub fixed_maintenance_rate: Decimal,
    pub fixed_maintenance_amount: Decimal,
    pub previous_pending_amount: Decimal,
    pub fine_amount: Decimal,
    pub fine_reason: Option<String>,
    pub total_maintenance_amount: Decimal,
    pub collection_amount: Decimal,
    pub pending_amount: Decimal,
}

/// Operator input for a new invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub new_reading_units: u64,
    pub fine_amount: Decimal,
    pub fine_reason: Option<String>,
    pub collection_amount: Decimal,
    pub collection_date: NaiveDate,
}

/// Partial change to an existing invoice. Absent fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvoiceAmendment {
    pub new_reading_units: Option<u64>,
    pub collection_amount: Option<Decimal>,
}

impl InvoiceAmendment {
    pub fn is_empty(&self) -> bool {
        self.new_reading_units.is_none() && self.collection_amount.is_none()
    }
}

/// One audited change to an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateHistoryEntry {
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(field: &str, old: impl ToString, new: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            old: old.to_string(),
            new: new.to_string(),
        }
    }
}
