//! Billing rejections
//!
//! Local validation failures of the calculator. None of them is retried and
//! none leaves a partial result behind.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Meter readings never go backwards.
    #[error("New reading {new_reading} is below the previous reading {previous_reading}")]
    InvalidReading {
        previous_reading: u64,
        new_reading: u64,
    },

    /// Collection must lie within `0..=total_due`.
    #[error("Collection amount {collection} must be between 0 and the total due {total_due}")]
    InvalidCollection {
        collection: Decimal,
        total_due: Decimal,
    },

    /// A charge does not fit in `Decimal`.
    #[error("Invoice amounts are too large to compute")]
    AmountOverflow,

    /// Only a member's latest invoice may be amended or rolled back.
    #[error(
        "Invoice {invoice_id} of member {member_id} is not the latest: invoice {blocking_invoice_id} was created after it"
    )]
    OrderingViolation {
        invoice_id: i32,
        member_id: i32,
        blocking_invoice_id: i32,
    },
}

impl BillingError {
    /// Stable label for metrics and API error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidReading { .. } => "invalid_reading",
            Self::InvalidCollection { .. } => "invalid_collection",
            Self::AmountOverflow => "amount_overflow",
            Self::OrderingViolation { .. } => "ordering_violation",
        }
    }
}
