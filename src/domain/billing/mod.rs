//! Billing calculation
//!
//! Pure invoice arithmetic: creation, rollback on delete, and audited
//! amendment. Persistence lives behind `BillingLedger`.

pub mod calculator;
pub mod error;

pub use calculator::{
    compute_invoice, compute_rollback, compute_update, ensure_latest, InvoiceComputation,
    InvoiceRevision,
};
pub use error::BillingError;
