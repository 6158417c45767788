//! Invoice (maintenance record) aggregate

pub mod model;
pub mod repository;

pub use model::{
    FieldChange, Invoice, InvoiceAmendment, InvoiceInput, NewInvoice, UpdateHistoryEntry,
};
pub use repository::{BillingLedger, InvoiceRepository};
