pub mod billing;
pub mod expense;
pub mod invoice;
pub mod member;
pub mod rates;
pub mod repositories;

// Re-export commonly used types
pub use billing::{BillingError, InvoiceComputation, InvoiceRevision};
pub use expense::{
    Expense, ExpenseCategory, NewExpense, PaymentMode, PaymentStatus, VendorType,
};
pub use invoice::{
    FieldChange, Invoice, InvoiceAmendment, InvoiceInput, NewInvoice, UpdateHistoryEntry,
};
pub use member::{Member, MemberBalance, MemberType, NewMember};
pub use rates::{MaintenanceRate, RateSchedule, WaterRate};
pub use repositories::{DomainResult, RepositoryProvider};

pub use crate::shared::types::errors::DomainError;
