//! Application services

mod billing;
mod dashboard;
mod expenses;
mod members;
mod rates;

pub use billing::{BillingService, CollectionChange, InvoiceFilter, InvoiceUpdateRequest};
pub use dashboard::{DashboardFilter, DashboardService, DashboardSummary, MonthlyCollection};
pub use expenses::{ExpenseFilter, ExpenseService, ExpenseUpdate};
pub use members::{MemberService, MemberUpdate};
pub use rates::{current_schedule, RateService};
