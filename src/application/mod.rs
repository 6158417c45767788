//! Application layer: billing, member, rate, expense and dashboard services

pub mod services;

pub use services::{
    current_schedule, BillingService, CollectionChange, DashboardFilter, DashboardService,
    DashboardSummary, ExpenseFilter, ExpenseService, ExpenseUpdate, InvoiceFilter,
    InvoiceUpdateRequest, MemberService, MemberUpdate, MonthlyCollection, RateService,
};
