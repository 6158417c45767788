//! Expense aggregate: bills paid out by the society

pub mod model;
pub mod repository;

pub use model::{
    Expense, ExpenseCategory, NewExpense, PaymentMode, PaymentStatus, VendorType,
};
pub use repository::ExpenseRepository;
