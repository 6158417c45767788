//! Expenses module: society bills and their payment status

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
