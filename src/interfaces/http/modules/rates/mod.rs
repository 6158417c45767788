//! Rates module: maintenance and water rate configuration

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
