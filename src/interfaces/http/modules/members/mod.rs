//! Members module: flat registry CRUD and bulk import

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
