//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `modules`: per-resource DTOs and handlers
//! - `router`: route table, middleware stack and Swagger documentation

pub mod common;
pub mod modules;
pub mod router;
mod state;

pub use modules::health::HealthState;
pub use router::{create_api_router, ApiDoc, RouterOptions};
pub use state::AppState;
