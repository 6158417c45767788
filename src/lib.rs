//! # Society Billing
//!
//! Monthly maintenance billing for a housing society: metered water usage,
//! fixed maintenance by occupancy type, fines, and balances carried forward
//! from one invoice to the next, plus a book of the society's own expenses.
//!
//! ## Architecture
//!
//! - **domain**: members, rates, invoices, expenses and the pure billing calculator
//! - **application**: services that serialize writes per member and persist
//!   through the atomic billing ledger
//! - **infrastructure**: SeaORM/SQLite repositories, migrations, in-memory store
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime lifecycle shared by the binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryStorage, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
