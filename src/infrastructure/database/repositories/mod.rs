//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

mod convert;
pub mod expense_repository;
pub mod invoice_repository;
pub mod member_repository;
pub mod rate_repository;
pub mod repository_provider;

pub use repository_provider::SeaOrmRepositoryProvider;
