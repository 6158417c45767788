//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_members;
mod m20250101_000002_create_maintenance_rates;
mod m20250101_000003_create_water_rates;
mod m20250101_000004_create_maintenance_records;
mod m20250101_000005_create_expenses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_members::Migration),
            Box::new(m20250101_000002_create_maintenance_rates::Migration),
            Box::new(m20250101_000003_create_water_rates::Migration),
            Box::new(m20250101_000004_create_maintenance_records::Migration),
            Box::new(m20250101_000005_create_expenses::Migration),
        ]
    }
}
