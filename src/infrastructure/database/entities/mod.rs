//! Database entities module

pub mod expense;
pub mod maintenance_rate;
pub mod maintenance_record;
pub mod member;
pub mod water_rate;

pub use expense::Entity as Expense;
pub use maintenance_rate::Entity as MaintenanceRate;
pub use maintenance_record::Entity as MaintenanceRecord;
pub use member::Entity as Member;
pub use water_rate::Entity as WaterRate;
