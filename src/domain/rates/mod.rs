//! Rate aggregate: fixed maintenance rates and the water unit rate.

pub mod model;
pub mod repository;

pub use model::{MaintenanceRate, RateSchedule, WaterRate};
pub use repository::RateRepository;
