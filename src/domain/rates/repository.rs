//! Rate repository interface
//!
//! Both rate kinds are singletons: at most one row each.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::model::{MaintenanceRate, WaterRate};
use crate::domain::DomainResult;

#[async_trait]
pub trait RateRepository: Send + Sync {
    async fn get_maintenance_rate(&self) -> DomainResult<Option<MaintenanceRate>>;
    async fn create_maintenance_rate(
        &self,
        owner_rate: Decimal,
        rent_rate: Decimal,
    ) -> DomainResult<MaintenanceRate>;
    async fn update_maintenance_rate(&self, rate: MaintenanceRate) -> DomainResult<MaintenanceRate>;
    async fn delete_maintenance_rate(&self, id: i32) -> DomainResult<()>;

    async fn get_water_rate(&self) -> DomainResult<Option<WaterRate>>;
    async fn create_water_rate(&self, unit_rate: Decimal) -> DomainResult<WaterRate>;
    async fn update_water_rate(&self, rate: WaterRate) -> DomainResult<WaterRate>;
    async fn delete_water_rate(&self, id: i32) -> DomainResult<()>;
}
