//! Rate configuration service

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{
    DomainError, DomainResult, MaintenanceRate, RateSchedule, RepositoryProvider, WaterRate,
};
use crate::shared::money::round_money;

/// Assemble the rate snapshot billing runs against.
///
/// Fails with `Validation` until both rates are configured.
pub async fn current_schedule(repos: &dyn RepositoryProvider) -> DomainResult<RateSchedule> {
    let maintenance = repos.rates().get_maintenance_rate().await?.ok_or_else(|| {
        DomainError::Validation("Maintenance rate is not configured".into())
    })?;
    let water = repos
        .rates()
        .get_water_rate()
        .await?
        .ok_or_else(|| DomainError::Validation("Water rate is not configured".into()))?;
    Ok(RateSchedule::from_rates(&maintenance, &water))
}

fn checked_rate(field: &str, value: Decimal) -> DomainResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(DomainError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(round_money(value))
}

pub struct RateService {
    repos: Arc<dyn RepositoryProvider>,
}

impl RateService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn schedule(&self) -> DomainResult<RateSchedule> {
        current_schedule(self.repos.as_ref()).await
    }

    // ── Maintenance rate ────────────────────────────────────────

    pub async fn get_maintenance_rate(&self) -> DomainResult<MaintenanceRate> {
        self.repos
            .rates()
            .get_maintenance_rate()
            .await?
            .ok_or_else(|| DomainError::not_found("MaintenanceRate", "kind", "maintenance"))
    }

    pub async fn create_maintenance_rate(
        &self,
        owner_rate: Decimal,
        rent_rate: Decimal,
    ) -> DomainResult<MaintenanceRate> {
        let owner_rate = checked_rate("owner_rate", owner_rate)?;
        let rent_rate = checked_rate("rent_rate", rent_rate)?;
        let rate = self
            .repos
            .rates()
            .create_maintenance_rate(owner_rate, rent_rate)
            .await?;
        info!(%owner_rate, %rent_rate, "Maintenance rate configured");
        Ok(rate)
    }

    /// Partial update; absent values are kept.
    pub async fn update_maintenance_rate(
        &self,
        id: i32,
        owner_rate: Option<Decimal>,
        rent_rate: Option<Decimal>,
    ) -> DomainResult<MaintenanceRate> {
        let mut rate = self.get_maintenance_rate().await?;
        if rate.id != id {
            return Err(DomainError::not_found("MaintenanceRate", "id", id));
        }
        if let Some(v) = owner_rate {
            rate.owner_rate = checked_rate("owner_rate", v)?;
        }
        if let Some(v) = rent_rate {
            rate.rent_rate = checked_rate("rent_rate", v)?;
        }
        let rate = self.repos.rates().update_maintenance_rate(rate).await?;
        info!(owner_rate = %rate.owner_rate, rent_rate = %rate.rent_rate, "Maintenance rate updated");
        Ok(rate)
    }

    pub async fn delete_maintenance_rate(&self, id: i32) -> DomainResult<()> {
        self.repos.rates().delete_maintenance_rate(id).await?;
        info!(id, "Maintenance rate deleted");
        Ok(())
    }

    // ── Water rate ──────────────────────────────────────────────

    pub async fn get_water_rate(&self) -> DomainResult<WaterRate> {
        self.repos
            .rates()
            .get_water_rate()
            .await?
            .ok_or_else(|| DomainError::not_found("WaterRate", "kind", "water"))
    }

    pub async fn create_water_rate(&self, unit_rate: Decimal) -> DomainResult<WaterRate> {
        let unit_rate = checked_rate("unit_rate", unit_rate)?;
        let rate = self.repos.rates().create_water_rate(unit_rate).await?;
        info!(%unit_rate, "Water rate configured");
        Ok(rate)
    }

    pub async fn update_water_rate(&self, id: i32, unit_rate: Decimal) -> DomainResult<WaterRate> {
        let mut rate = self.get_water_rate().await?;
        if rate.id != id {
            return Err(DomainError::not_found("WaterRate", "id", id));
        }
        rate.unit_rate = checked_rate("unit_rate", unit_rate)?;
        let rate = self.repos.rates().update_water_rate(rate).await?;
        info!(unit_rate = %rate.unit_rate, "Water rate updated");
        Ok(rate)
    }

    pub async fn delete_water_rate(&self, id: i32) -> DomainResult<()> {
        self.repos.rates().delete_water_rate(id).await?;
        info!(id, "Water rate deleted");
        Ok(())
    }
}
