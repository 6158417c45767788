//! SeaORM implementation of RateRepository

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use super::convert::{db_err, money_from_db, money_to_db};
use crate::domain::rates::{MaintenanceRate, RateRepository, WaterRate};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{maintenance_rate, water_rate};

fn maintenance_to_domain(r: maintenance_rate::Model) -> MaintenanceRate {
    MaintenanceRate {
        id: r.id,
        owner_rate: money_from_db(r.owner_rate),
        rent_rate: money_from_db(r.rent_rate),
        created_at: r.created_at,
        updated_at: r.updated_at,
    }
}

fn water_to_domain(r: water_rate::Model) -> WaterRate {
    WaterRate {
        id: r.id,
        unit_rate: money_from_db(r.unit_rate),
        created_at: r.created_at,
        updated_at: r.updated_at,
    }
}

// ── SeaOrmRateRepository ────────────────────────────────────────

pub struct SeaOrmRateRepository {
    db: DatabaseConnection,
}

impl SeaOrmRateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RateRepository for SeaOrmRateRepository {
    async fn get_maintenance_rate(&self) -> DomainResult<Option<MaintenanceRate>> {
        let model = maintenance_rate::Entity::find()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(maintenance_to_domain))
    }

    async fn create_maintenance_rate(
        &self,
        owner_rate: Decimal,
        rent_rate: Decimal,
    ) -> DomainResult<MaintenanceRate> {
        let existing = maintenance_rate::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if existing > 0 {
            return Err(DomainError::Conflict(
                "Maintenance rate already configured".into(),
            ));
        }

        let now = Utc::now();
        let model = maintenance_rate::ActiveModel {
            owner_rate: Set(money_to_db(owner_rate)?),
            rent_rate: Set(money_to_db(rent_rate)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!("Maintenance rate saved ({})", result.id);
        Ok(maintenance_to_domain(result))
    }

    async fn update_maintenance_rate(&self, r: MaintenanceRate) -> DomainResult<MaintenanceRate> {
        let existing = maintenance_rate::Entity::find_by_id(r.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("MaintenanceRate", "id", r.id));
        };

        let mut model: maintenance_rate::ActiveModel = existing.into();
        model.owner_rate = Set(money_to_db(r.owner_rate)?);
        model.rent_rate = Set(money_to_db(r.rent_rate)?);
        model.updated_at = Set(Utc::now());

        let result = model.update(&self.db).await.map_err(db_err)?;
        info!("Maintenance rate updated ({})", result.id);
        Ok(maintenance_to_domain(result))
    }

    async fn delete_maintenance_rate(&self, id: i32) -> DomainResult<()> {
        let result = maintenance_rate::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("MaintenanceRate", "id", id));
        }
        Ok(())
    }

    async fn get_water_rate(&self) -> DomainResult<Option<WaterRate>> {
        let model = water_rate::Entity::find()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(water_to_domain))
    }

    async fn create_water_rate(&self, unit_rate: Decimal) -> DomainResult<WaterRate> {
        let existing = water_rate::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if existing > 0 {
            return Err(DomainError::Conflict("Water rate already configured".into()));
        }

        let now = Utc::now();
        let model = water_rate::ActiveModel {
            unit_rate: Set(money_to_db(unit_rate)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!("Water rate saved ({})", result.id);
        Ok(water_to_domain(result))
    }

    async fn update_water_rate(&self, r: WaterRate) -> DomainResult<WaterRate> {
        let existing = water_rate::Entity::find_by_id(r.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("WaterRate", "id", r.id));
        };

        let mut model: water_rate::ActiveModel = existing.into();
        model.unit_rate = Set(money_to_db(r.unit_rate)?);
        model.updated_at = Set(Utc::now());

        let result = model.update(&self.db).await.map_err(db_err)?;
        info!("Water rate updated ({})", result.id);
        Ok(water_to_domain(result))
    }

    async fn delete_water_rate(&self, id: i32) -> DomainResult<()> {
        let result = water_rate::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("WaterRate", "id", id));
        }
        Ok(())
    }
}
