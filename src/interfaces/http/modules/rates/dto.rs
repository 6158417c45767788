//! Rate DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{MaintenanceRate, RateSchedule, WaterRate};
use crate::shared::validations::validate_amount;

/// Fixed monthly charge by occupancy type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRateResponse {
    pub id: i32,
    #[schema(value_type = String, example = "500.00")]
    pub owner_rate: Decimal,
    #[schema(value_type = String, example = "300.00")]
    pub rent_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MaintenanceRate> for MaintenanceRateResponse {
    fn from(r: MaintenanceRate) -> Self {
        Self {
            id: r.id,
            owner_rate: r.owner_rate,
            rent_rate: r.rent_rate,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Price per consumed water unit
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WaterRateResponse {
    pub id: i32,
    #[schema(value_type = String, example = "10.00")]
    pub unit_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WaterRate> for WaterRateResponse {
    fn from(r: WaterRate) -> Self {
        Self {
            id: r.id,
            unit_rate: r.unit_rate,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Both rates as billing sees them
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RateScheduleResponse {
    #[schema(value_type = String)]
    pub water_unit_rate: Decimal,
    #[schema(value_type = String)]
    pub owner_rate: Decimal,
    #[schema(value_type = String)]
    pub rent_rate: Decimal,
}

impl From<RateSchedule> for RateScheduleResponse {
    fn from(s: RateSchedule) -> Self {
        Self {
            water_unit_rate: s.water_unit_rate,
            owner_rate: s.owner_rate,
            rent_rate: s.rent_rate,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceRateRequest {
    #[schema(value_type = String)]
    #[validate(custom(function = "validate_amount"))]
    pub owner_rate: Decimal,
    #[schema(value_type = String)]
    #[validate(custom(function = "validate_amount"))]
    pub rent_rate: Decimal,
}

/// Absent tiers are kept.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMaintenanceRateRequest {
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub owner_rate: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub rent_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WaterRateRequest {
    #[schema(value_type = String)]
    #[validate(custom(function = "validate_amount"))]
    pub unit_rate: Decimal,
}
