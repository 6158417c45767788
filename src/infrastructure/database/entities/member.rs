//! Member entity: one billing account per flat

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Occupancy type stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum MemberType {
    #[sea_orm(string_value = "OWNER")]
    Owner,
    #[sea_orm(string_value = "RENT")]
    Rent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Flat identifier, unique across the society
    #[sea_orm(unique)]
    pub flat_number: String,

    pub name: String,

    pub member_type: MemberType,

    pub mobile: Option<String>,

    pub email: Option<String>,

    /// Cumulative meter reading as of the last invoice
    pub units_used: i64,

    /// Carried balance in paise
    pub pending_amount: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maintenance_record::Entity")]
    MaintenanceRecords,
}

impl Related<super::maintenance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
