//! Maintenance record entity: one persisted invoice

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::member::MemberType;

/// All amounts are in paise. Member and rate values are copies taken when
/// the record was created.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub member_id: i32,

    pub flat_number: String,

    pub member_name: String,

    pub member_type: MemberType,

    pub collection_date: NaiveDate,

    pub previous_unit_used: i64,

    pub new_reading_units: i64,

    pub total_units: i64,

    pub water_unit_rate: i64,

    pub water_maintenance_amount: i64,

    pub fixed_maintenance_rate: i64,

    pub fixed_maintenance_amount: i64,

    pub previous_pending_amount: i64,

    pub fine_amount: i64,

    pub fine_reason: Option<String>,

    pub total_maintenance_amount: i64,

    pub collection_amount: i64,

    pub pending_amount: i64,

    /// JSON array of update history entries
    #[sea_orm(column_type = "Text")]
    pub update_history: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
