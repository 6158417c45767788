//! Fixed maintenance rate entity (singleton row)

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Monthly charge for owners, in paise
    pub owner_rate: i64,

    /// Monthly charge for renters, in paise
    pub rent_rate: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
