//! Expense entity: society bills paid out

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub date_from: NaiveDate,

    pub date_to: NaiveDate,

    /// Category label, e.g. `ELECTRICITY`
    pub category: String,

    pub description: String,

    /// Amount in paise
    pub amount: i64,

    pub payment_mode: String,

    pub payment_status: String,

    pub vendor_name: String,

    pub vendor_type: String,

    pub vendor_contact: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
