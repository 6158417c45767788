//! SeaORM implementation of ExpenseRepository

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::convert::{db_err, label_from_db, money_from_db, money_to_db};
use crate::domain::expense::{Expense, ExpenseRepository, NewExpense};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::expense;

fn entity_to_domain(m: expense::Model) -> DomainResult<Expense> {
    Ok(Expense {
        id: m.id,
        date_from: m.date_from,
        date_to: m.date_to,
        category: label_from_db(&m.category)?,
        description: m.description,
        amount: money_from_db(m.amount),
        payment_mode: label_from_db(&m.payment_mode)?,
        payment_status: label_from_db(&m.payment_status)?,
        vendor_name: m.vendor_name,
        vendor_type: label_from_db(&m.vendor_type)?,
        vendor_contact: m.vendor_contact,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub struct SeaOrmExpenseRepository {
    db: DatabaseConnection,
}

impl SeaOrmExpenseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExpenseRepository for SeaOrmExpenseRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Expense>> {
        expense::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(entity_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Expense>> {
        expense::Entity::find()
            .order_by_desc(expense::Column::DateFrom)
            .order_by_desc(expense::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(entity_to_domain)
            .collect()
    }

    async fn create(&self, e: NewExpense) -> DomainResult<Expense> {
        let now = Utc::now();
        let model = expense::ActiveModel {
            date_from: Set(e.date_from),
            date_to: Set(e.date_to),
            category: Set(e.category.to_string()),
            description: Set(e.description),
            amount: Set(money_to_db(e.amount)?),
            payment_mode: Set(e.payment_mode.to_string()),
            payment_status: Set(e.payment_status.to_string()),
            vendor_name: Set(e.vendor_name),
            vendor_type: Set(e.vendor_type.to_string()),
            vendor_contact: Set(e.vendor_contact),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!("Expense saved: {} ({})", result.category, result.id);
        entity_to_domain(result)
    }

    async fn update(&self, e: Expense) -> DomainResult<Expense> {
        let Some(existing) = expense::Entity::find_by_id(e.id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Err(DomainError::not_found("Expense", "id", e.id));
        };

        let mut model: expense::ActiveModel = existing.into();
        model.date_from = Set(e.date_from);
        model.date_to = Set(e.date_to);
        model.category = Set(e.category.to_string());
        model.description = Set(e.description);
        model.amount = Set(money_to_db(e.amount)?);
        model.payment_mode = Set(e.payment_mode.to_string());
        model.payment_status = Set(e.payment_status.to_string());
        model.vendor_name = Set(e.vendor_name);
        model.vendor_type = Set(e.vendor_type.to_string());
        model.vendor_contact = Set(e.vendor_contact);
        model.updated_at = Set(Utc::now());

        let result = model.update(&self.db).await.map_err(db_err)?;
        info!("Expense updated: {}", result.id);
        entity_to_domain(result)
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = expense::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Expense", "id", id));
        }
        info!("Expense deleted: {}", id);
        Ok(())
    }
}
