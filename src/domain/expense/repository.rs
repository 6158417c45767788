//! Expense repository interface

use async_trait::async_trait;

use super::model::{Expense, NewExpense};
use crate::domain::DomainResult;

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Expense>>;
    /// Latest period first.
    async fn find_all(&self) -> DomainResult<Vec<Expense>>;
    async fn create(&self, expense: NewExpense) -> DomainResult<Expense>;
    async fn update(&self, expense: Expense) -> DomainResult<Expense>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
