//! The record store seen from the conversation layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine::{
    Amount, Category, CategoryTotal, Engine, EngineError, Expense, ExpenseId, FieldPatch, OwnerId,
};

/// Persistence operations the router needs, all scoped by owner.
///
/// A record that is missing or owned by someone else is reported as
/// [`EngineError::KeyNotFound`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(
        &self,
        owner_id: OwnerId,
        amount: Amount,
        category: Category,
        description: &str,
    ) -> Result<Expense, EngineError>;

    async fn get(&self, id: ExpenseId, owner_id: OwnerId) -> Result<Expense, EngineError>;

    async fn list_recent(&self, owner_id: OwnerId, limit: u64) -> Result<Vec<Expense>, EngineError>;

    async fn list_all(&self, owner_id: OwnerId) -> Result<Vec<Expense>, EngineError>;

    async fn aggregate_by_category(
        &self,
        owner_id: OwnerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, EngineError>;

    async fn update_field(
        &self,
        id: ExpenseId,
        owner_id: OwnerId,
        patch: FieldPatch,
    ) -> Result<Expense, EngineError>;

    async fn delete(&self, id: ExpenseId, owner_id: OwnerId) -> Result<Expense, EngineError>;
}

#[async_trait]
impl RecordStore for Engine {
    async fn create(
        &self,
        owner_id: OwnerId,
        amount: Amount,
        category: Category,
        description: &str,
    ) -> Result<Expense, EngineError> {
        self.create_expense(owner_id, amount, category, description)
            .await
    }

    async fn get(&self, id: ExpenseId, owner_id: OwnerId) -> Result<Expense, EngineError> {
        self.expense(id, owner_id).await
    }

    async fn list_recent(&self, owner_id: OwnerId, limit: u64) -> Result<Vec<Expense>, EngineError> {
        Engine::list_recent(self, owner_id, limit).await
    }

    async fn list_all(&self, owner_id: OwnerId) -> Result<Vec<Expense>, EngineError> {
        Engine::list_all(self, owner_id).await
    }

    async fn aggregate_by_category(
        &self,
        owner_id: OwnerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, EngineError> {
        Engine::aggregate_by_category(self, owner_id, since).await
    }

    async fn update_field(
        &self,
        id: ExpenseId,
        owner_id: OwnerId,
        patch: FieldPatch,
    ) -> Result<Expense, EngineError> {
        Engine::update_field(self, id, owner_id, patch).await
    }

    async fn delete(&self, id: ExpenseId, owner_id: OwnerId) -> Result<Expense, EngineError> {
        self.delete_expense(id, owner_id).await
    }
}
