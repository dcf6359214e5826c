use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    Amount, Category, EngineError, Expense, ExpenseId, FieldPatch, OwnerId, ResultEngine,
    expenses,
};

use super::{Engine, with_tx};

fn not_found(id: ExpenseId) -> EngineError {
    EngineError::KeyNotFound(format!("expense {id}"))
}

fn ensure_valid(amount: Amount) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    if !amount.is_valid_expense() {
        return Err(EngineError::InvalidAmount("amount too large".to_string()));
    }
    Ok(())
}

impl Engine {
    /// Inserts a new expense for `owner_id`.
    ///
    /// The id and `created_at` are assigned here; the description is trimmed
    /// and may end up empty.
    pub async fn create_expense(
        &self,
        owner_id: OwnerId,
        amount: Amount,
        category: Category,
        description: &str,
    ) -> ResultEngine<Expense> {
        ensure_valid(amount)?;
        let model = expenses::ActiveModel::new_expense(
            owner_id,
            amount,
            category,
            description.trim().to_string(),
            Utc::now().trunc_subsecs(6),
        )
        .insert(&self.database)
        .await?;

        tracing::debug!(owner_id, expense_id = model.id, "expense created");
        Expense::try_from(model)
    }

    /// Returns the expense `id` if it belongs to `owner_id`.
    pub async fn expense(&self, id: ExpenseId, owner_id: OwnerId) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(id)
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| not_found(id))?;
        Expense::try_from(model)
    }

    /// Lists the most recent expenses of `owner_id`, newest first.
    pub async fn list_recent(&self, owner_id: OwnerId, limit: u64) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Lists every expense of `owner_id`, newest first.
    pub async fn list_all(&self, owner_id: OwnerId) -> ResultEngine<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Changes one field of an expense owned by `owner_id`.
    ///
    /// Returns [`EngineError::KeyNotFound`] when the expense is missing or
    /// belongs to another user.
    pub async fn update_field(
        &self,
        id: ExpenseId,
        owner_id: OwnerId,
        patch: FieldPatch,
    ) -> ResultEngine<Expense> {
        if let FieldPatch::Amount(amount) = &patch {
            ensure_valid(*amount)?;
        }

        with_tx!(self, |db_tx| {
            let model = Self::require_owned(&db_tx, id, owner_id).await?;
            let mut active: expenses::ActiveModel = model.into();
            match patch {
                FieldPatch::Amount(amount) => {
                    active.amount_minor = ActiveValue::Set(amount.minor());
                }
                FieldPatch::Category(category) => {
                    active.category = ActiveValue::Set(category.as_str().to_string());
                }
                FieldPatch::Description(description) => {
                    active.description = ActiveValue::Set(description.trim().to_string());
                }
            }
            let updated = active.update(&db_tx).await?;
            Expense::try_from(updated)
        })
    }

    /// Deletes an expense owned by `owner_id` and returns it.
    ///
    /// Deleting a missing (or foreign) id is reported as
    /// [`EngineError::KeyNotFound`] every time.
    pub async fn delete_expense(&self, id: ExpenseId, owner_id: OwnerId) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = Self::require_owned(&db_tx, id, owner_id).await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::Id.eq(id))
                .filter(expenses::Column::OwnerId.eq(owner_id))
                .exec(&db_tx)
                .await?;
            tracing::debug!(owner_id, expense_id = id, "expense deleted");
            Expense::try_from(model)
        })
    }

    async fn require_owned(
        db_tx: &DatabaseTransaction,
        id: ExpenseId,
        owner_id: OwnerId,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(id)
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| not_found(id))
    }
}
