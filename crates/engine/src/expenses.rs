//! Expense primitives.
//!
//! An `Expense` is a single persisted entry owned by exactly one chat user.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Amount, Category, EngineError};

/// Store-assigned expense identifier.
pub type ExpenseId = i64;

/// Identifier of the chat user owning an expense.
pub type OwnerId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner_id: OwnerId,
    pub amount: Amount,
    pub category: Category,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditField {
    Amount,
    Category,
    Description,
}

impl EditField {
    pub const ALL: [EditField; 3] = [Self::Amount, Self::Category, Self::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Description => "description",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Category => "Category",
            Self::Description => "Description",
        }
    }
}

impl TryFrom<&str> for EditField {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            "description" => Ok(Self::Description),
            other => Err(EngineError::InvalidField(format!("unknown field: {other}"))),
        }
    }
}

/// A new value for exactly one editable field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldPatch {
    Amount(Amount),
    Category(Category),
    Description(String),
}

impl FieldPatch {
    pub fn field(&self) -> EditField {
        match self {
            Self::Amount(_) => EditField::Amount,
            Self::Category(_) => EditField::Category,
            Self::Description(_) => EditField::Description,
        }
    }
}

/// Sum of one owner's expenses in a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_expense(
        owner_id: OwnerId,
        amount: Amount,
        category: Category,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            owner_id: ActiveValue::Set(owner_id),
            amount_minor: ActiveValue::Set(amount.minor()),
            category: ActiveValue::Set(category.as_str().to_string()),
            description: ActiveValue::Set(description),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            amount: Amount::new(model.amount_minor),
            category: Category::try_from(model.category.as_str())?,
            description: model.description,
            created_at: model.created_at,
        })
    }
}
