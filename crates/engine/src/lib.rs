//! Record store for expense entries.
//!
//! Every operation is scoped by the owning user: an expense that belongs to
//! someone else is reported as missing.

pub use amount::Amount;
pub use category::Category;
pub use error::EngineError;
pub use expenses::{CategoryTotal, EditField, Expense, ExpenseId, FieldPatch, OwnerId};
pub use ops::{Engine, EngineBuilder};

mod amount;
mod category;
mod error;
mod expenses;
mod ops;

type ResultEngine<T> = Result<T, EngineError>;
