//! Per-user conversation sessions.
//!
//! A session exists only while a multi-step flow is in progress. Its state
//! carries exactly the draft fields collected so far, so an AwaitingCategory
//! session always knows its amount and an edit session always knows its target.

use std::{collections::HashMap, sync::Arc};

use engine::{Amount, Category, EditField, ExpenseId, OwnerId};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAmount,
    AwaitingCategory {
        amount: Amount,
    },
    AwaitingDescription {
        amount: Amount,
        category: Category,
    },
    AwaitingEditTarget,
    AwaitingEditField {
        target: ExpenseId,
    },
    AwaitingEditValue {
        target: ExpenseId,
        field: EditField,
    },
}

/// Read-only view of the fields a session has collected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub amount: Option<Amount>,
    pub category: Option<Category>,
    pub edit_target: Option<ExpenseId>,
    pub edit_field: Option<EditField>,
}

impl SessionState {
    pub fn draft(&self) -> Draft {
        match *self {
            Self::AwaitingAmount | Self::AwaitingEditTarget => Draft::default(),
            Self::AwaitingCategory { amount } => Draft {
                amount: Some(amount),
                ..Draft::default()
            },
            Self::AwaitingDescription { amount, category } => Draft {
                amount: Some(amount),
                category: Some(category),
                ..Draft::default()
            },
            Self::AwaitingEditField { target } => Draft {
                edit_target: Some(target),
                ..Draft::default()
            },
            Self::AwaitingEditValue { target, field } => Draft {
                edit_target: Some(target),
                edit_field: Some(field),
                ..Draft::default()
            },
        }
    }
}

/// The conversation slot of one user. `None` is the idle state.
pub type Session = Option<SessionState>;

/// Holds one lock per user.
///
/// The lock is held for the whole handling of an event, which serializes the
/// events of a user while different users proceed in parallel.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<OwnerId, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the user's lock and returns the guarded session.
    pub async fn lock(&self, owner_id: OwnerId) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(owner_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Drops the user's slot when it is idle and nobody else holds or waits
    /// for it.
    pub async fn release(&self, owner_id: OwnerId) {
        let mut slots = self.slots.lock().await;
        let idle = match slots.get(&owner_id) {
            Some(slot) if Arc::strong_count(slot) == 1 => {
                slot.try_lock().map(|session| session.is_none()).unwrap_or(false)
            }
            _ => false,
        };
        if idle {
            slots.remove(&owner_id);
        }
    }

    /// Snapshot of the user's session. Users without a slot are idle and
    /// get none created.
    pub async fn current(&self, owner_id: OwnerId) -> Session {
        let slot = self.slots.lock().await.get(&owner_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// Number of users with a slot.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
