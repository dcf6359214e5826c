//! The conversation state machine.
//!
//! [`transition`] is pure: it looks at the current state and one event and
//! decides the next state plus a single [`Effect`]. Effects that touch the
//! record store are carried out by the router, which commits `next` only when
//! the store call succeeds.

use engine::{Amount, Category, EditField, EngineError, ExpenseId, FieldPatch};
use thiserror::Error;

use crate::{
    event::{Event, RecordAction},
    session::SessionState,
};

/// Input that does not fit the current step. The session is kept and the step
/// is prompted again.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Amount(String),
    #[error("choose a category from the list")]
    Category,
    #[error("choose an entry from the list")]
    Record,
    #[error("choose a field from the list")]
    Field,
    #[error("finish the current step or cancel it first")]
    StepInProgress,
}

/// What the user is asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Amount,
    Category,
    Description,
    EditTarget,
    EditField,
    EditValue(EditField),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Prompt(Prompt),
    Reject {
        reason: ValidationError,
        prompt: Prompt,
    },
    Cancelled,
    CreateExpense {
        amount: Amount,
        category: Category,
        description: String,
    },
    /// Verify the user owns the record before asking which field to change.
    SelectEditTarget(ExpenseId),
    UpdateExpense {
        id: ExpenseId,
        patch: FieldPatch,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// `None` clears the session.
    pub next: Option<SessionState>,
    pub effect: Effect,
}

impl Transition {
    fn to(next: SessionState, prompt: Prompt) -> Self {
        Self {
            next: Some(next),
            effect: Effect::Prompt(prompt),
        }
    }

    fn reject(state: &SessionState, reason: ValidationError) -> Self {
        Self {
            next: Some(state.clone()),
            effect: Effect::Reject {
                reason,
                prompt: prompt_for(state),
            },
        }
    }

    fn clear(effect: Effect) -> Self {
        Self { next: None, effect }
    }
}

/// The prompt that belongs to `state`.
pub fn prompt_for(state: &SessionState) -> Prompt {
    match state {
        SessionState::AwaitingAmount => Prompt::Amount,
        SessionState::AwaitingCategory { .. } => Prompt::Category,
        SessionState::AwaitingDescription { .. } => Prompt::Description,
        SessionState::AwaitingEditTarget => Prompt::EditTarget,
        SessionState::AwaitingEditField { .. } => Prompt::EditField,
        SessionState::AwaitingEditValue { field, .. } => Prompt::EditValue(*field),
    }
}

pub fn transition(state: &SessionState, event: Event) -> Transition {
    if event == Event::Cancel {
        return Transition::clear(Effect::Cancelled);
    }
    if let Event::Menu(_) = event {
        return Transition::reject(state, ValidationError::StepInProgress);
    }

    match (state, event) {
        (SessionState::AwaitingAmount, Event::Text(text)) => match parse_amount(&text) {
            Ok(amount) => Transition::to(SessionState::AwaitingCategory { amount }, Prompt::Category),
            Err(reason) => Transition::reject(state, reason),
        },

        (SessionState::AwaitingCategory { amount }, event) => match category_of(&event) {
            Some(category) => Transition::to(
                SessionState::AwaitingDescription {
                    amount: *amount,
                    category,
                },
                Prompt::Description,
            ),
            None => Transition::reject(state, ValidationError::Category),
        },

        (SessionState::AwaitingDescription { amount, category }, Event::Text(text)) => {
            Transition::clear(Effect::CreateExpense {
                amount: *amount,
                category: *category,
                description: text.trim().to_string(),
            })
        }

        (
            SessionState::AwaitingEditTarget,
            Event::RecordSelected {
                id,
                action: RecordAction::Edit,
            },
        ) => Transition {
            next: Some(SessionState::AwaitingEditField { target: id }),
            effect: Effect::SelectEditTarget(id),
        },
        (SessionState::AwaitingEditTarget, _) => Transition::reject(state, ValidationError::Record),

        (SessionState::AwaitingEditField { target }, Event::FieldSelected(field)) => Transition::to(
            SessionState::AwaitingEditValue {
                target: *target,
                field,
            },
            Prompt::EditValue(field),
        ),
        (SessionState::AwaitingEditField { .. }, _) => {
            Transition::reject(state, ValidationError::Field)
        }

        (SessionState::AwaitingEditValue { target, field }, event) => {
            match edit_patch(*field, &event) {
                Ok(patch) => Transition::clear(Effect::UpdateExpense { id: *target, patch }),
                Err(reason) => Transition::reject(state, reason),
            }
        }

        (state, _) => Transition::reject(state, ValidationError::StepInProgress),
    }
}

fn parse_amount(text: &str) -> Result<Amount, ValidationError> {
    text.parse::<Amount>().map_err(|err| match err {
        EngineError::InvalidAmount(reason) => ValidationError::Amount(reason),
        other => ValidationError::Amount(other.to_string()),
    })
}

/// A picked category, or free text equal to a category label or name.
fn category_of(event: &Event) -> Option<Category> {
    match event {
        Event::CategorySelected(category) => Some(*category),
        Event::Text(text) => Category::from_label(text),
        _ => None,
    }
}

fn edit_patch(field: EditField, event: &Event) -> Result<FieldPatch, ValidationError> {
    match (field, event) {
        (EditField::Amount, Event::Text(text)) => parse_amount(text).map(FieldPatch::Amount),
        (EditField::Amount, _) => Err(ValidationError::StepInProgress),
        (EditField::Category, event) => category_of(event)
            .map(FieldPatch::Category)
            .ok_or(ValidationError::Category),
        (EditField::Description, Event::Text(text)) => {
            Ok(FieldPatch::Description(text.trim().to_string()))
        }
        (EditField::Description, _) => Err(ValidationError::StepInProgress),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{event::Command, export::ExportFormat};

    fn text(value: &str) -> Event {
        Event::Text(value.to_string())
    }

    #[test]
    fn add_flow_collects_amount_category_and_description() {
        let t = transition(&SessionState::AwaitingAmount, text("1500"));
        let amount = Amount::new(150_000);
        assert_eq!(t, Transition::to(SessionState::AwaitingCategory { amount }, Prompt::Category));

        let t = transition(
            &SessionState::AwaitingCategory { amount },
            Event::CategorySelected(Category::Food),
        );
        let state = SessionState::AwaitingDescription {
            amount,
            category: Category::Food,
        };
        assert_eq!(t, Transition::to(state.clone(), Prompt::Description));

        let t = transition(&state, text(" Lunch "));
        assert_eq!(
            t,
            Transition::clear(Effect::CreateExpense {
                amount,
                category: Category::Food,
                description: "Lunch".to_string(),
            })
        );
    }

    #[test]
    fn invalid_amount_keeps_the_session() {
        for input in ["abc", "-5", "0", "12.345", ""] {
            let t = transition(&SessionState::AwaitingAmount, text(input));
            assert_eq!(t.next, Some(SessionState::AwaitingAmount), "input {input:?}");
            assert!(matches!(
                t.effect,
                Effect::Reject {
                    reason: ValidationError::Amount(_),
                    prompt: Prompt::Amount
                }
            ));
        }
    }

    #[test]
    fn category_accepts_exact_label_text_only() {
        let state = SessionState::AwaitingCategory {
            amount: Amount::new(100),
        };

        let t = transition(&state, text("🚗 Transport"));
        assert_eq!(
            t.next,
            Some(SessionState::AwaitingDescription {
                amount: Amount::new(100),
                category: Category::Transport,
            })
        );

        let t = transition(&state, text("Foo"));
        assert_eq!(t, Transition::reject(&state, ValidationError::Category));
    }

    #[test]
    fn menu_commands_re_prompt_the_current_step() {
        let state = SessionState::AwaitingCategory {
            amount: Amount::new(100),
        };
        let t = transition(&state, Event::Menu(Command::Stats));
        assert_eq!(t.next, Some(state));
        assert_eq!(
            t.effect,
            Effect::Reject {
                reason: ValidationError::StepInProgress,
                prompt: Prompt::Category
            }
        );
    }

    #[test]
    fn edit_flow_selects_target_field_and_value() {
        let t = transition(
            &SessionState::AwaitingEditTarget,
            Event::RecordSelected {
                id: 9,
                action: RecordAction::Edit,
            },
        );
        assert_eq!(t.next, Some(SessionState::AwaitingEditField { target: 9 }));
        assert_eq!(t.effect, Effect::SelectEditTarget(9));

        let t = transition(
            &SessionState::AwaitingEditField { target: 9 },
            Event::FieldSelected(EditField::Category),
        );
        let state = SessionState::AwaitingEditValue {
            target: 9,
            field: EditField::Category,
        };
        assert_eq!(t, Transition::to(state.clone(), Prompt::EditValue(EditField::Category)));

        let t = transition(&state, Event::CategorySelected(Category::Gifts));
        assert_eq!(
            t,
            Transition::clear(Effect::UpdateExpense {
                id: 9,
                patch: FieldPatch::Category(Category::Gifts),
            })
        );
    }

    #[test]
    fn edit_value_is_checked_against_the_field() {
        let amount_state = SessionState::AwaitingEditValue {
            target: 3,
            field: EditField::Amount,
        };
        let t = transition(&amount_state, text("abc"));
        assert_eq!(t.next, Some(amount_state.clone()));

        let t = transition(&amount_state, text("99,90"));
        assert_eq!(
            t.effect,
            Effect::UpdateExpense {
                id: 3,
                patch: FieldPatch::Amount(Amount::new(9_990)),
            }
        );

        let category_state = SessionState::AwaitingEditValue {
            target: 3,
            field: EditField::Category,
        };
        let t = transition(&category_state, text("groceries"));
        assert_eq!(t, Transition::reject(&category_state, ValidationError::Category));
    }

    #[test]
    fn stray_selections_are_rejected() {
        let t = transition(
            &SessionState::AwaitingEditTarget,
            Event::RecordSelected {
                id: 4,
                action: RecordAction::Delete,
            },
        );
        assert_eq!(t, Transition::reject(&SessionState::AwaitingEditTarget, ValidationError::Record));

        let t = transition(
            &SessionState::AwaitingAmount,
            Event::FormatSelected(ExportFormat::Csv),
        );
        assert_eq!(
            t,
            Transition::reject(&SessionState::AwaitingAmount, ValidationError::StepInProgress)
        );
    }

    fn amount_strategy() -> impl Strategy<Value = Amount> {
        (1i64..10_000_000_000).prop_map(Amount::new)
    }

    fn state_strategy() -> impl Strategy<Value = SessionState> {
        let category = prop::sample::select(Category::ALL.to_vec());
        let field = prop::sample::select(EditField::ALL.to_vec());
        prop_oneof![
            Just(SessionState::AwaitingAmount),
            amount_strategy().prop_map(|amount| SessionState::AwaitingCategory { amount }),
            (amount_strategy(), category)
                .prop_map(|(amount, category)| SessionState::AwaitingDescription { amount, category }),
            Just(SessionState::AwaitingEditTarget),
            any::<i64>().prop_map(|target| SessionState::AwaitingEditField { target }),
            (any::<i64>(), field)
                .prop_map(|(target, field)| SessionState::AwaitingEditValue { target, field }),
        ]
    }

    proptest! {
        #[test]
        fn valid_amounts_move_to_category(
            units in 0u64..100_000_000,
            cents in 0u64..100,
            comma in any::<bool>(),
            padding in "[ \t]{0,3}",
        ) {
            prop_assume!(units > 0 || cents > 0);
            let sep = if comma { "," } else { "." };
            let input = format!("{padding}{units}{sep}{cents:02}{padding}");

            let t = transition(&SessionState::AwaitingAmount, Event::Text(input));

            let expected = Amount::new((units * 100 + cents) as i64);
            prop_assert_eq!(t.next, Some(SessionState::AwaitingCategory { amount: expected }));
            prop_assert_eq!(t.effect, Effect::Prompt(Prompt::Category));
        }

        #[test]
        fn cancel_always_clears(state in state_strategy()) {
            let t = transition(&state, Event::Cancel);
            prop_assert_eq!(t, Transition::clear(Effect::Cancelled));
        }
    }
}
