//! Routes decoded events to the state machine or to the top-level commands.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use engine::{EngineError, OwnerId};

use crate::{
    event::{Command, Event, RecordAction},
    export::{ExportAdapter, ExportError, ExportFormat},
    machine::{self, Effect, Prompt, Transition},
    reply::Reply,
    session::{Session, SessionState, SessionStore},
    settings::ConversationSettings,
    store::RecordStore,
    ui,
};

type RouteResult<T> = Result<T, EngineError>;

enum Outcome {
    Replies(Vec<Reply>),
    /// Render an export once the user's lock is released.
    Export(ExportFormat),
}

#[derive(Clone)]
pub struct Router {
    store: Arc<dyn RecordStore>,
    exporter: ExportAdapter,
    sessions: SessionStore,
    settings: ConversationSettings,
}

impl Router {
    pub fn new(store: Arc<dyn RecordStore>, settings: ConversationSettings) -> Self {
        let exporter = ExportAdapter::new(
            store.clone(),
            settings.timezone,
            Duration::from_secs(settings.export_timeout_secs),
        );
        Self {
            store,
            exporter,
            sessions: SessionStore::new(),
            settings,
        }
    }

    /// Replaces the export adapter.
    pub fn with_exporter(mut self, exporter: ExportAdapter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// Snapshot of the user's session.
    pub async fn session(&self, owner_id: OwnerId) -> Session {
        self.sessions.current(owner_id).await
    }

    /// Handles one event of `owner_id` and returns what to send back.
    ///
    /// Never fails: store errors clear the session and turn into a message.
    pub async fn route(&self, owner_id: OwnerId, event: Event) -> Vec<Reply> {
        tracing::debug!(owner_id, ?event, "routing event");

        let mut session = self.sessions.lock(owner_id).await;
        // Taking the state out leaves the session cleared unless a handler
        // puts a next state back.
        let outcome = match session.take() {
            Some(state) => self.continue_session(owner_id, &mut session, state, event).await,
            None => self.run_command(owner_id, &mut session, event).await,
        };

        let replies = match outcome {
            Ok(Outcome::Replies(replies)) => replies,
            Ok(Outcome::Export(format)) => {
                drop(session);
                self.sessions.release(owner_id).await;
                return self.export(owner_id, format).await;
            }
            Err(err) => {
                *session = None;
                self.failure(owner_id, &err)
            }
        };

        drop(session);
        self.sessions.release(owner_id).await;
        replies
    }

    async fn continue_session(
        &self,
        owner_id: OwnerId,
        session: &mut Session,
        state: SessionState,
        event: Event,
    ) -> RouteResult<Outcome> {
        let Transition { next, effect } = machine::transition(&state, event);
        let timezone = self.settings.timezone;

        let replies = match effect {
            Effect::Prompt(prompt) => {
                *session = next;
                vec![self.prompt(owner_id, session, prompt).await?]
            }
            Effect::Reject { reason, prompt } => {
                tracing::debug!(owner_id, %reason, "input rejected");
                *session = next;
                vec![
                    ui::render_validation(&reason),
                    self.prompt(owner_id, session, prompt).await?,
                ]
            }
            Effect::Cancelled => vec![ui::render_cancelled()],
            Effect::CreateExpense {
                amount,
                category,
                description,
            } => {
                let expense = self
                    .store
                    .create(owner_id, amount, category, &description)
                    .await?;
                tracing::info!(owner_id, expense_id = expense.id, "expense added");
                vec![ui::render_added(&expense, timezone)]
            }
            Effect::SelectEditTarget(id) => {
                let expense = self.store.get(id, owner_id).await?;
                *session = next;
                vec![ui::render_field_picker(&expense, timezone)]
            }
            Effect::UpdateExpense { id, patch } => {
                let field = patch.field();
                let expense = self.store.update_field(id, owner_id, patch).await?;
                tracing::info!(owner_id, expense_id = id, field = field.as_str(), "expense updated");
                vec![ui::render_updated(&expense, field, timezone)]
            }
        };
        Ok(Outcome::Replies(replies))
    }

    async fn run_command(
        &self,
        owner_id: OwnerId,
        session: &mut Session,
        event: Event,
    ) -> RouteResult<Outcome> {
        let timezone = self.settings.timezone;

        let reply = match event {
            Event::Menu(Command::Start | Command::Help) => {
                ui::render_welcome(self.settings.stats_window_days)
            }
            Event::Menu(Command::Add) => {
                *session = Some(SessionState::AwaitingAmount);
                ui::render_amount_prompt()
            }
            Event::Menu(Command::Stats) => {
                let days = self.settings.stats_window_days;
                let since = Utc::now() - chrono::Duration::days(days);
                let totals = self.store.aggregate_by_category(owner_id, since).await?;
                let total = ui::stats_total(&totals).ok_or_else(|| {
                    EngineError::InvalidAmount("statistics total too large".to_string())
                })?;
                ui::render_stats(&totals, total, days)
            }
            Event::Menu(Command::History) => {
                let expenses = self
                    .store
                    .list_recent(owner_id, self.settings.history_limit)
                    .await?;
                if expenses.is_empty() {
                    ui::render_no_entries()
                } else {
                    ui::render_history(&expenses, timezone)
                }
            }
            Event::Menu(Command::Edit) => {
                *session = Some(SessionState::AwaitingEditTarget);
                self.prompt(owner_id, session, Prompt::EditTarget).await?
            }
            Event::Menu(Command::Delete) => {
                let expenses = self
                    .store
                    .list_recent(owner_id, self.settings.delete_candidates)
                    .await?;
                if expenses.is_empty() {
                    ui::render_no_entries()
                } else {
                    ui::render_record_picker(
                        "🗑 Choose an entry to delete:",
                        &expenses,
                        RecordAction::Delete,
                        timezone,
                    )
                }
            }
            Event::Menu(Command::Export) => {
                if self.store.list_recent(owner_id, 1).await?.is_empty() {
                    ui::render_no_entries()
                } else {
                    ui::render_format_picker()
                }
            }
            Event::RecordSelected {
                id,
                action: RecordAction::Delete,
            } => {
                let expense = self.store.delete(id, owner_id).await?;
                tracing::info!(owner_id, expense_id = id, "expense deleted");
                ui::render_deleted(&expense, timezone)
            }
            Event::RecordSelected {
                id,
                action: RecordAction::Edit,
            } => {
                let expense = self.store.get(id, owner_id).await?;
                *session = Some(SessionState::AwaitingEditField { target: id });
                ui::render_field_picker(&expense, timezone)
            }
            Event::FormatSelected(format) => return Ok(Outcome::Export(format)),
            Event::CategorySelected(_) | Event::FieldSelected(_) => ui::render_stale_selection(),
            Event::Cancel => ui::render_nothing_to_cancel(),
            Event::Text(_) => ui::render_menu_hint(),
        };
        Ok(Outcome::Replies(vec![reply]))
    }

    /// Renders the prompt of the step the session is in.
    async fn prompt(
        &self,
        owner_id: OwnerId,
        session: &mut Session,
        prompt: Prompt,
    ) -> RouteResult<Reply> {
        let timezone = self.settings.timezone;

        Ok(match prompt {
            Prompt::Amount => ui::render_amount_prompt(),
            Prompt::Category => ui::render_category_prompt("📂 Choose a category:"),
            Prompt::Description => ui::render_description_prompt(),
            Prompt::EditTarget => {
                let expenses = self
                    .store
                    .list_recent(owner_id, self.settings.edit_candidates)
                    .await?;
                if expenses.is_empty() {
                    *session = None;
                    ui::render_no_entries()
                } else {
                    ui::render_record_picker(
                        "✏️ Choose an entry to edit:",
                        &expenses,
                        RecordAction::Edit,
                        timezone,
                    )
                }
            }
            Prompt::EditField => {
                let Some(target) = session.as_ref().and_then(|state| state.draft().edit_target)
                else {
                    *session = None;
                    return Ok(ui::render_stale_selection());
                };
                let expense = self.store.get(target, owner_id).await?;
                ui::render_field_picker(&expense, timezone)
            }
            Prompt::EditValue(field) => ui::render_value_prompt(field),
        })
    }

    async fn export(&self, owner_id: OwnerId, format: ExportFormat) -> Vec<Reply> {
        match self.exporter.export(owner_id, format).await {
            Ok(file) => {
                tracing::info!(owner_id, filename = %file.filename, "export ready");
                vec![ui::render_export_file(file.bytes, file.filename)]
            }
            Err(err) => {
                match &err {
                    ExportError::NoData => tracing::debug!(owner_id, "nothing to export"),
                    _ => tracing::error!(owner_id, %format, "export failed: {err}"),
                }
                vec![ui::render_export_error(&err)]
            }
        }
    }

    fn failure(&self, owner_id: OwnerId, err: &EngineError) -> Vec<Reply> {
        if err.is_not_found() {
            tracing::info!(owner_id, "{err}");
            vec![ui::render_not_found()]
        } else {
            tracing::error!(owner_id, "store failure: {err}");
            vec![ui::render_store_failure()]
        }
    }
}
