//! Inbound events.
//!
//! Transports hand over two kinds of input: free text and an opaque payload
//! token attached to a selection button. Both are decoded here, once, into an
//! [`Event`]; nothing past this module looks at raw strings.
//!
//! Payload grammar:
//!
//! | token | event |
//! |---|---|
//! | `cancel` | [`Event::Cancel`] |
//! | `cat:<key>` | [`Event::CategorySelected`] |
//! | `rec:edit:<id>` / `rec:del:<id>` | [`Event::RecordSelected`] |
//! | `field:<amount\|category\|description>` | [`Event::FieldSelected`] |
//! | `fmt:<xlsx\|pdf\|csv>` | [`Event::FormatSelected`] |

use engine::{Category, EditField, ExpenseId};
use thiserror::Error;

use crate::export::ExportFormat;

pub const CANCEL_LABEL: &str = "❌ Cancel";
const CANCEL_TOKEN: &str = "cancel";

/// Top-level commands reachable from the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    Stats,
    History,
    Edit,
    Delete,
    Export,
}

impl Command {
    /// Commands shown on the main menu keyboard, in display order.
    pub const MENU: [Command; 6] = [
        Self::Add,
        Self::Stats,
        Self::History,
        Self::Edit,
        Self::Delete,
        Self::Export,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "/start",
            Self::Help => "/help",
            Self::Add => "➕ Add expense",
            Self::Stats => "📊 Statistics",
            Self::History => "📝 History",
            Self::Edit => "✏️ Edit",
            Self::Delete => "🗑 Delete",
            Self::Export => "📥 Export",
        }
    }

    fn slash(self) -> &'static str {
        match self {
            Self::Start => "/start",
            Self::Help => "/help",
            Self::Add => "/add",
            Self::Stats => "/stats",
            Self::History => "/history",
            Self::Edit => "/edit",
            Self::Delete => "/delete",
            Self::Export => "/export",
        }
    }

    const ALL: [Command; 8] = [
        Self::Start,
        Self::Help,
        Self::Add,
        Self::Stats,
        Self::History,
        Self::Edit,
        Self::Delete,
        Self::Export,
    ];
}

/// What a record selection button is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordAction {
    Edit,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Free text that is neither a menu label nor the cancel token.
    Text(String),
    Menu(Command),
    Cancel,
    CategorySelected(Category),
    RecordSelected { id: ExpenseId, action: RecordAction },
    FieldSelected(EditField),
    FormatSelected(ExportFormat),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,
    #[error("unknown payload: {0}")]
    Unknown(String),
    #[error("invalid record id in payload: {0}")]
    InvalidId(String),
}

impl Event {
    /// Decodes a free-text message.
    ///
    /// Menu labels and slash commands match exactly (a trailing `@botname` on
    /// slash commands is ignored); everything else is [`Event::Text`].
    pub fn from_text(text: &str) -> Event {
        let trimmed = text.trim();
        if trimmed == CANCEL_LABEL || slash_name(trimmed) == Some("/cancel") {
            return Event::Cancel;
        }
        if let Some(command) = Command::ALL.into_iter().find(|cmd| {
            trimmed == cmd.label() || slash_name(trimmed) == Some(cmd.slash())
        }) {
            return Event::Menu(command);
        }
        Event::Text(text.to_string())
    }

    /// Decodes a selection payload token.
    pub fn decode_payload(token: &str) -> Result<Event, DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }
        if token == CANCEL_TOKEN {
            return Ok(Event::Cancel);
        }

        let unknown = || DecodeError::Unknown(token.to_string());

        if let Some(key) = token.strip_prefix("cat:") {
            return Category::try_from(key)
                .map(Event::CategorySelected)
                .map_err(|_| unknown());
        }
        if let Some(rest) = token.strip_prefix("rec:") {
            let (action, id) = rest.split_once(':').ok_or_else(unknown)?;
            let action = match action {
                "edit" => RecordAction::Edit,
                "del" => RecordAction::Delete,
                _ => return Err(unknown()),
            };
            let id = id
                .parse::<ExpenseId>()
                .map_err(|_| DecodeError::InvalidId(token.to_string()))?;
            return Ok(Event::RecordSelected { id, action });
        }
        if let Some(field) = token.strip_prefix("field:") {
            return EditField::try_from(field)
                .map(Event::FieldSelected)
                .map_err(|_| unknown());
        }
        if let Some(format) = token.strip_prefix("fmt:") {
            return ExportFormat::try_from(format)
                .map(Event::FormatSelected)
                .map_err(|_| unknown());
        }

        Err(unknown())
    }

    /// Payload token for events that can sit behind a selection button.
    pub fn payload(&self) -> Option<String> {
        match self {
            Event::Cancel => Some(CANCEL_TOKEN.to_string()),
            Event::CategorySelected(category) => Some(format!("cat:{}", category.as_str())),
            Event::RecordSelected { id, action } => Some(match action {
                RecordAction::Edit => format!("rec:edit:{id}"),
                RecordAction::Delete => format!("rec:del:{id}"),
            }),
            Event::FieldSelected(field) => Some(format!("field:{}", field.as_str())),
            Event::FormatSelected(format) => Some(format!("fmt:{}", format.as_str())),
            Event::Text(_) | Event::Menu(_) => None,
        }
    }
}

fn slash_name(text: &str) -> Option<&str> {
    if !text.starts_with('/') || text.contains(char::is_whitespace) {
        return None;
    }
    Some(text.split_once('@').map_or(text, |(name, _)| name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_labels_and_slash_commands_decode_to_commands() {
        assert_eq!(Event::from_text("➕ Add expense"), Event::Menu(Command::Add));
        assert_eq!(Event::from_text("/stats"), Event::Menu(Command::Stats));
        assert_eq!(Event::from_text("/edit@spend_bot"), Event::Menu(Command::Edit));
        assert_eq!(Event::from_text("/start"), Event::Menu(Command::Start));
    }

    #[test]
    fn cancel_label_and_command_decode_to_cancel() {
        assert_eq!(Event::from_text("❌ Cancel"), Event::Cancel);
        assert_eq!(Event::from_text("/cancel"), Event::Cancel);
    }

    #[test]
    fn other_text_is_kept_verbatim() {
        assert_eq!(Event::from_text("1500"), Event::Text("1500".to_string()));
        assert_eq!(
            Event::from_text("add expense"),
            Event::Text("add expense".to_string())
        );
        assert_eq!(
            Event::from_text("/start now"),
            Event::Text("/start now".to_string())
        );
    }

    #[test]
    fn payloads_decode_to_tagged_events() {
        assert_eq!(Event::decode_payload("cancel"), Ok(Event::Cancel));
        assert_eq!(
            Event::decode_payload("cat:food"),
            Ok(Event::CategorySelected(Category::Food))
        );
        assert_eq!(
            Event::decode_payload("rec:edit:7"),
            Ok(Event::RecordSelected {
                id: 7,
                action: RecordAction::Edit
            })
        );
        assert_eq!(
            Event::decode_payload("rec:del:12"),
            Ok(Event::RecordSelected {
                id: 12,
                action: RecordAction::Delete
            })
        );
        assert_eq!(
            Event::decode_payload("field:description"),
            Ok(Event::FieldSelected(EditField::Description))
        );
        assert_eq!(
            Event::decode_payload("fmt:pdf"),
            Ok(Event::FormatSelected(ExportFormat::Document))
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert_eq!(Event::decode_payload(""), Err(DecodeError::Empty));
        assert!(matches!(
            Event::decode_payload("cat:groceries"),
            Err(DecodeError::Unknown(_))
        ));
        assert!(matches!(
            Event::decode_payload("rec:edit:seven"),
            Err(DecodeError::InvalidId(_))
        ));
        assert!(matches!(
            Event::decode_payload("rec:move:7"),
            Err(DecodeError::Unknown(_))
        ));
        assert!(matches!(
            Event::decode_payload("category_food"),
            Err(DecodeError::Unknown(_))
        ));
    }

    #[test]
    fn payload_tokens_decode_back_to_the_same_event() {
        let events = [
            Event::Cancel,
            Event::CategorySelected(Category::Gifts),
            Event::RecordSelected {
                id: 3,
                action: RecordAction::Delete,
            },
            Event::FieldSelected(EditField::Amount),
            Event::FormatSelected(ExportFormat::Csv),
        ];
        for event in events {
            let token = event.payload().unwrap();
            assert_eq!(Event::decode_payload(&token), Ok(event));
        }
        assert_eq!(Event::Text("x".to_string()).payload(), None);
    }
}
