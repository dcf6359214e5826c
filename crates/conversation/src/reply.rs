use crate::event::Event;

/// Reply keyboards a transport can attach to a text reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyboard {
    /// The main menu.
    Menu,
    /// A single cancel button, shown while free text is expected.
    Cancel,
}

/// A selectable option: what the user sees and the payload token sent back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    /// Builds a choice for an event that has a payload token.
    pub fn for_event(label: impl Into<String>, event: &Event) -> Option<Choice> {
        event.payload().map(|token| Choice {
            label: label.into(),
            token,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// A selection prompt; `columns` is the preferred number of choices per row.
    Choices {
        text: String,
        choices: Vec<Choice>,
        columns: usize,
    },
    File {
        bytes: Vec<u8>,
        filename: String,
        caption: String,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Reply {
        Reply::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_menu(text: impl Into<String>) -> Reply {
        Reply::Text {
            text: text.into(),
            keyboard: Some(Keyboard::Menu),
        }
    }

    pub fn with_cancel(text: impl Into<String>) -> Reply {
        Reply::Text {
            text: text.into(),
            keyboard: Some(Keyboard::Cancel),
        }
    }

    pub fn choices(text: impl Into<String>, choices: Vec<Choice>, columns: usize) -> Reply {
        Reply::Choices {
            text: text.into(),
            choices,
            columns: columns.max(1),
        }
    }

    /// The text or caption of the reply.
    pub fn body(&self) -> &str {
        match self {
            Reply::Text { text, .. } | Reply::Choices { text, .. } => text,
            Reply::File { caption, .. } => caption,
        }
    }
}
