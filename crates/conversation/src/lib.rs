//! Transport-agnostic conversation layer of the expense bot.
//!
//! A transport decodes what the user sent into an [`Event`], hands it to
//! [`Router::route`] together with the sender id and delivers the returned
//! [`Reply`] values. Multi-step flows (adding and editing an expense) live in
//! the pure [`transition`] function; everything touching storage goes
//! through a [`RecordStore`].

pub use event::{CANCEL_LABEL, Command, DecodeError, Event, RecordAction};
pub use export::{
    COLUMNS, CsvFormatter, ExportAdapter, ExportError, ExportFile, ExportFormat, ExportFormatter,
    ExportReport, ExportRow, PdfFormatter, XlsxFormatter,
};
pub use machine::{Effect, Prompt, Transition, ValidationError, transition};
pub use reply::{Choice, Keyboard, Reply};
pub use router::Router;
pub use session::{Draft, Session, SessionState, SessionStore};
pub use settings::ConversationSettings;
pub use store::RecordStore;

mod event;
mod export;
mod machine;
mod reply;
mod router;
mod session;
mod settings;
mod store;
mod ui;
