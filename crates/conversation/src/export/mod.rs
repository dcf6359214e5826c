//! Report/export adapter.
//!
//! Turns a user's full expense history into a downloadable file. The adapter
//! owns the pieces every format shares (fetching, row normalization, the total,
//! the filename, the timeout); an [`ExportFormatter`] only lays bytes out.

use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{Amount, EngineError, Expense, OwnerId};
use thiserror::Error;

use crate::{event::DecodeError, store::RecordStore};

mod delimited;
mod document;
mod spreadsheet;

pub use delimited::CsvFormatter;
pub use document::PdfFormatter;
pub use spreadsheet::XlsxFormatter;

/// Column headers, in the order every format writes them.
pub const COLUMNS: [&str; 4] = ["Date", "Amount", "Category", "Description"];

/// Display format for timestamps in exports and history.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExportFormat {
    Spreadsheet,
    Document,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Spreadsheet, Self::Document, Self::Csv];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Document => "pdf",
            Self::Csv => "csv",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Spreadsheet => "📊 Excel (.xlsx)",
            Self::Document => "📄 PDF",
            Self::Csv => "🧾 CSV",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = DecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| DecodeError::Unknown(value.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no expenses to export")]
    NoData,
    #[error("formatter failed: {0}")]
    Formatter(String),
    #[error("export did not finish within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Store(#[from] EngineError),
}

/// One normalized report line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub amount: Amount,
    pub category: String,
    pub description: String,
}

/// Everything a formatter needs: the rows, their total and when the report
/// was generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: Vec<ExportRow>,
    pub total: Amount,
    pub generated_at: String,
}

impl ExportReport {
    pub fn new(
        expenses: &[Expense],
        timezone: Tz,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        let mut total = Amount::ZERO;
        let mut rows = Vec::with_capacity(expenses.len());
        for expense in expenses {
            total = total
                .checked_add(expense.amount)
                .ok_or_else(|| ExportError::Formatter("total out of range".to_string()))?;
            let description = if expense.description.is_empty() {
                "-".to_string()
            } else {
                expense.description.clone()
            };
            rows.push(ExportRow {
                date: format_timestamp(expense.created_at, timezone),
                amount: expense.amount,
                category: expense.category.name().to_string(),
                description,
            });
        }

        Ok(Self {
            rows,
            total,
            generated_at: format_timestamp(generated_at, timezone),
        })
    }
}

/// Lays a report out as file bytes.
///
/// Runs on the blocking thread pool, so implementations may do CPU-bound work
/// freely.
pub trait ExportFormatter: Send + Sync {
    fn render(&self, report: &ExportReport) -> Result<Vec<u8>, ExportError>;
}

/// A rendered export ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: ExportFormat,
}

pub fn format_timestamp(at: DateTime<Utc>, timezone: Tz) -> String {
    at.with_timezone(&timezone).format(TIMESTAMP_FORMAT).to_string()
}

pub fn export_filename(owner_id: OwnerId, format: ExportFormat, at: DateTime<Utc>, timezone: Tz) -> String {
    format!(
        "expenses_{owner_id}_{}.{}",
        at.with_timezone(&timezone).format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[derive(Clone)]
pub struct ExportAdapter {
    store: Arc<dyn RecordStore>,
    formatters: BTreeMap<ExportFormat, Arc<dyn ExportFormatter>>,
    timezone: Tz,
    timeout: Duration,
}

impl ExportAdapter {
    /// Creates an adapter with the built-in formatter for every format.
    pub fn new(store: Arc<dyn RecordStore>, timezone: Tz, timeout: Duration) -> Self {
        let mut formatters: BTreeMap<ExportFormat, Arc<dyn ExportFormatter>> = BTreeMap::new();
        formatters.insert(ExportFormat::Spreadsheet, Arc::new(XlsxFormatter));
        formatters.insert(ExportFormat::Document, Arc::new(PdfFormatter));
        formatters.insert(ExportFormat::Csv, Arc::new(CsvFormatter));
        Self {
            store,
            formatters,
            timezone,
            timeout,
        }
    }

    /// Replaces the formatter used for `format`.
    pub fn with_formatter(mut self, format: ExportFormat, formatter: Arc<dyn ExportFormatter>) -> Self {
        self.formatters.insert(format, formatter);
        self
    }

    pub async fn export(&self, owner_id: OwnerId, format: ExportFormat) -> Result<ExportFile, ExportError> {
        let expenses = self.store.list_all(owner_id).await?;
        if expenses.is_empty() {
            return Err(ExportError::NoData);
        }

        let formatter = self
            .formatters
            .get(&format)
            .cloned()
            .ok_or_else(|| ExportError::Formatter(format!("no formatter for {format}")))?;

        let now = Utc::now();
        let report = ExportReport::new(&expenses, self.timezone, now)?;
        let rows = report.rows.len();

        let render = tokio::task::spawn_blocking(move || formatter.render(&report));
        let bytes = tokio::time::timeout(self.timeout, render)
            .await
            .map_err(|_| ExportError::Timeout(self.timeout))?
            .map_err(|err| ExportError::Formatter(err.to_string()))??;

        tracing::debug!(owner_id, %format, rows, size = bytes.len(), "export rendered");
        Ok(ExportFile {
            bytes,
            filename: export_filename(owner_id, format, now, self.timezone),
            format,
        })
    }
}
