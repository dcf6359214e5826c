use csv::Writer;
use serde::Serialize;

use super::{ExportError, ExportFormatter, ExportReport};

/// Comma-separated export; the header comes from the serialized field names.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvFormatter;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
}

impl ExportFormatter for CsvFormatter {
    fn render(&self, report: &ExportReport) -> Result<Vec<u8>, ExportError> {
        let mut writer = Writer::from_writer(vec![]);
        for row in &report.rows {
            writer
                .serialize(CsvRow {
                    date: &row.date,
                    amount: row.amount.to_string(),
                    category: &row.category,
                    description: &row.description,
                })
                .map_err(|err| ExportError::Formatter(format!("failed to serialize row: {err}")))?;
        }
        writer
            .serialize(CsvRow {
                date: "Total",
                amount: report.total.to_string(),
                category: "",
                description: "",
            })
            .map_err(|err| ExportError::Formatter(format!("failed to serialize total: {err}")))?;

        writer
            .into_inner()
            .map_err(|err| ExportError::Formatter(format!("failed to finalize export: {err}")))
    }
}
