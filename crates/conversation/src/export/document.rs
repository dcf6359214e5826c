use std::fmt::Write as _;

use super::{COLUMNS, ExportError, ExportFormatter, ExportReport};

/// Minimal PDF 1.4 report using the built-in Helvetica faces.
///
/// Text is WinAnsi encoded; characters outside Latin-1 print as `?`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfFormatter;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 40.0;
const ROW_HEIGHT: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 11.0;
const TITLE_SIZE: f32 = 18.0;
/// Left edge of each column; the last column runs to the right margin.
const COLUMN_X: [f32; 4] = [MARGIN, 150.0, 240.0, 350.0];
const DESCRIPTION_CHARS: usize = 44;

// Fixed objects: catalog, page tree, regular font, bold font.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FIRST_PAGE_ID: usize = 5;

impl ExportFormatter for PdfFormatter {
    fn render(&self, report: &ExportReport) -> Result<Vec<u8>, ExportError> {
        let pages = layout(report);
        Ok(assemble(&pages))
    }
}

/// Splits the report into per-page content streams.
fn layout(report: &ExportReport) -> Vec<Vec<u8>> {
    let mut pages = Vec::new();
    let mut page = Page::new();

    page.text("F2", TITLE_SIZE, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE, "Expense report");
    let mut y = PAGE_HEIGHT - MARGIN - TITLE_SIZE - 30.0;
    page.table_header(y);
    y -= ROW_HEIGHT;

    for row in &report.rows {
        if y < MARGIN + ROW_HEIGHT {
            pages.push(page.finish());
            page = Page::new();
            y = PAGE_HEIGHT - MARGIN - HEADER_SIZE;
            page.table_header(y);
            y -= ROW_HEIGHT;
        }
        page.text("F1", BODY_SIZE, COLUMN_X[0], y, &row.date);
        page.text_right("F1", BODY_SIZE, COLUMN_X[2] - 10.0, y, &row.amount.grouped());
        page.text("F1", BODY_SIZE, COLUMN_X[2], y, &row.category);
        page.text("F1", BODY_SIZE, COLUMN_X[3], y, &truncate(&row.description, DESCRIPTION_CHARS));
        y -= ROW_HEIGHT;
    }

    // Total and footer need two more lines.
    if y < MARGIN + 2.0 * ROW_HEIGHT {
        pages.push(page.finish());
        page = Page::new();
        y = PAGE_HEIGHT - MARGIN - HEADER_SIZE;
    }
    page.rule(y + ROW_HEIGHT - 4.0);
    page.text("F2", HEADER_SIZE, COLUMN_X[0], y, "Total:");
    page.text_right("F2", HEADER_SIZE, COLUMN_X[2] - 10.0, y, &report.total.grouped());
    y -= ROW_HEIGHT * 1.5;
    page.text(
        "F1",
        BODY_SIZE - 2.0,
        MARGIN,
        y,
        &format!("Generated: {}", report.generated_at),
    );
    pages.push(page.finish());
    pages
}

struct Page {
    content: Vec<u8>,
}

impl Page {
    fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.content
            .extend_from_slice(format!("BT /{font} {size} Tf {x:.2} {y:.2} Td (").as_bytes());
        self.content.extend(encode_text(text));
        self.content.extend_from_slice(b") Tj ET\n");
    }

    /// Right-aligns `text` so it ends at `right`, using an average glyph width.
    fn text_right(&mut self, font: &str, size: f32, right: f32, y: f32, text: &str) {
        let width = text.chars().count() as f32 * size * 0.556;
        self.text(font, size, right - width, y, text);
    }

    fn rule(&mut self, y: f32) {
        let mut line = String::new();
        let _ = writeln!(
            line,
            "0.5 w {MARGIN:.2} {y:.2} m {:.2} {y:.2} l S",
            PAGE_WIDTH - MARGIN
        );
        self.content.extend_from_slice(line.as_bytes());
    }

    fn table_header(&mut self, y: f32) {
        for (idx, title) in COLUMNS.iter().enumerate() {
            if idx == 1 {
                self.text_right("F2", HEADER_SIZE, COLUMN_X[2] - 10.0, y, title);
            } else {
                self.text("F2", HEADER_SIZE, COLUMN_X[idx], y, title);
            }
        }
        self.rule(y - 4.0);
    }

    fn finish(self) -> Vec<u8> {
        self.content
    }
}

/// Writes the object graph, the cross-reference table and the trailer.
fn assemble(pages: &[Vec<u8>]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..pages.len()).map(|idx| FIRST_PAGE_ID + idx * 2).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").into_bytes(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];
    for (page_id, content) in page_ids.iter().zip(pages) {
        objects.push(
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(xref, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

/// Encodes text for a literal string: Latin-1 bytes, escaped delimiters.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(ch as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use engine::Amount;

    use super::*;
    use crate::export::ExportRow;

    fn report(rows: usize) -> ExportReport {
        ExportReport {
            rows: (0..rows)
                .map(|idx| ExportRow {
                    date: "14.03.2026 12:00".to_string(),
                    amount: Amount::new(1_000),
                    category: "Food".to_string(),
                    description: format!("Lunch (#{idx})"),
                })
                .collect(),
            total: Amount::new(1_000 * rows as i64),
            generated_at: "15.03.2026 08:00".to_string(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        text.split("/Count ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|count| count.parse().ok())
            .unwrap()
    }

    #[test]
    fn document_has_title_rows_total_and_footer() {
        let pdf = PdfFormatter.render(&report(2)).unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(contains(&pdf, b"(Expense report) Tj"));
        assert!(contains(&pdf, b"(Lunch \\(#1\\)) Tj"));
        assert!(contains(&pdf, b"(Total:) Tj"));
        assert!(contains(&pdf, b"(20.00) Tj"));
        assert!(contains(&pdf, b"(Generated: 15.03.2026 08:00) Tj"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn startxref_points_at_the_xref_table() {
        let pdf = PdfFormatter.render(&report(3)).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        let offset: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|rest| rest.lines().next())
            .and_then(|line| line.parse().ok())
            .unwrap();
        assert!(pdf[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn long_reports_paginate() {
        let pdf = PdfFormatter.render(&report(120)).unwrap();
        assert!(page_count(&pdf) >= 3);
        assert!(contains(&pdf, b"(Lunch \\(#119\\)) Tj"));
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(encode_text("Café"), b"Caf\xE9".to_vec());
        assert_eq!(encode_text("Обед 🍔"), b"???? ?".to_vec());
    }

    #[test]
    fn long_descriptions_are_truncated() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
