use std::{
    fmt::Write as _,
    io::{Cursor, Write},
};

use super::{COLUMNS, ExportError, ExportFormatter, ExportReport};

/// Single-sheet Office Open XML workbook.
///
/// Header cells are bold on a grey fill, amounts are numeric cells with the
/// `#,##0.00` format and the last row carries the total.
#[derive(Clone, Copy, Debug, Default)]
pub struct XlsxFormatter;

// Indexes into `cellXfs` of STYLES_XML.
const STYLE_HEADER: u8 = 1;
const STYLE_AMOUNT: u8 = 2;
const STYLE_TOTAL_LABEL: u8 = 3;
const STYLE_TOTAL_AMOUNT: u8 = 4;

impl ExportFormatter for XlsxFormatter {
    fn render(&self, report: &ExportReport) -> Result<Vec<u8>, ExportError> {
        let sheet = sheet_xml(report);

        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            for (name, content) in [
                ("[Content_Types].xml", CONTENT_TYPES_XML),
                ("_rels/.rels", RELS_XML),
                ("xl/workbook.xml", WORKBOOK_XML),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML),
                ("xl/styles.xml", STYLES_XML),
                ("xl/worksheets/sheet1.xml", sheet.as_str()),
            ] {
                zip.start_file(name, options).map_err(zip_error)?;
                zip.write_all(content.as_bytes())
                    .map_err(|err| ExportError::Formatter(err.to_string()))?;
            }

            zip.finish().map_err(zip_error)?;
        }
        Ok(buf)
    }
}

fn zip_error(err: zip::result::ZipError) -> ExportError {
    ExportError::Formatter(err.to_string())
}

fn sheet_xml(report: &ExportReport) -> String {
    let mut rows = String::new();

    push_row(&mut rows, 1, |row| {
        for (col, title) in COLUMNS.iter().enumerate() {
            text_cell(row, col, 1, title, Some(STYLE_HEADER));
        }
    });

    for (idx, line) in report.rows.iter().enumerate() {
        let r = idx + 2;
        push_row(&mut rows, r, |row| {
            text_cell(row, 0, r, &line.date, None);
            number_cell(row, 1, r, &line.amount.to_string(), STYLE_AMOUNT);
            text_cell(row, 2, r, &line.category, None);
            text_cell(row, 3, r, &line.description, None);
        });
    }

    let total_row = report.rows.len() + 2;
    push_row(&mut rows, total_row, |row| {
        text_cell(row, 0, total_row, "Total", Some(STYLE_TOTAL_LABEL));
        number_cell(row, 1, total_row, &report.total.to_string(), STYLE_TOTAL_AMOUNT);
    });

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cols>
    <col min="1" max="1" width="18" customWidth="1"/>
    <col min="2" max="2" width="14" customWidth="1"/>
    <col min="3" max="3" width="18" customWidth="1"/>
    <col min="4" max="4" width="40" customWidth="1"/>
  </cols>
  <sheetData>
{rows}  </sheetData>
</worksheet>"#
    )
}

fn push_row(out: &mut String, r: usize, cells: impl FnOnce(&mut String)) {
    let _ = write!(out, r#"    <row r="{r}">"#);
    cells(out);
    out.push_str("</row>\n");
}

fn cell_ref(col: usize, r: usize) -> String {
    format!("{}{r}", char::from(b'A' + col as u8))
}

fn text_cell(out: &mut String, col: usize, r: usize, text: &str, style: Option<u8>) {
    let style = style.map(|s| format!(r#" s="{s}""#)).unwrap_or_default();
    let _ = write!(
        out,
        r#"<c r="{}" t="inlineStr"{style}><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref(col, r),
        escape_xml(text)
    );
}

fn number_cell(out: &mut String, col: usize, r: usize, value: &str, style: u8) {
    let _ = write!(out, r#"<c r="{}" s="{style}"><v>{value}</v></c>"#, cell_ref(col, r));
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Expenses" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// numFmtId 4 is the built-in `#,##0.00`.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFCCCCCC"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/>
    <xf numFmtId="4" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    <xf numFmtId="4" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyNumberFormat="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;
