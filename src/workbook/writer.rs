//! Minimal `.xlsx` writer: one worksheet per sheet, inline strings only.

use super::{column_name, Cell, Workbook, WorkbookResult};
use quick_xml::escape::escape;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAX_SHEET_NAME: usize = 31;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

/// Serialise a workbook into `.xlsx` bytes
pub fn write_workbook(workbook: &Workbook) -> WorkbookResult<Vec<u8>> {
    let names = unique_sheet_names(workbook);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(names.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(&names).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels(names.len()).as_bytes())?;

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
        zip.write_all(sheet_xml(&sheet.rows).as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Strip characters Excel forbids in sheet names and cap the length
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    if truncated.is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

fn unique_sheet_names(workbook: &Workbook) -> Vec<String> {
    let mut seen = HashSet::new();
    workbook
        .sheets
        .iter()
        .map(|sheet| {
            let base = sanitize_sheet_name(&sheet.name);
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.to_lowercase()) {
                let suffix = format!(" ({})", n);
                let keep = MAX_SHEET_NAME.saturating_sub(suffix.len());
                candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
                n += 1;
            }
            candidate
        })
        .collect()
}

fn content_types(sheets: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    for i in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        );
    }
    xml.push_str("</Types>");
    xml
}

fn workbook_xml(names: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (i, name) in names.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name.as_str()),
            i + 1,
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheets: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheets {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, i
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (r, row) in rows.iter().enumerate() {
        let _ = write!(xml, r#"<row r="{}">"#, r + 1);
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), r + 1);
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        reference,
                        escape(text.as_str())
                    );
                }
                Cell::Number(n) => {
                    let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, n);
                }
                Cell::Bool(b) => {
                    let _ = write!(xml, r#"<c r="{}" t="b"><v>{}</v></c>"#, reference, u8::from(*b));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{read_workbook, Sheet};

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("IT/CS [2023]"), "ITCS 2023");
        assert_eq!(sanitize_sheet_name("???"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"A".repeat(40)).len(), 31);
    }

    #[test]
    fn test_written_workbook_is_readable() {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new("IT-2301");
        sheet.push_row(["Day", "Time", "Course"]);
        sheet.push_row(vec![Cell::from("Mon"), Cell::from("08:00"), Cell::from("R&D <intro>")]);
        sheet.push_row(vec![Cell::Number(2.5), Cell::Empty, Cell::Bool(false)]);
        workbook.sheets.push(sheet);
        workbook.sheets.push(Sheet::new("it-2301"));

        let bytes = write_workbook(&workbook).unwrap();
        let parsed = read_workbook(&bytes).unwrap();

        assert_eq!(parsed.sheet_names(), vec!["IT-2301", "it-2301 (2)"]);
        assert_eq!(parsed.sheets[0].rows[1][2], Cell::from("R&D <intro>"));
        assert_eq!(
            parsed.sheets[0].rows[2],
            vec![Cell::Number(2.5), Cell::Empty, Cell::Bool(false)]
        );
        assert!(parsed.sheets[1].rows.is_empty());
    }
}
