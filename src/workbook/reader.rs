//! `.xlsx` reader built on `zip` and `quick-xml` events.

use super::{parse_cell_ref, Cell, MAX_COLUMNS, MAX_ROWS, Sheet, Workbook, WorkbookError, WorkbookResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Parse an `.xlsx` file held in memory
pub fn read_workbook(data: &[u8]) -> WorkbookResult<Workbook> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?
        .ok_or_else(|| WorkbookError::MissingPart(WORKBOOK_PART.to_string()))?;
    let declared = parse_sheet_list(&workbook_xml)?;

    let targets = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let shared = match read_part(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let mut workbook = Workbook::new();
    for (position, (name, rel_id)) in declared.into_iter().enumerate() {
        let part = targets
            .get(&rel_id)
            .map(|target| resolve_target(target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));

        let xml = read_part(&mut archive, &part)?
            .ok_or_else(|| WorkbookError::MissingPart(part.clone()))?;
        let rows = parse_sheet_rows(&part, &xml, &shared)?;

        tracing::debug!(sheet = %name, rows = rows.len(), "Read worksheet");
        workbook.sheets.push(Sheet { name, rows });
    }

    Ok(workbook)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> WorkbookResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

fn attribute(part: &str, element: &BytesStart<'_>, name: &[u8]) -> WorkbookResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| WorkbookError::xml(part, e))?;
        if attr.key.as_ref() == name || attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| WorkbookError::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Sheet names with their relationship ids, in workbook order
fn parse_sheet_list(xml: &str) -> WorkbookResult<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event().map_err(|e| WorkbookError::xml(WORKBOOK_PART, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(WORKBOOK_PART, &e, b"name")?.unwrap_or_default();
                let rel_id = attribute(WORKBOOK_PART, &e, b"r:id")?.unwrap_or_default();
                sheets.push((name, rel_id));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

fn parse_relationships(xml: &str) -> WorkbookResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| WorkbookError::xml(WORKBOOK_RELS_PART, e))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(WORKBOOK_RELS_PART, &e, b"Id")?;
                let target = attribute(WORKBOOK_RELS_PART, &e, b"Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Shared string table; rich-text runs are concatenated, phonetic runs skipped
fn parse_shared_strings(xml: &str) -> WorkbookResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| WorkbookError::xml(SHARED_STRINGS_PART, e))?
        {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = !in_phonetic,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| WorkbookError::xml(SHARED_STRINGS_PART, e))?;
                current.push_str(&text);
            }
            Event::CData(t) if in_text => {
                current.push_str(&String::from_utf8_lossy(&t));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell being assembled while walking a `<c>` element
#[derive(Default)]
struct PendingCell {
    column: usize,
    kind: Option<String>,
    value: String,
    reference: String,
}

impl PendingCell {
    fn finish(self, shared: &[String]) -> WorkbookResult<Cell> {
        let raw = self.value;
        let cell = match self.kind.as_deref() {
            Some("s") => {
                let index: usize = raw.trim().parse().map_err(|_| WorkbookError::InvalidCell {
                    reference: self.reference.clone(),
                    message: format!("bad shared string index '{}'", raw),
                })?;
                let text = shared.get(index).ok_or_else(|| WorkbookError::InvalidCell {
                    reference: self.reference.clone(),
                    message: format!("shared string {} out of range", index),
                })?;
                Cell::Text(text.clone())
            }
            Some("str") | Some("inlineStr") => Cell::Text(raw),
            Some("b") => Cell::Bool(raw.trim() == "1"),
            Some("e") => Cell::Empty,
            _ if raw.trim().is_empty() => Cell::Empty,
            _ => match raw.trim().parse::<f64>() {
                Ok(n) => Cell::Number(n),
                Err(_) => Cell::Text(raw),
            },
        };
        Ok(cell)
    }
}

fn parse_sheet_rows(part: &str, xml: &str, shared: &[String]) -> WorkbookResult<Vec<Vec<Cell>>> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut row_index = 0usize;
    let mut next_column = 0usize;
    let mut pending: Option<PendingCell> = None;
    let mut capture = false;

    loop {
        match reader.read_event().map_err(|e| WorkbookError::xml(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_index = match attribute(part, &e, b"r")? {
                        Some(r) => match r.trim().parse::<usize>() {
                            Ok(n) if (1..=MAX_ROWS).contains(&n) => n - 1,
                            _ => {
                                return Err(WorkbookError::InvalidCell {
                                    reference: r,
                                    message: "row number out of range".to_string(),
                                })
                            }
                        },
                        None => rows.len(),
                    };
                    if row_index >= MAX_ROWS {
                        return Err(WorkbookError::InvalidCell {
                            reference: (row_index + 1).to_string(),
                            message: "row number out of range".to_string(),
                        });
                    }
                    next_column = 0;
                }
                b"c" => {
                    let reference = attribute(part, &e, b"r")?.unwrap_or_default();
                    let column = if reference.is_empty() {
                        next_column
                    } else {
                        parse_cell_ref(&reference)
                            .map(|(col, _)| col)
                            .ok_or_else(|| WorkbookError::InvalidCell {
                                reference: reference.clone(),
                                message: "unparseable or out of range reference".to_string(),
                            })?
                    };
                    if column >= MAX_COLUMNS {
                        return Err(WorkbookError::InvalidCell {
                            reference,
                            message: "column out of range".to_string(),
                        });
                    }
                    pending = Some(PendingCell {
                        column,
                        kind: attribute(part, &e, b"t")?,
                        value: String::new(),
                        reference,
                    });
                }
                b"v" | b"t" => capture = pending.is_some(),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                next_column += 1;
            }
            Event::Text(t) if capture => {
                if let Some(cell) = pending.as_mut() {
                    let text = t.unescape().map_err(|e| WorkbookError::xml(part, e))?;
                    cell.value.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let column = cell.column;
                        let value = cell.finish(shared)?;
                        if rows.len() <= row_index {
                            rows.resize_with(row_index + 1, Vec::new);
                        }
                        let row = &mut rows[row_index];
                        if row.len() <= column {
                            row.resize(column + 1, Cell::Empty);
                        }
                        row[column] = value;
                        next_column = column + 1;
                    }
                }
                b"row" => {
                    if rows.len() <= row_index {
                        rows.resize_with(row_index + 1, Vec::new);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Rooms" sheetId="1" r:id="rId7"/>
  </sheets>
</workbook>"#;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/data.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
  <si><t>room_code</t></si>
  <si><r><t>Lab </t></r><r><t xml:space="preserve">&amp; Co</t></r></si>
  <si><t>capacity</t></si>
</sst>"#;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>2</v></c></row>
    <row r="3"><c r="A3" t="s"><v>1</v></c><c r="C3" t="b"><v>1</v></c></row>
    <row r="4"><c r="B4"><v>42</v></c><c r="A4" t="inlineStr"><is><t>Gym</t></is></c></row>
  </sheetData>
</worksheet>"#;

    #[test]
    fn test_reads_shared_strings_and_sparse_rows() {
        let data = archive(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/data.xml", SHEET),
        ]);

        let workbook = read_workbook(&data).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Rooms"]);

        let rows = &workbook.sheets[0].rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec![Cell::from("room_code"), Cell::from("capacity")]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec![Cell::from("Lab & Co"), Cell::Empty, Cell::Bool(true)]);
        assert_eq!(rows[3], vec![Cell::from("Gym"), Cell::Number(42.0)]);
    }

    fn single_cell_sheet(row: &str, cell: &str) -> Vec<u8> {
        let sheet = format!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="{}"><c r="{}" t="inlineStr"><is><t>x</t></is></c></row></sheetData></worksheet>"#,
            row, cell
        );
        archive(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/worksheets/data.xml", &sheet),
        ])
    }

    #[test]
    fn test_rejects_out_of_range_columns() {
        for cell in ["ZZZZZZZ1", "AAAAAAAAAAAAAAAA1", "XFE1"] {
            let err = read_workbook(&single_cell_sheet("1", cell)).unwrap_err();
            assert!(matches!(err, WorkbookError::InvalidCell { .. }), "{}", cell);
        }
    }

    #[test]
    fn test_rejects_out_of_range_rows() {
        for row in ["1048577", "99999999999", "0"] {
            let err = read_workbook(&single_cell_sheet(row, "A1")).unwrap_err();
            assert!(matches!(err, WorkbookError::InvalidCell { .. }), "{}", row);
        }

        let workbook = read_workbook(&single_cell_sheet("2", "XFD2")).unwrap();
        assert_eq!(workbook.sheets[0].rows[1].len(), MAX_COLUMNS);
    }

    #[test]
    fn test_missing_workbook_part() {
        let data = archive(&[("docProps/app.xml", "<Properties/>")]);
        let err = read_workbook(&data).unwrap_err();
        assert!(matches!(err, WorkbookError::MissingPart(_)));
    }

    #[test]
    fn test_rejects_non_zip_input() {
        let err = read_workbook(b"course_name,trimester\n").unwrap_err();
        assert!(matches!(err, WorkbookError::Archive(_)));
    }
}
