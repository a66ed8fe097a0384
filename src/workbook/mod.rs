//! Spreadsheet Workbooks
//!
//! In-memory model of an `.xlsx` workbook plus a reader and a writer for the
//! SpreadsheetML container format.
//!
//! Only what a timetable needs is modelled: sheet names, cell positions and
//! plain values (text, numbers, booleans). Styles, formulas and merged
//! cells are ignored on read and never written.

mod error;
mod reader;
mod writer;

pub use error::{WorkbookError, WorkbookResult};
pub use reader::read_workbook;
pub use writer::{sanitize_sheet_name, write_workbook};

use std::collections::HashMap;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form; whole numbers render without a fractional part
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Empty => None,
        }
    }

    /// Non-negative integer value, truncating fractions
    pub fn as_u32(&self) -> Option<u32> {
        self.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u32)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
            Cell::Empty => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Number(n as f64)
    }
}

/// A worksheet: name plus dense rows (gaps filled with `Cell::Empty`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, C>(&mut self, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Normalised header names from the first row
    pub fn header(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_text().unwrap_or_default().trim().to_lowercase())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header().iter().any(|h| h == name)
    }

    /// Data rows keyed by header; blank rows are skipped
    pub fn records(&self) -> Vec<Record> {
        let header = self.header();
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| row.iter().any(|c| !c.is_empty()))
            .map(|(index, row)| {
                let fields = header
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| !h.is_empty())
                    .map(|(col, h)| (h.clone(), row.get(col).cloned().unwrap_or_default()))
                    .collect();
                Record {
                    row: index + 1,
                    fields,
                }
            })
            .collect()
    }
}

/// One data row addressed by lower-cased header
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based row number in the sheet
    pub row: usize,
    fields: HashMap<String, Cell>,
}

impl Record {
    /// First non-empty value among the given column aliases
    pub fn get(&self, aliases: &[&str]) -> Option<&Cell> {
        aliases
            .iter()
            .filter_map(|a| self.fields.get(*a))
            .find(|c| !c.is_empty())
    }

    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        self.get(aliases).and_then(Cell::as_text)
    }

    /// First column whose header contains `fragment`
    pub fn find_containing(&self, fragment: &str) -> Option<&Cell> {
        let mut keys: Vec<&String> = self.fields.keys().filter(|k| k.contains(fragment)).collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|k| self.fields.get(k))
            .find(|c| !c.is_empty())
    }
}

/// An ordered collection of sheets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive sheet lookup
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(name))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Zero-based column index to letters (`0` -> `A`, `26` -> `AA`)
pub fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Columns in a sheet (`A`..=`XFD`)
pub const MAX_COLUMNS: usize = 16_384;

/// Rows in a sheet
pub const MAX_ROWS: usize = 1_048_576;

/// Split a cell reference (`C12`) into zero-based column and row.
///
/// References beyond `XFD1048576` are rejected.
pub fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut column = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
        if column > MAX_COLUMNS {
            return None;
        }
    }

    let row: usize = digits.parse().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    Some((column - 1, row - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("AB12"), Some((27, 11)));
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A0"), None);
    }

    #[test]
    fn test_parse_cell_ref_limits() {
        assert_eq!(parse_cell_ref("XFD1048576"), Some((16_383, 1_048_575)));
        assert_eq!(parse_cell_ref("XFE1"), None);
        assert_eq!(parse_cell_ref("ZZZZZZZ1"), None);
        assert_eq!(parse_cell_ref("AAAAAAAAAAAAAAAA1"), None);
        assert_eq!(parse_cell_ref("A1048577"), None);
        assert_eq!(parse_cell_ref("A99999999999999999999999"), None);
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::Number(3.0).as_text(), Some("3".to_string()));
        assert_eq!(Cell::Text(" 4 ".into()).as_u32(), Some(4));
        assert_eq!(Cell::Text("no".into()).as_bool(), Some(false));
        assert_eq!(Cell::Text("   ".into()).as_text(), None);
        assert!(Cell::Empty.is_empty());
    }

    #[test]
    fn test_records_use_header_aliases() {
        let mut sheet = Sheet::new("Rooms");
        sheet.push_row(["Room_Code", "Capacity"]);
        sheet.push_row(vec![Cell::from("101"), Cell::Number(30.0)]);
        sheet.push_row(vec![Cell::Empty, Cell::Empty]);
        sheet.push_row(vec![Cell::from("Gym")]);

        let records = sheet.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(&["room", "room_code"]), Some("101".to_string()));
        assert_eq!(records[0].get(&["capacity"]).and_then(Cell::as_u32), Some(30));
        assert_eq!(records[1].row, 4);
        assert!(records[1].get(&["capacity"]).is_none());
    }
}
