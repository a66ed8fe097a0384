use super::ExportResult;
use crate::model::{Timetable, TimetableEntry};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Pretty JSON object keyed by group, each list sorted by day then time
pub fn timetable_json(timetable: &Timetable) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(&timetable.by_group())?)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimetableDocument {
    Grouped(BTreeMap<String, Vec<TimetableEntry>>),
    Flat(Vec<TimetableEntry>),
}

/// Accepts the grouped layout written by [`timetable_json`] or a flat list
pub fn parse_timetable_json(trimester: u8, data: &[u8]) -> ExportResult<Timetable> {
    let timetable = match serde_json::from_slice::<TimetableDocument>(data)? {
        TimetableDocument::Grouped(grouped) => Timetable::from_grouped(trimester, grouped),
        TimetableDocument::Flat(entries) => Timetable::new(trimester, entries),
    };
    Ok(timetable)
}
