//! Solved timetable and its per-group views.

use super::grid::{hhmm, Day};
use super::session::SessionKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the room that hosts physical education
pub const GYM_ROOM: &str = "Gym";

/// One placed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub group: String,
    pub course: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub day: Day,
    #[serde(with = "hhmm")]
    pub time: u8,
    pub room: String,
}

impl TimetableEntry {
    pub fn is_in_gym(&self) -> bool {
        self.room.eq_ignore_ascii_case(GYM_ROOM)
    }
}

/// Timetable for one academic trimester
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    pub trimester: u8,
    pub entries: Vec<TimetableEntry>,
}

impl Timetable {
    pub fn new(trimester: u8, entries: Vec<TimetableEntry>) -> Self {
        Self { trimester, entries }
    }

    /// Build from the grouped JSON layout
    pub fn from_grouped(trimester: u8, grouped: BTreeMap<String, Vec<TimetableEntry>>) -> Self {
        let entries = grouped.into_values().flatten().collect();
        Self { trimester, entries }
    }

    /// Entries per group, each list sorted by day then time
    pub fn by_group(&self) -> BTreeMap<String, Vec<TimetableEntry>> {
        let mut grouped: BTreeMap<String, Vec<TimetableEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped.entry(entry.group.clone()).or_default().push(entry.clone());
        }
        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| {
                (a.day, a.time, &a.course).cmp(&(b.day, b.time, &b.course))
            });
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
