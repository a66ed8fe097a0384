//! Reads groups, rooms and curriculum sheets out of an input workbook.

use super::error::{DatasetError, DatasetResult};
use super::types::{course_slug, Course, Group, Room};
use super::Dataset;
use crate::config::DatasetConfig;
use crate::workbook::{Cell, Record, Sheet, Workbook};
use regex::Regex;
use std::sync::OnceLock;

const GROUPS_SHEET: &str = "Groups";
const ROOMS_SHEET: &str = "Rooms";

/// Sheets that are never curricula
const CORE_SHEETS: [&str; 5] = ["groups", "rooms", "timeslots", "departments", "instructors"];

const LECTURE_COLUMNS: [&str; 4] = ["lecture_slots", "lecture", "lecture_hours", "lec_hours"];
const PRACTICE_COLUMNS: [&str; 4] = ["practice_slots", "practice", "practice_hours", "prac_hours"];
const LAB_COLUMNS: [&str; 5] = ["lab_slots", "lab", "lab_hours", "laboratory", "laboratory_hours"];

fn group_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*([^-\s]+)\s*-\s*(\d{2})").expect("valid group pattern"))
}

/// Split `IT-2205` into programme `IT` and admission year 2022
pub fn parse_group_code(code: &str) -> Option<(String, i32)> {
    let caps = group_code_pattern().captures(code)?;
    let programme = caps.get(1)?.as_str().trim().to_uppercase();
    let yy: i32 = caps.get(2)?.as_str().parse().ok()?;
    Some((programme, 2000 + yy))
}

pub(super) fn load(workbook: &Workbook, config: &DatasetConfig) -> DatasetResult<Dataset> {
    let groups = load_groups(required_sheet(workbook, GROUPS_SHEET)?, config)?;
    let rooms = load_rooms(required_sheet(workbook, ROOMS_SHEET)?, config)?;

    let curriculum: Vec<&Sheet> = workbook
        .sheets
        .iter()
        .filter(|s| !CORE_SHEETS.contains(&s.name.trim().to_lowercase().as_str()))
        .filter(|s| s.has_column("course_name"))
        .collect();

    if curriculum.is_empty() {
        return Err(DatasetError::NoCurriculum);
    }

    let mut courses = Vec::new();
    for sheet in curriculum {
        let loaded = load_curriculum(sheet, config);
        tracing::debug!(programme = %sheet.name.trim(), courses = loaded.len(), "Loaded curriculum sheet");
        courses.extend(loaded);
    }

    Ok(Dataset {
        groups,
        rooms,
        courses,
    })
}

fn required_sheet<'a>(workbook: &'a Workbook, name: &str) -> DatasetResult<&'a Sheet> {
    workbook
        .sheet(name)
        .ok_or_else(|| DatasetError::MissingSheet(name.to_string()))
}

fn load_groups(sheet: &Sheet, config: &DatasetConfig) -> DatasetResult<Vec<Group>> {
    let header = sheet.header();
    if !header.iter().any(|h| h.contains("group")) {
        return Err(DatasetError::MissingColumn {
            sheet: sheet.name.clone(),
            column: "group_code".to_string(),
        });
    }

    let mut groups = Vec::new();
    for record in sheet.records() {
        let Some(code) = group_code(&record) else {
            continue;
        };

        let (prefix, admission_year) =
            parse_group_code(&code).ok_or_else(|| DatasetError::InvalidGroupCode {
                row: record.row,
                code: code.clone(),
            })?;

        let programme = record
            .text(&["programme_code", "program_code", "ep"])
            .map(|p| p.to_uppercase())
            .unwrap_or(prefix);

        let headcount = record
            .get(&["headcount", "students", "size"])
            .and_then(Cell::as_u32)
            .filter(|n| *n > 0)
            .unwrap_or(config.default_headcount);

        groups.push(Group {
            code,
            programme,
            admission_year,
            headcount,
        });
    }

    Ok(groups)
}

fn group_code(record: &Record) -> Option<String> {
    record
        .text(&["group_code"])
        .or_else(|| record.find_containing("group").and_then(Cell::as_text))
}

fn load_rooms(sheet: &Sheet, config: &DatasetConfig) -> DatasetResult<Vec<Room>> {
    let header = sheet.header();
    if !header.iter().any(|h| h == "room_code" || h == "room") {
        return Err(DatasetError::MissingColumn {
            sheet: sheet.name.clone(),
            column: "room_code".to_string(),
        });
    }

    let rooms = sheet
        .records()
        .into_iter()
        .filter(|r| r.get(&["available"]).and_then(Cell::as_bool).unwrap_or(true))
        .filter_map(|r| {
            let code = r.text(&["room_code", "room"])?;
            if config.excluded_rooms.iter().any(|x| x.trim() == code) {
                return None;
            }
            Some(Room {
                code,
                capacity: r.get(&["capacity"]).and_then(Cell::as_u32),
            })
        })
        .collect();

    Ok(rooms)
}

fn load_curriculum(sheet: &Sheet, config: &DatasetConfig) -> Vec<Course> {
    let programme = sheet.name.trim().to_uppercase();
    let excluded: Vec<String> = config
        .excluded_courses
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    sheet
        .records()
        .into_iter()
        .filter_map(|r| {
            let name = r.text(&["course_name"])?;
            let lowered = name.to_lowercase();
            if excluded.iter().any(|x| lowered.contains(x.as_str())) {
                return None;
            }

            let trimester = r
                .get(&["trimester"])
                .or_else(|| r.find_containing("trimester"))
                .and_then(Cell::as_u32)
                .filter(|t| *t > 0)?;

            let slots = |aliases: &[&str]| r.get(aliases).and_then(Cell::as_u32).unwrap_or(0);
            let course = Course {
                programme: programme.clone(),
                code: r.text(&["course_code"]).unwrap_or_else(|| course_slug(&name)),
                trimester,
                lecture_slots: slots(&LECTURE_COLUMNS),
                practice_slots: slots(&PRACTICE_COLUMNS),
                lab_slots: slots(&LAB_COLUMNS),
                name,
            };

            (course.total_slots() > 0).then_some(course)
        })
        .collect()
}
