//! Schedule Checker
//!
//! Audits a finished timetable: double-booked rooms (the gym excepted),
//! double-booked groups and, given the input dataset, courses whose
//! scheduled hours fall short of the curriculum.

use crate::config::CalendarConfig;
use crate::dataset::{curriculum_trimester, parse_group_code, Dataset};
use crate::model::{format_hour, Day, SessionKind, Timetable};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Room,
    Group,
}

/// Two or more sessions sharing a room or a group at the same hour
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub day: Day,
    pub time: String,
    /// Room code or group code
    pub entity: String,
    /// `group: course` pairs, `; ` separated
    pub details: String,
}

/// A course/type whose scheduled hours fall short of the curriculum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub group: String,
    pub programme: String,
    pub trimester: u32,
    pub course: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub required: u32,
    pub actual: u32,
    pub missing: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckReport {
    pub conflicts: Vec<Conflict>,
    pub violations: Vec<Violation>,
    /// Whether curriculum coverage was checked
    pub coverage_checked: bool,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.violations.is_empty()
    }
}

/// Trimester encoded as `T<n>` in a timetable file name
pub fn trimester_from_filename(name: &str) -> Option<u8> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"T(\d+)").expect("valid trimester pattern"));
    pattern
        .captures(name)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
        .filter(|t| (1..=3).contains(t))
}

/// Room and group double bookings, ordered by kind, day, time and entity
pub fn find_conflicts(timetable: &Timetable) -> Vec<Conflict> {
    type SlotKey = (ConflictKind, Day, u8, String);
    let mut usage: BTreeMap<SlotKey, Vec<(String, String)>> = BTreeMap::new();

    for entry in &timetable.entries {
        let occupant = (entry.group.clone(), entry.course.clone());
        if !entry.is_in_gym() {
            usage
                .entry((ConflictKind::Room, entry.day, entry.time, entry.room.trim().to_string()))
                .or_default()
                .push(occupant.clone());
        }
        usage
            .entry((ConflictKind::Group, entry.day, entry.time, entry.group.clone()))
            .or_default()
            .push(occupant);
    }

    usage
        .into_iter()
        .filter(|(_, occupants)| occupants.len() > 1)
        .map(|((kind, day, time, entity), occupants)| Conflict {
            kind,
            day,
            time: format_hour(time),
            entity,
            details: occupants
                .iter()
                .map(|(group, course)| format!("{}: {}", group, course))
                .collect::<Vec<_>>()
                .join("; "),
        })
        .collect()
}

/// Curriculum slots not covered by the weekly timetable.
///
/// Scheduled hours are weekly sessions times `weeks_per_trimester`.
pub fn find_violations(
    timetable: &Timetable,
    dataset: &Dataset,
    trimester: u8,
    calendar: &CalendarConfig,
) -> Vec<Violation> {
    let mut actual: HashMap<(String, String, SessionKind), u32> = HashMap::new();
    for entry in &timetable.entries {
        *actual
            .entry((entry.group.clone(), entry.course.trim().to_lowercase(), entry.kind))
            .or_default() += calendar.weeks_per_trimester;
    }

    let mut violations = Vec::new();
    for group_code in timetable.by_group().into_keys() {
        let (programme, study_year) = match dataset.group(&group_code) {
            Some(group) => (
                group.programme.clone(),
                group.study_year(calendar.academic_year, calendar.max_study_year),
            ),
            None => match parse_group_code(&group_code) {
                Some((programme, admission_year)) => {
                    let year = (calendar.academic_year - admission_year + 1)
                        .clamp(1, calendar.max_study_year.max(1) as i32);
                    (programme, year as u32)
                }
                None => continue,
            },
        };

        let target = curriculum_trimester(study_year, trimester);
        for course in dataset.courses_for(&programme, target) {
            for kind in SessionKind::ALL {
                let required = course.slots(kind);
                if required == 0 {
                    continue;
                }
                let key = (group_code.clone(), course.name.trim().to_lowercase(), kind);
                let scheduled = actual.get(&key).copied().unwrap_or(0);
                if scheduled < required {
                    violations.push(Violation {
                        group: group_code.clone(),
                        programme: programme.clone(),
                        trimester: target,
                        course: course.name.clone(),
                        kind,
                        required,
                        actual: scheduled,
                        missing: required - scheduled,
                    });
                }
            }
        }
    }

    violations
}

/// Conflicts, plus coverage when a dataset and trimester are known
pub fn check(
    timetable: &Timetable,
    dataset: Option<&Dataset>,
    trimester: Option<u8>,
    calendar: &CalendarConfig,
) -> CheckReport {
    let conflicts = find_conflicts(timetable);
    let (violations, coverage_checked) = match (dataset, trimester) {
        (Some(dataset), Some(trimester)) => (find_violations(timetable, dataset, trimester, calendar), true),
        _ => (Vec::new(), false),
    };

    tracing::info!(
        sessions = timetable.len(),
        conflicts = conflicts.len(),
        violations = violations.len(),
        coverage_checked,
        "Checked timetable"
    );

    CheckReport {
        conflicts,
        violations,
        coverage_checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use crate::dataset::fixtures::sample_workbook;
    use crate::export::fixtures::{entry, sample_timetable};

    #[test]
    fn test_trimester_from_filename() {
        assert_eq!(trimester_from_filename("timetable_T2.json"), Some(2));
        assert_eq!(trimester_from_filename("Schedule_Trimester_3.json"), None);
        assert_eq!(trimester_from_filename("timetable_T7.json"), None);
    }

    #[test]
    fn test_gym_is_shared_but_rooms_are_not() {
        let mut timetable = sample_timetable();
        timetable.entries.push(entry("IT-2201", "Physical Education", SessionKind::Practice, Day::Mon, 10, "gym"));
        timetable.entries.push(entry("CS-2401", "Maths", SessionKind::Lecture, Day::Mon, 8, "101"));

        let conflicts = find_conflicts(&timetable);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Room);
        assert_eq!(conflicts[0].entity, "101");
        assert_eq!(conflicts[0].time, "08:00");
        assert_eq!(conflicts[0].details, "IT-2401: Programming; CS-2401: Maths");
    }

    #[test]
    fn test_group_conflict() {
        let mut timetable = sample_timetable();
        timetable.entries.push(entry("IT-2201", "Networks", SessionKind::Lab, Day::Mon, 8, "103"));

        let conflicts = find_conflicts(&timetable);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Group);
        assert_eq!(conflicts[0].entity, "IT-2201");
    }

    #[test]
    fn test_coverage_violations() {
        let dataset = Dataset::from_workbook(&sample_workbook(), &DatasetConfig::default()).unwrap();
        let report = check(&sample_timetable(), Some(&dataset), Some(1), &CalendarConfig::default());

        assert!(report.coverage_checked);
        assert!(report.conflicts.is_empty());

        let missing: Vec<(String, SessionKind, u32)> = report
            .violations
            .iter()
            .map(|v| (v.group.clone(), v.kind, v.missing))
            .collect();
        // No labs for Distributed Systems, one lecture of two for Programming
        assert_eq!(
            missing,
            vec![
                ("IT-2201".to_string(), SessionKind::Lab, 15),
                ("IT-2401".to_string(), SessionKind::Lecture, 10),
            ]
        );
    }

    #[test]
    fn test_without_dataset_only_conflicts() {
        let report = check(&sample_timetable(), None, Some(1), &CalendarConfig::default());
        assert!(!report.coverage_checked);
        assert!(report.is_clean());
    }
}
