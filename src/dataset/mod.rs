//! Input Dataset
//!
//! The scheduling input: student groups, rooms and per-programme curricula,
//! loaded from the `Groups`, `Rooms` and curriculum sheets of a workbook,
//! and the weekly session requests derived from them for one trimester.

mod error;
mod loader;
mod types;

pub use error::{DatasetError, DatasetResult};
pub use loader::parse_group_code;
pub use types::{course_slug, curriculum_trimester, Course, DatasetSummary, Group, Room};

use crate::config::{CalendarConfig, DatasetConfig};
use crate::model::{SessionKind, SessionRequest};
use crate::workbook::{read_workbook, Workbook};
use std::collections::BTreeSet;

/// Everything read from one input workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub groups: Vec<Group>,
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
}

impl Dataset {
    pub fn from_workbook(workbook: &Workbook, config: &DatasetConfig) -> DatasetResult<Self> {
        loader::load(workbook, config)
    }

    /// Parse raw `.xlsx` bytes
    pub fn from_xlsx(data: &[u8], config: &DatasetConfig) -> DatasetResult<Self> {
        let workbook = read_workbook(data)?;
        Self::from_workbook(&workbook, config)
    }

    pub fn summary(&self) -> DatasetSummary {
        let programmes: BTreeSet<String> = self.courses.iter().map(|c| c.programme.clone()).collect();
        DatasetSummary {
            courses: self.courses.len(),
            groups: self.groups.len(),
            rooms: self.rooms.len(),
            programmes: programmes.into_iter().collect(),
        }
    }

    pub fn group(&self, code: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.code == code)
    }

    /// Curriculum rows of a programme in an absolute trimester
    pub fn courses_for<'a>(&'a self, programme: &'a str, trimester: u32) -> impl Iterator<Item = &'a Course> + 'a {
        self.courses
            .iter()
            .filter(move |c| c.programme == programme && c.trimester == trimester)
    }

    /// Weekly session requests for an academic trimester (1..=3).
    ///
    /// Curriculum slot counts are per trimester; each kind with slots yields
    /// `ceil(slots / weeks_per_trimester)` weekly sessions.
    pub fn session_requests(&self, trimester: u8, calendar: &CalendarConfig) -> Vec<SessionRequest> {
        let weeks = calendar.weeks_per_trimester.max(1);
        let mut requests = Vec::new();

        for group in &self.groups {
            let study_year = group.study_year(calendar.academic_year, calendar.max_study_year);
            let target = curriculum_trimester(study_year, trimester);
            let mut group_sessions = 0;

            for course in self.courses_for(&group.programme, target) {
                for kind in SessionKind::ALL {
                    let weekly = course.slots(kind).div_ceil(weeks);
                    for _ in 0..weekly {
                        requests.push(SessionRequest {
                            group: group.code.clone(),
                            programme: group.programme.clone(),
                            study_year,
                            course_code: course.code.clone(),
                            course_name: course.name.clone(),
                            kind,
                            headcount: group.headcount,
                        });
                        group_sessions += 1;
                    }
                }
            }

            tracing::debug!(
                group = %group.code,
                study_year,
                curriculum_trimester = target,
                sessions = group_sessions,
                "Built session requests"
            );
        }

        requests
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{write_workbook, Sheet};

    fn sample() -> Dataset {
        Dataset::from_workbook(&fixtures::sample_workbook(), &DatasetConfig::default()).unwrap()
    }

    #[test]
    fn test_loads_core_sheets() {
        let dataset = sample();

        assert_eq!(dataset.groups.len(), 2);
        assert_eq!(dataset.groups[0].programme, "IT");
        assert_eq!(dataset.groups[0].headcount, 20);
        assert_eq!(dataset.groups[1].headcount, 25);
        assert_eq!(dataset.groups[1].admission_year, 2022);

        let rooms: Vec<&str> = dataset.rooms.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(rooms, vec!["101", "102", "Gym"]);

        // The elective row has no trimester and is dropped
        assert_eq!(dataset.courses.len(), 3);
        assert_eq!(dataset.courses[0].code, "PROGRAMMING");
        assert_eq!(dataset.summary().programmes, vec!["IT".to_string()]);
    }

    #[test]
    fn test_exclusions_apply() {
        let config = DatasetConfig {
            excluded_rooms: vec!["102".to_string()],
            excluded_courses: vec!["physical".to_string()],
            ..DatasetConfig::default()
        };
        let dataset = Dataset::from_workbook(&fixtures::sample_workbook(), &config).unwrap();

        assert!(dataset.rooms.iter().all(|r| r.code != "102"));
        assert!(dataset.courses.iter().all(|c| !c.name.contains("Physical")));
    }

    #[test]
    fn test_session_requests_follow_study_year() {
        let dataset = sample();
        let requests = dataset.session_requests(1, &CalendarConfig::default());

        // IT-2401 is first year (trimester 1): Programming 2 lectures + 1 practice, PE 1 practice
        let first_year: Vec<_> = requests.iter().filter(|r| r.group == "IT-2401").collect();
        assert_eq!(first_year.len(), 4);
        assert!(first_year.iter().all(|r| r.study_year == 1));

        // IT-2201 is third year (trimester 7): 1 lecture + ceil(15 / 10) labs
        let third_year: Vec<_> = requests.iter().filter(|r| r.group == "IT-2201").collect();
        assert_eq!(third_year.len(), 3);
        assert_eq!(
            third_year.iter().filter(|r| r.kind == SessionKind::Lab).count(),
            2
        );
    }

    #[test]
    fn test_missing_rooms_sheet() {
        let mut workbook = fixtures::sample_workbook();
        workbook.sheets.retain(|s| s.name != "Rooms");

        let err = Dataset::from_workbook(&workbook, &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingSheet(ref s) if s == "Rooms"));
    }

    #[test]
    fn test_invalid_group_code() {
        let mut workbook = fixtures::sample_workbook();
        workbook.sheets[0].push_row(["BROKEN"]);

        let err = Dataset::from_workbook(&workbook, &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidGroupCode { row: 4, .. }));
    }

    #[test]
    fn test_no_curriculum() {
        let mut workbook = fixtures::sample_workbook();
        workbook.sheets.retain(|s| s.name != "IT");
        workbook.sheets.push(Sheet::new("Notes"));

        let err = Dataset::from_workbook(&workbook, &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::NoCurriculum));
    }

    #[test]
    fn test_from_xlsx_bytes() {
        let bytes = write_workbook(&fixtures::sample_workbook()).unwrap();
        let dataset = Dataset::from_xlsx(&bytes, &DatasetConfig::default()).unwrap();
        assert_eq!(dataset, sample());
    }
}
