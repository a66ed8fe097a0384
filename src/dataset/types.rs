//! Input records: groups, rooms and curriculum courses.

use crate::model::SessionKind;
use serde::Serialize;

/// A student group such as `IT-2205`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub code: String,
    pub programme: String,
    pub admission_year: i32,
    pub headcount: u32,
}

impl Group {
    /// 1-based year of study, clamped to `1..=max_year`
    pub fn study_year(&self, academic_year: i32, max_year: u32) -> u32 {
        let year = academic_year - self.admission_year + 1;
        year.clamp(1, max_year.max(1) as i32) as u32
    }
}

/// A teaching room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub code: String,
    pub capacity: Option<u32>,
}

/// A curriculum row: one course of one programme in one absolute trimester
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub programme: String,
    pub code: String,
    pub name: String,
    /// Absolute trimester of the programme, 1..=9 for a three-year degree
    pub trimester: u32,
    pub lecture_slots: u32,
    pub practice_slots: u32,
    pub lab_slots: u32,
}

impl Course {
    /// Total slots per trimester for a session kind
    pub fn slots(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.lecture_slots,
            SessionKind::Practice => self.practice_slots,
            SessionKind::Lab => self.lab_slots,
        }
    }

    pub fn total_slots(&self) -> u32 {
        self.lecture_slots + self.practice_slots + self.lab_slots
    }
}

/// Counts reported by `validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub courses: usize,
    pub groups: usize,
    pub rooms: usize,
    pub programmes: Vec<String>,
}

/// Curriculum trimester for an academic trimester (1..=3) in a study year
pub fn curriculum_trimester(study_year: u32, trimester: u8) -> u32 {
    (study_year.max(1) - 1) * 3 + trimester as u32
}

/// Upper-case slug used when a course has no explicit code
pub fn course_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_underscore = true;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_uppercase());
            last_underscore = false;
        } else if !last_underscore {
            slug.push('_');
            last_underscore = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_year_clamped() {
        let group = Group {
            code: "IT-2205".to_string(),
            programme: "IT".to_string(),
            admission_year: 2022,
            headcount: 25,
        };

        assert_eq!(group.study_year(2024, 3), 3);
        assert_eq!(group.study_year(2022, 3), 1);
        assert_eq!(group.study_year(2030, 3), 3);
        assert_eq!(group.study_year(2020, 3), 1);
    }

    #[test]
    fn test_curriculum_trimester() {
        assert_eq!(curriculum_trimester(1, 1), 1);
        assert_eq!(curriculum_trimester(2, 3), 6);
        assert_eq!(curriculum_trimester(3, 2), 8);
    }

    #[test]
    fn test_course_slug() {
        assert_eq!(course_slug("Intro to Programming (I)"), "INTRO_TO_PROGRAMMING_I");
        assert_eq!(course_slug("  Physics  "), "PHYSICS");
    }
}
