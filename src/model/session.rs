//! Weekly session requests derived from groups and their curriculum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a teaching session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Lecture,
    Practice,
    Lab,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [SessionKind::Lecture, SessionKind::Practice, SessionKind::Lab];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Lecture => "Lecture",
            SessionKind::Practice => "Practice",
            SessionKind::Lab => "Lab",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecture" | "lec" => Ok(SessionKind::Lecture),
            "practice" | "prac" | "seminar" => Ok(SessionKind::Practice),
            "lab" | "laboratory" => Ok(SessionKind::Lab),
            other => Err(format!("unknown session type: {}", other)),
        }
    }
}

/// One weekly occurrence of a course session for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub group: String,
    pub programme: String,
    pub study_year: u32,
    pub course_code: String,
    pub course_name: String,
    pub kind: SessionKind,
    pub headcount: u32,
}

impl SessionRequest {
    /// Physical education always runs in the gym
    pub fn is_physical_education(&self) -> bool {
        is_physical_education(&self.course_name)
    }
}

pub fn is_physical_education(course_name: &str) -> bool {
    let name = course_name.trim().to_ascii_lowercase();
    name == "pe" || name.contains("physical education")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_aliases() {
        assert_eq!("lec".parse::<SessionKind>().unwrap(), SessionKind::Lecture);
        assert_eq!("Laboratory".parse::<SessionKind>().unwrap(), SessionKind::Lab);
        assert!("workshop".parse::<SessionKind>().is_err());
    }

    #[test]
    fn test_physical_education_detection() {
        assert!(is_physical_education("Physical Education 2"));
        assert!(is_physical_education("PE"));
        assert!(!is_physical_education("Peripheral Devices"));
    }
}
