//! Teaching week grid: days, hourly start times and per-study-year rules.

use crate::config::CalendarConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Teaching day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.get(..3).unwrap_or(lower.as_str()) {
            "mon" => Day::Mon,
            "tue" => Day::Tue,
            "wed" => Day::Wed,
            "thu" => Day::Thu,
            "fri" => Day::Fri,
            "sat" => Day::Sat,
            _ => return Err(format!("unknown day: {}", s)),
        };
        Ok(day)
    }
}

/// Format a start hour as `HH:00`
pub fn format_hour(hour: u8) -> String {
    format!("{:02}:00", hour)
}

/// Parse `HH:MM` (or a bare hour) into the start hour
pub fn parse_hour(s: &str) -> Option<u8> {
    let s = s.trim();
    let hour = s.split(':').next()?;
    hour.parse().ok().filter(|h| *h < 24)
}

/// Serde adapter storing an hour as `"HH:00"`
pub mod hhmm {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hour: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hour(*hour))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hour(&s).ok_or_else(|| de::Error::custom(format!("invalid time: {}", s)))
    }
}

/// Study-year aware view of the week
#[derive(Debug, Clone)]
pub struct Calendar {
    days: Vec<Day>,
    first_hour: u8,
    last_hour: u8,
    first_year_last_hour: u8,
    excluded: Vec<(u32, Vec<Day>)>,
}

impl Calendar {
    pub fn new(config: &CalendarConfig) -> Self {
        let mut days = config.days.clone();
        days.sort();
        days.dedup();

        Self {
            days,
            first_hour: config.first_hour,
            last_hour: config.last_hour.max(config.first_hour),
            first_year_last_hour: config.first_year_last_hour,
            excluded: config
                .year_excluded_days
                .iter()
                .map(|y| (y.year, y.days.clone()))
                .collect(),
        }
    }

    /// Every teaching day
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Every start hour in the grid
    pub fn hours(&self) -> Vec<u8> {
        (self.first_hour..=self.last_hour).collect()
    }

    pub fn allowed_days(&self, study_year: u32) -> Vec<Day> {
        let excluded: Vec<Day> = self
            .excluded
            .iter()
            .filter(|(year, _)| *year == study_year)
            .flat_map(|(_, days)| days.iter().copied())
            .collect();

        self.days
            .iter()
            .copied()
            .filter(|d| !excluded.contains(d))
            .collect()
    }

    pub fn allowed_hours(&self, study_year: u32) -> Vec<u8> {
        let last = if study_year == 1 {
            self.first_year_last_hour.min(self.last_hour)
        } else {
            self.last_hour
        };
        (self.first_hour..=last).collect()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(&CalendarConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parsing() {
        assert_eq!("Mon".parse::<Day>().unwrap(), Day::Mon);
        assert_eq!("thursday".parse::<Day>().unwrap(), Day::Thu);
        assert!("Sun".parse::<Day>().is_err());
    }

    #[test]
    fn test_hour_formatting() {
        assert_eq!(format_hour(8), "08:00");
        assert_eq!(parse_hour("13:00"), Some(13));
        assert_eq!(parse_hour("9"), Some(9));
        assert_eq!(parse_hour("noon"), None);
    }

    #[test]
    fn test_year_rules() {
        let calendar = Calendar::default();

        assert_eq!(calendar.allowed_days(1).len(), 6);
        assert!(!calendar.allowed_days(2).contains(&Day::Sat));
        assert!(!calendar.allowed_days(3).contains(&Day::Thu));

        assert_eq!(calendar.allowed_hours(1), vec![8, 9, 10, 11, 12, 13]);
        assert_eq!(calendar.allowed_hours(2).len(), 12);
        assert_eq!(calendar.hours().last(), Some(&19));
    }
}
