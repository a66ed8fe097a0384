//! Wire types of the schedule service.

use serde::Deserialize;

/// Body of a successful `POST /generate_schedule`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScheduleMetrics {
    #[serde(rename = "fitnessScore")]
    pub fitness_score: f64,
    pub conflicts: u32,
    pub hard: f64,
    pub soft: f64,
    pub time: f64,
    #[serde(default)]
    pub fitness_progress: Vec<f64>,
    #[serde(default)]
    pub generations: usize,
    #[serde(default)]
    pub stopped_early: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Conflict {
    pub kind: String,
    pub day: String,
    pub time: String,
    pub entity: String,
    pub details: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Violation {
    pub group: String,
    pub course: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: u32,
    pub actual: u32,
    pub missing: u32,
}

/// Body of `POST /check`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckResponse {
    pub trimester: Option<u8>,
    pub sessions: usize,
    pub clean: bool,
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub violations: Vec<Violation>,
    #[serde(default)]
    pub coverage_checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_server_json() {
        let json = r#"{"fitnessScore": 96.0, "conflicts": 0, "hard": 100.0, "soft": 80.0, "time": 3.21,
                       "fitness_progress": [50.0, 16.0], "generations": 2, "sessions": 7,
                       "stopped_early": false, "downloads": {"json": "/download_json?trimester=1"}}"#;
        let metrics: ScheduleMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.fitness_score, 96.0);
        assert_eq!(metrics.fitness_progress.len(), 2);
    }

    #[test]
    fn test_check_response() {
        let json = r#"{"trimester": 1, "sessions": 4, "clean": false, "coverage_checked": true,
                       "conflicts": [{"kind": "room", "day": "Mon", "time": "08:00", "entity": "101",
                                      "details": "IT-2401: Programming; CS-2401: Maths"}],
                       "violations": []}"#;
        let report: CheckResponse = serde_json::from_str(json).unwrap();
        assert_eq!(report.conflicts[0].entity, "101");
        assert!(report.violations.is_empty());
    }
}
