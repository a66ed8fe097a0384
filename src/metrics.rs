//! Schedule metrics reported after a generation run.

use crate::solver::{round2, Evaluation, SolveOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary returned by `POST /generate_schedule`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Headline score, 0..=100
    #[serde(rename = "fitnessScore")]
    pub fitness_score: f64,
    /// Room plus group double bookings
    pub conflicts: usize,
    /// Percentage of sessions free of hard violations
    pub hard: f64,
    /// Percentage left after soft violations
    pub soft: f64,
    /// Wall-clock seconds, two decimals
    pub time: f64,
    /// Best penalty per generation
    #[serde(default)]
    pub fitness_progress: Vec<f64>,
    #[serde(default)]
    pub generations: usize,
    #[serde(default)]
    pub sessions: usize,
    #[serde(default)]
    pub stopped_early: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<Downloads>,
}

/// Relative URLs of the generated files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downloads {
    pub json: String,
    pub excel: String,
    pub csv: String,
}

impl Downloads {
    pub fn for_trimester(trimester: u8) -> Self {
        Self {
            json: format!("/download_json?trimester={}", trimester),
            excel: format!("/download_excel?trimester={}", trimester),
            csv: format!("/download_csv?trimester={}", trimester),
        }
    }
}

impl ScheduleMetrics {
    pub fn from_evaluation(evaluation: &Evaluation, history: Vec<f64>, elapsed_secs: f64) -> Self {
        Self {
            fitness_score: evaluation.fitness_score(),
            conflicts: evaluation.conflicts(),
            hard: evaluation.hard_score(),
            soft: evaluation.soft_score(),
            time: round2(elapsed_secs),
            generations: history.len(),
            fitness_progress: history,
            sessions: evaluation.sessions,
            stopped_early: false,
            downloads: None,
        }
    }

    pub fn from_outcome(outcome: &SolveOutcome, elapsed_secs: f64) -> Self {
        Self {
            stopped_early: outcome.stopped_early,
            ..Self::from_evaluation(&outcome.evaluation, outcome.history.clone(), elapsed_secs)
        }
    }

    pub fn band(&self) -> FitnessBand {
        FitnessBand::from_score(self.fitness_score)
    }
}

/// Qualitative reading of a fitness score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl FitnessBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 98.0 {
            FitnessBand::Excellent
        } else if score >= 90.0 {
            FitnessBand::Good
        } else if score >= 75.0 {
            FitnessBand::Average
        } else {
            FitnessBand::Poor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FitnessBand::Excellent => {
                "Excellent schedule! Very high fitness, near-perfect constraint satisfaction."
            }
            FitnessBand::Good => "Good schedule. Minor issues may exist.",
            FitnessBand::Average => "Average schedule. Consider revising input.",
            FitnessBand::Poor => "Poor schedule! Many conflicts detected.",
        }
    }
}

impl fmt::Display for FitnessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
