//! Timetable Exports
//!
//! Writes a solved timetable and its run artefacts to the output directory:
//!
//! | File                  | Content                                   |
//! |-----------------------|-------------------------------------------|
//! | `timetable_T{n}.json` | sessions grouped by group                 |
//! | `timetable_T{n}.xlsx` | one sheet per group                       |
//! | `timetable_T{n}.csv`  | flat session list                         |
//! | `fitness_T{n}.csv`    | best penalty per generation               |
//! | `run_log_T{n}.json`   | run metadata                              |

mod excel;
mod json;
mod tabular;

pub use excel::{timetable_workbook, timetable_xlsx};
pub use json::{parse_timetable_json, timetable_json};
pub use tabular::{fitness_csv, timetable_csv};

use crate::config::SolverConfig;
use crate::model::Timetable;
use crate::workbook::WorkbookError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output file kinds served for download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Json,
    Excel,
    Csv,
}

impl OutputKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputKind::Json => "application/json",
            OutputKind::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OutputKind::Csv => "text/csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::Json => "JSON",
            OutputKind::Excel => "Excel",
            OutputKind::Csv => "CSV",
        }
    }
}

/// Files produced for one trimester
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub excel: PathBuf,
    pub csv: PathBuf,
    pub fitness: PathBuf,
    pub run_log: PathBuf,
}

impl OutputPaths {
    pub fn for_trimester(dir: &Path, trimester: u8) -> Self {
        Self {
            json: dir.join(format!("timetable_T{}.json", trimester)),
            excel: dir.join(format!("timetable_T{}.xlsx", trimester)),
            csv: dir.join(format!("timetable_T{}.csv", trimester)),
            fitness: dir.join(format!("fitness_T{}.csv", trimester)),
            run_log: dir.join(format!("run_log_T{}.json", trimester)),
        }
    }

    pub fn get(&self, kind: OutputKind) -> &Path {
        match kind {
            OutputKind::Json => &self.json,
            OutputKind::Excel => &self.excel,
            OutputKind::Csv => &self.csv,
        }
    }
}

/// Metadata recorded next to every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub timestamp: DateTime<Utc>,
    pub trimester: u8,
    pub population_size: usize,
    pub generations: usize,
    pub generations_run: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    pub seed: u64,
    pub sessions: usize,
    pub best_penalty: f64,
    pub fitness_score: f64,
    pub conflicts: usize,
    pub stopped_early: bool,
    pub elapsed_secs: f64,
}

impl RunLog {
    pub fn new(trimester: u8, config: &SolverConfig) -> Self {
        Self {
            timestamp: Utc::now(),
            trimester,
            population_size: config.population_size,
            generations: config.generations,
            generations_run: 0,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
            tournament_size: config.tournament_size,
            seed: config.seed,
            sessions: 0,
            best_penalty: 0.0,
            fitness_score: 0.0,
            conflicts: 0,
            stopped_early: false,
            elapsed_secs: 0.0,
        }
    }
}

/// Write every artefact for a run, creating the directory if needed
pub fn write_outputs(
    dir: &Path,
    timetable: &Timetable,
    history: &[f64],
    run_log: &RunLog,
) -> ExportResult<OutputPaths> {
    std::fs::create_dir_all(dir)?;
    let paths = OutputPaths::for_trimester(dir, timetable.trimester);

    std::fs::write(&paths.json, timetable_json(timetable)?)?;
    std::fs::write(&paths.excel, timetable_xlsx(timetable)?)?;
    std::fs::write(&paths.csv, timetable_csv(timetable)?)?;
    std::fs::write(&paths.fitness, fitness_csv(history)?)?;
    std::fs::write(&paths.run_log, serde_json::to_vec_pretty(run_log)?)?;

    tracing::info!(
        dir = %dir.display(),
        trimester = timetable.trimester,
        sessions = timetable.len(),
        "Wrote timetable outputs"
    );

    Ok(paths)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{Day, SessionKind, Timetable, TimetableEntry};

    pub fn entry(group: &str, course: &str, kind: SessionKind, day: Day, time: u8, room: &str) -> TimetableEntry {
        TimetableEntry {
            group: group.to_string(),
            course: course.to_string(),
            kind,
            day,
            time,
            room: room.to_string(),
        }
    }

    pub fn sample_timetable() -> Timetable {
        Timetable::new(
            1,
            vec![
                entry("IT-2401", "Programming", SessionKind::Practice, Day::Tue, 9, "101"),
                entry("IT-2401", "Programming", SessionKind::Lecture, Day::Mon, 8, "101"),
                entry("IT-2401", "Physical Education", SessionKind::Practice, Day::Mon, 10, "Gym"),
                entry("IT-2201", "Distributed Systems", SessionKind::Lecture, Day::Mon, 8, "102"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::for_trimester(Path::new("/tmp/out"), 2);
        assert_eq!(paths.json, PathBuf::from("/tmp/out/timetable_T2.json"));
        assert_eq!(paths.get(OutputKind::Excel), Path::new("/tmp/out/timetable_T2.xlsx"));
        assert_eq!(paths.fitness, PathBuf::from("/tmp/out/fitness_T2.csv"));
    }

    #[test]
    fn test_write_outputs_creates_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let timetable = fixtures::sample_timetable();
        let log = RunLog::new(1, &SolverConfig::default());

        let paths = write_outputs(&out, &timetable, &[120.0, 40.0], &log).unwrap();

        for path in [&paths.json, &paths.excel, &paths.csv, &paths.fitness, &paths.run_log] {
            assert!(path.exists(), "{} missing", path.display());
        }
        let saved: RunLog = serde_json::from_slice(&std::fs::read(&paths.run_log).unwrap()).unwrap();
        assert_eq!(saved.seed, 42);
    }
}
