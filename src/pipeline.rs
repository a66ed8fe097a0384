//! Generation Pipeline
//!
//! Workbook bytes in, timetable files and metrics out: load the dataset,
//! derive the trimester's session requests, run the genetic search and
//! write the exports.

use crate::config::Config;
use crate::dataset::{Dataset, DatasetError};
use crate::export::{write_outputs, ExportError, OutputPaths, RunLog};
use crate::metrics::ScheduleMetrics;
use crate::model::{Calendar, Timetable};
use crate::solver::{GenerationReport, GeneticSolver, Problem, SolverError};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid trimester '{0}': expected 1, 2 or 3")]
    InvalidTrimester(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Parse an academic trimester (1..=3)
pub fn parse_trimester(raw: &str) -> PipelineResult<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|t| (1..=3).contains(t))
        .ok_or_else(|| PipelineError::InvalidTrimester(raw.to_string()))
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub metrics: ScheduleMetrics,
    pub timetable: Timetable,
    pub paths: OutputPaths,
}

/// Run the whole pipeline on an uploaded workbook.
///
/// Blocking: call from a worker thread inside async code.
pub fn generate<F>(
    data: &[u8],
    trimester: u8,
    config: &Config,
    output_dir: &Path,
    progress: F,
) -> PipelineResult<GenerationOutput>
where
    F: FnMut(&GenerationReport),
{
    let started = Instant::now();

    let dataset = Dataset::from_xlsx(data, &config.dataset)?;
    let summary = dataset.summary();
    tracing::info!(
        trimester,
        groups = summary.groups,
        rooms = summary.rooms,
        courses = summary.courses,
        "Loaded input workbook"
    );

    let sessions = dataset.session_requests(trimester, &config.calendar);
    let calendar = Calendar::new(&config.calendar);
    let problem = Problem::new(trimester, sessions, &dataset.rooms, &calendar)?;

    let solver = GeneticSolver::new(&problem, config.solver.clone())?;
    let outcome = solver.run_with_progress(progress);
    let timetable = problem.to_timetable(&outcome.best.genes);

    let elapsed = started.elapsed().as_secs_f64();
    let metrics = ScheduleMetrics::from_outcome(&outcome, elapsed);

    let mut run_log = RunLog::new(trimester, &config.solver);
    run_log.generations_run = outcome.generations;
    run_log.sessions = problem.len();
    run_log.best_penalty = outcome.evaluation.penalty;
    run_log.fitness_score = metrics.fitness_score;
    run_log.conflicts = metrics.conflicts;
    run_log.stopped_early = outcome.stopped_early;
    run_log.elapsed_secs = metrics.time;

    let paths = write_outputs(output_dir, &timetable, &outcome.history, &run_log)?;

    Ok(GenerationOutput {
        metrics,
        timetable,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_workbook;
    use crate::workbook::write_workbook;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.solver.population_size = 10;
        config.solver.generations = 10;
        config
    }

    #[test]
    fn test_parse_trimester() {
        assert_eq!(parse_trimester(" 2 ").unwrap(), 2);
        assert!(matches!(parse_trimester("4"), Err(PipelineError::InvalidTrimester(_))));
        assert!(parse_trimester("one").is_err());
    }

    #[test]
    fn test_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_workbook(&sample_workbook()).unwrap();

        let mut generations = 0;
        let output = generate(&data, 1, &fast_config(), dir.path(), |_| generations += 1).unwrap();

        assert_eq!(output.timetable.len(), 7);
        assert_eq!(output.metrics.sessions, 7);
        assert_eq!(output.metrics.conflicts, 0);
        assert_eq!(output.metrics.generations, generations);
        assert!(output.paths.json.exists());
        assert!(output.paths.excel.exists());

        let pe: Vec<_> = output
            .timetable
            .entries
            .iter()
            .filter(|e| e.course == "Physical Education")
            .collect();
        assert!(pe.iter().all(|e| e.room == "Gym"));
    }

    #[test]
    fn test_generate_rejects_non_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(b"not a workbook", 1, &fast_config(), dir.path(), |_| {}).unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(DatasetError::Workbook(_))));
    }

    #[test]
    fn test_generate_empty_trimester() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_workbook(&sample_workbook()).unwrap();

        let err = generate(&data, 3, &fast_config(), dir.path(), |_| {}).unwrap_err();
        assert!(matches!(err, PipelineError::Solver(SolverError::NoSessions(3))));
    }
}
