//! # Timetabler
//!
//! University timetable generation: upload a curriculum workbook, get back
//! a weekly timetable for every student group, found by a genetic search
//! over day, hour and room assignments.
//!
//! ## Modules
//!
//! - [`workbook`]: Minimal `.xlsx` reader and writer
//! - [`dataset`]: Groups, rooms and curricula loaded from the input workbook
//! - [`model`]: Week grid, session requests and timetables
//! - [`solver`]: Constraint penalties and the genetic algorithm
//! - [`export`]: JSON, Excel and CSV output files
//! - [`checker`]: Conflict and curriculum coverage audit of a timetable
//! - [`pipeline`]: Workbook in, timetable and metrics out
//! - [`api`]: HTTP server with Axum
//! - [`websocket`]: Live generation progress
//! - [`client`]: HTTP client for the schedule service
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use timetabler::config::Config;
//! use timetabler::pipeline;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let data = std::fs::read("GA_Input.xlsx")?;
//!
//!     let output = pipeline::generate(&data, 1, &config, Path::new("outputs"), |report| {
//!         println!("generation {}: penalty {}", report.generation, report.best_penalty);
//!     })?;
//!
//!     println!("fitness {}%, {} conflicts", output.metrics.fitness_score, output.metrics.conflicts);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod checker;
pub mod client;
pub mod config;
pub mod dataset;
pub mod export;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod solver;
pub mod websocket;
pub mod workbook;

pub use api::{build_router, serve, ApiError, AppState};

pub use checker::{check, CheckReport, Conflict, ConflictKind, Violation};

pub use client::{ClientConfig, ClientError, ScheduleClient, SubmitOutcome};

pub use config::{Config, ConfigError, LoggingConfig, SolverConfig};

pub use dataset::{Dataset, DatasetError};

pub use export::{ExportError, OutputKind, OutputPaths};

pub use metrics::{FitnessBand, ScheduleMetrics};

pub use model::{Day, SessionKind, Timetable, TimetableEntry};

pub use pipeline::{generate, GenerationOutput, PipelineError};

pub use solver::{GeneticSolver, Problem, SolveOutcome, SolverError};

pub use websocket::{ConnectionHub, HubConfig, ServerMessage};

pub use workbook::{Workbook, WorkbookError};
