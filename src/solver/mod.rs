//! Timetable Solver
//!
//! Genetic search over session placements.
//!
//! ## Encoding
//!
//! A [`Chromosome`] holds one [`Placement`] (day, hour, room) per session
//! request, in the fixed order of [`Problem::sessions`]. Every gene stays
//! within the session's [`Candidates`]: the study year's days and hours and
//! the rooms large enough for the group. Physical education only ever
//! uses the gym.
//!
//! ## Search
//!
//! Greedy conflict-avoiding seeding, then generations of elitism,
//! tournament selection, one-point crossover and single-gene mutation,
//! scored by [`evaluate`]. Runs are deterministic for a given seed.

mod chromosome;
mod engine;
mod error;
mod fitness;
mod problem;

pub use chromosome::{Chromosome, Placement};
pub use engine::{GenerationReport, GeneticSolver, SolveOutcome};
pub use error::{SolverError, SolverResult};
pub use fitness::{evaluate, Evaluation};
pub use problem::{Candidates, Problem, RoomSlot};

pub(crate) use fitness::round2;
