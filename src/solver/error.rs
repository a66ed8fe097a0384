//! Solver error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Nothing to schedule for the requested trimester
    #[error("No sessions to schedule for trimester {0}")]
    NoSessions(u8),

    /// Sessions exist but no room can host them
    #[error("No rooms available for non-gym sessions")]
    NoRooms,

    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

pub type SolverResult<T> = Result<T, SolverError>;
