//! Timetable Domain Model
//!
//! Days and hours of the teaching week, session requests and the solved
//! timetable shared by the solver, exporters and checker.

pub mod grid;
pub mod session;
pub mod timetable;

pub use grid::{format_hour, parse_hour, Calendar, Day};
pub use session::{is_physical_education, SessionKind, SessionRequest};
pub use timetable::{Timetable, TimetableEntry, GYM_ROOM};
