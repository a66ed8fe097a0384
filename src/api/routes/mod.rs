//! API Routes
//!
//! Route handlers organized by functionality.

pub mod check;
pub mod download;
mod form;
pub mod generate;
pub mod health;
