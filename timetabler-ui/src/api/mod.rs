//! Schedule service client for the browser.

mod client;
mod types;

pub use client::*;
pub use types::*;
