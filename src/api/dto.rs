//! Request and response types for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::checker::CheckReport;

/// Query string of the download routes
#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    /// Kept as text so a bad value yields our own 400 body
    pub trimester: Option<String>,
}

/// Body of `POST /check`
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Trimester used for curriculum coverage, when known
    pub trimester: Option<u8>,
    pub sessions: usize,
    pub clean: bool,
    #[serde(flatten)]
    pub report: CheckReport,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// healthy or degraded
    pub status: String,
    /// ok, or error when the output directory cannot be created
    pub output_dir: String,
    pub websocket_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
