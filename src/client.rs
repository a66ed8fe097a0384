//! Schedule Service Client
//!
//! Native counterpart of the browser upload form: posts a workbook and a
//! trimester to `POST /generate_schedule` and tells metrics apart from a
//! file response by content type.

use reqwest::{header, Client};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::api::error::ErrorResponse;
use crate::metrics::ScheduleMetrics;

/// Shown when the server gives no usable error message
pub const GENERIC_FAILURE: &str = "Failed to generate schedule!";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:5000`
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(600),
        }
    }
}

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Metrics(ScheduleMetrics),
    File { filename: String, bytes: Vec<u8> },
}

/// A downloaded output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid metrics response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct ScheduleClient {
    client: Client,
    config: ClientConfig,
}

impl ScheduleClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Upload a workbook from disk
    pub async fn submit(&self, path: &Path, trimester: u8) -> ClientResult<SubmitOutcome> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("input.xlsx")
            .to_string();
        self.submit_bytes(file_name, bytes, trimester).await
    }

    pub async fn submit_bytes(
        &self,
        file_name: String,
        bytes: Vec<u8>,
        trimester: u8,
    ) -> ClientResult<SubmitOutcome> {
        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name))
            .text("trimester", trimester.to_string());

        tracing::debug!(trimester, url = %self.url("/generate_schedule"), "Submitting workbook");

        let response = self
            .client
            .post(self.url("/generate_schedule"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = header_text(&response, header::CONTENT_TYPE);
        let disposition = header_text(&response, header::CONTENT_DISPOSITION);
        let body = response.bytes().await?.to_vec();

        classify_response(status, content_type.as_deref(), disposition.as_deref(), body)
    }

    pub async fn download_json(&self, trimester: u8) -> ClientResult<DownloadedFile> {
        self.download("/download_json", trimester, "timetable.json").await
    }

    pub async fn download_excel(&self, trimester: u8) -> ClientResult<DownloadedFile> {
        self.download("/download_excel", trimester, "timetable.xlsx").await
    }

    pub async fn download_csv(&self, trimester: u8) -> ClientResult<DownloadedFile> {
        self.download("/download_csv", trimester, "timetable.csv").await
    }

    async fn download(&self, path: &str, trimester: u8, fallback: &str) -> ClientResult<DownloadedFile> {
        let response = self
            .client
            .get(self.url(path))
            .query(&[("trimester", trimester)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let disposition = header_text(&response, header::CONTENT_DISPOSITION);
        let bytes = response.bytes().await?.to_vec();

        if !(200..300).contains(&status) {
            return Err(server_error(status, &bytes));
        }

        Ok(DownloadedFile {
            filename: local_filename(disposition.as_deref(), fallback),
            bytes,
        })
    }
}

fn header_text(response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Turn a `/generate_schedule` response into metrics, a file, or an error.
///
/// JSON bodies are metrics; anything else is a file named after the
/// `Content-Disposition` header.
pub fn classify_response(
    status: u16,
    content_type: Option<&str>,
    disposition: Option<&str>,
    body: Vec<u8>,
) -> ClientResult<SubmitOutcome> {
    if !(200..300).contains(&status) {
        return Err(server_error(status, &body));
    }

    let is_json = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);

    if is_json {
        return Ok(SubmitOutcome::Metrics(serde_json::from_slice(&body)?));
    }

    Ok(SubmitOutcome::File {
        filename: local_filename(disposition, "timetable"),
        bytes: body,
    })
}

fn server_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    ClientError::Server { status, message }
}

/// Filename from a `Content-Disposition` header, preferring `filename*`
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                if let Some(encoded) = value.trim().splitn(3, '\'').nth(2) {
                    if let Ok(decoded) = urlencoding::decode(encoded) {
                        return Some(decoded.into_owned());
                    }
                }
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }
    plain.filter(|f| !f.is_empty())
}

/// Final path component of a server-supplied name, or `fallback`.
///
/// Directory parts and absolute prefixes are dropped so the name can be
/// joined onto a local directory.
pub fn safe_filename(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Local file name for a response with the given `Content-Disposition`
pub fn local_filename(disposition: Option<&str>, fallback: &str) -> String {
    disposition
        .and_then(filename_from_disposition)
        .map(|name| safe_filename(&name, fallback))
        .unwrap_or_else(|| fallback.to_string())
}
