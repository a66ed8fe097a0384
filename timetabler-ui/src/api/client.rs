//! HTTP Client
//!
//! Requests to the schedule service. All paths are relative to the page
//! origin, which also serves the UI.

use gloo_net::http::{Request, Response};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, File, FormData, HtmlElement, Url};

use super::types::{CheckResponse, ErrorResponse, ScheduleMetrics};

/// Shown when a failed response carries no readable message
pub const GENERIC_FAILURE: &str = "Failed to generate schedule!";

/// What `POST /generate_schedule` answered
#[derive(Debug)]
pub enum GenerateResponse {
    Metrics(ScheduleMetrics),
    /// Non-JSON body, saved as a download
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// WebSocket URL of the progress stream on the current origin
pub fn ws_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let scheme = match location.protocol().ok()?.as_str() {
        "https:" => "wss",
        _ => "ws",
    };
    Some(format!("{}://{}/ws", scheme, location.host().ok()?))
}

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// POST /generate_schedule with multipart `file` and `trimester`
pub async fn generate_schedule(file: &File, trimester: u8) -> Result<GenerateResponse, String> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(js_error)?;
    form.append_with_str("trimester", &trimester.to_string())
        .map_err(js_error)?;

    let response = Request::post("/generate_schedule")
        .body(form)
        .map_err(|e| format!("Request error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    let content_type = response.headers().get("content-type").unwrap_or_default();
    if is_json(&content_type) {
        let metrics = response
            .json::<ScheduleMetrics>()
            .await
            .map_err(|e| format!("Parse error: {}", e))?;
        return Ok(GenerateResponse::Metrics(metrics));
    }

    let filename = response
        .headers()
        .get("content-disposition")
        .and_then(|d| filename_from_disposition(&d))
        .unwrap_or_else(|| "timetable".to_string());
    let bytes = response
        .binary()
        .await
        .map_err(|e| format!("Read error: {}", e))?;

    Ok(GenerateResponse::File {
        filename,
        content_type,
        bytes,
    })
}

/// GET a generated file (`/download_json`, `/download_excel`) and save it
pub async fn download(path: &str, trimester: u8, fallback_name: &str) -> Result<(), String> {
    let response = Request::get(&format!("{}?trimester={}", path, trimester))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    let headers = response.headers();
    let filename = headers
        .get("content-disposition")
        .and_then(|d| filename_from_disposition(&d))
        .unwrap_or_else(|| fallback_name.to_string());
    let content_type = headers.get("content-type").unwrap_or_default();
    let bytes = response
        .binary()
        .await
        .map_err(|e| format!("Read error: {}", e))?;

    save_bytes(&filename, &content_type, &bytes)
}

/// POST /check with a timetable JSON and optionally the input workbook
pub async fn check_timetable(
    timetable: &File,
    ga_input: Option<&File>,
    trimester: Option<u8>,
) -> Result<CheckResponse, String> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("timetable", timetable, &timetable.name())
        .map_err(js_error)?;
    if let Some(input) = ga_input {
        form.append_with_blob_and_filename("ga_input", input, &input.name())
            .map_err(js_error)?;
    }
    if let Some(t) = trimester {
        form.append_with_str("trimester", &t.to_string())
            .map_err(js_error)?;
    }

    let response = Request::post("/check")
        .body(form)
        .map_err(|e| format!("Request error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json::<CheckResponse>()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}

async fn error_message(response: Response) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// How long an object URL outlives the click that downloads it
pub const REVOKE_DELAY_MS: u32 = 10_000;

fn object_url(content_type: &str, bytes: &[u8]) -> Result<String, String> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    Url::create_object_url_with_blob(&blob).map_err(js_error)
}

/// Revoke once the browser has had time to start the download
fn revoke_later(url: String) {
    gloo_timers::callback::Timeout::new(REVOKE_DELAY_MS, move || {
        let _ = Url::revoke_object_url(&url);
    })
    .forget();
}

/// Hand bytes to the browser as a download through an object URL
pub fn save_bytes(filename: &str, content_type: &str, bytes: &[u8]) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let url = object_url(content_type, bytes)?;
    let anchor = document.create_element("a").map_err(js_error)?;
    let _ = anchor.set_attribute("href", &url);
    let _ = anchor.set_attribute("download", filename);
    if let Some(el) = anchor.dyn_ref::<HtmlElement>() {
        el.click();
    }
    revoke_later(url);
    Ok(())
}

pub fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|t| t.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
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


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_object_url_still_readable_after_download_starts() {
        let url = object_url("application/json", b"{}").unwrap();
        revoke_later(url.clone());

        let window = web_sys::window().unwrap();
        let response = JsFuture::from(window.fetch_with_str(&url)).await.unwrap();
        let response: web_sys::Response = response.dyn_into().unwrap();
        assert!(response.ok());
    }

    #[wasm_bindgen_test]
    fn test_save_bytes_in_browser() {
        assert!(save_bytes("timetable_T1.json", "application/json", b"{}").is_ok());
    }
}
