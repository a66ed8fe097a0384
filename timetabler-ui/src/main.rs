//! Timetabler UI
//!
//! Browser front end of the timetable generator, built with Leptos (WASM).
//!
//! - Upload the GA input workbook and generate a trimester's timetable
//! - Download the JSON and Excel results
//! - Watch generation progress over the WebSocket
//! - Check an exported timetable for conflicts
//!
//! Client-side rendered; served by the API server from the same origin.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(|| view! { <app::App /> });
}
