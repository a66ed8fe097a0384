//! Global Application State
//!
//! Reactive state shared by both pages. Nothing here outlives the tab.

use leptos::*;

use super::series::SeriesWindow;
use crate::api::ScheduleMetrics;

/// Latest generation reported over the WebSocket
#[derive(Clone, Debug, PartialEq)]
pub struct LiveProgress {
    pub trimester: u8,
    pub generation: usize,
    pub best_penalty: f64,
    pub conflicts: usize,
}

#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Metrics of the last successful generation
    pub metrics: RwSignal<Option<ScheduleMetrics>>,
    /// Trimester the metrics belong to, for the download buttons
    pub trimester: RwSignal<u8>,
    pub fitness_series: RwSignal<SeriesWindow>,
    pub cpu_series: RwSignal<SeriesWindow>,
    pub ram_series: RwSignal<SeriesWindow>,
    pub memory_series: RwSignal<SeriesWindow>,
    pub progress: RwSignal<Option<LiveProgress>>,
    pub ws_connected: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub success: RwSignal<Option<String>>,
}

pub fn provide_global_state() {
    let state = GlobalState {
        metrics: create_rw_signal(None),
        trimester: create_rw_signal(1),
        fitness_series: create_rw_signal(SeriesWindow::default()),
        cpu_series: create_rw_signal(SeriesWindow::default()),
        ram_series: create_rw_signal(SeriesWindow::default()),
        memory_series: create_rw_signal(SeriesWindow::default()),
        progress: create_rw_signal(None),
        ws_connected: create_rw_signal(false),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Record a finished generation and push its score to the fitness chart
    pub fn record_metrics(&self, trimester: u8, metrics: ScheduleMetrics) {
        self.update_fitness_trend(metrics.fitness_score);
        self.trimester.set(trimester);
        self.progress.set(None);
        self.metrics.set(Some(metrics));
    }

    pub fn update_fitness_trend(&self, score: f64) {
        let label = chrono::Local::now().format("%H:%M:%S").to_string();
        self.fitness_series.update(|s| s.push(label, score));
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}

/// Blocking browser alert
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
