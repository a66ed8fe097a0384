//! Generate Page
//!
//! Upload form, live progress, metrics and the monitoring charts.

use leptos::*;

use crate::components::{FitnessTrend, MetricsPanel, ProgressBanner, SystemCharts, UploadPanel};

#[component]
pub fn Generate() -> impl IntoView {
    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Timetable Generator"</h1>
                <p class="text-gray-400 mt-1">
                    "Upload the GA input workbook and pick a trimester."
                </p>
            </div>

            <section id="main-content" class="space-y-6">
                <UploadPanel />
                <ProgressBanner />
                <MetricsPanel />
            </section>

            <FitnessTrend />
            <SystemCharts />
        </div>
    }
}
