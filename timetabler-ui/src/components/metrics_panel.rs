//! Metrics Panel
//!
//! Headline numbers of the last generation and download buttons.

use leptos::*;

use crate::api::{self, ScheduleMetrics};
use crate::state::global::GlobalState;
use crate::state::FitnessBand;

/// Display strings for the five headline values
pub fn metric_texts(metrics: &ScheduleMetrics) -> [(&'static str, String); 5] {
    [
        ("Fitness Score", format!("{}%", metrics.fitness_score)),
        ("Conflicts", metrics.conflicts.to_string()),
        ("Hard Constraints", format!("{}%", metrics.hard)),
        ("Soft Constraints", format!("{}%", metrics.soft)),
        ("Time", format!("{}s", metrics.time)),
    ]
}

#[component]
pub fn MetricsPanel() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        {move || state.metrics.get().map(|metrics| {
            let band = FitnessBand::from_score(metrics.fitness_score);
            view! {
                <section class="bg-gray-800 rounded-xl p-6 space-y-4">
                    <h2 class="text-xl font-semibold">"Schedule Metrics"</h2>
                    <div class="grid grid-cols-2 md:grid-cols-5 gap-4">
                        {metric_texts(&metrics)
                            .into_iter()
                            .map(|(label, value)| view! {
                                <div class="bg-gray-700 rounded-lg p-4">
                                    <div class="text-sm text-gray-400">{label}</div>
                                    <div class="text-2xl font-bold">{value}</div>
                                </div>
                            })
                            .collect_view()}
                    </div>
                    <p class=format!("font-medium {}", band.color_class())>
                        {format!("{} {}", band.title(), band.detail())}
                    </p>
                    {metrics.stopped_early.then(|| view! {
                        <p class="text-sm text-gray-400">
                            {format!("Converged after {} generations.", metrics.generations)}
                        </p>
                    })}
                    <DownloadButtons />
                </section>
            }
        })}
    }
}

#[component]
fn DownloadButtons() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (busy, set_busy) = create_signal(false);

    let fetch = move |path: &'static str, fallback: &'static str| {
        let trimester = state.trimester.get_untracked();
        set_busy.set(true);
        spawn_local(async move {
            if let Err(e) = api::download(path, trimester, fallback).await {
                state.show_error(&e);
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="flex flex-wrap gap-3">
            <button
                class="px-4 py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                disabled=move || busy.get()
                on:click=move |_| fetch("/download_json", "timetable.json")
            >
                "Download JSON"
            </button>
            <button
                class="px-4 py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                disabled=move || busy.get()
                on:click=move |_| fetch("/download_excel", "timetable.xlsx")
            >
                "Download Excel"
            </button>
        </div>
    }
}
