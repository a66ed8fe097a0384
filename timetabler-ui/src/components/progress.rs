//! Live generation progress fed by the WebSocket stream.

use leptos::*;

use crate::state::global::GlobalState;

#[component]
pub fn ProgressBanner() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        {move || state.progress.get().map(|p| view! {
            <div class="bg-gray-800 border border-primary-600 rounded-lg px-4 py-3 flex items-center gap-4 text-sm">
                <div class="loading-spinner w-4 h-4" />
                <span>{format!("Trimester {}", p.trimester)}</span>
                <span>{format!("Generation {}", p.generation)}</span>
                <span>{format!("Best penalty {}", p.best_penalty)}</span>
                <span class="text-gray-400">{format!("{} conflicts", p.conflicts)}</span>
            </div>
        })}
    }
}
