//! Success Emoji
//!
//! Wiggles once per clean check.

use leptos::*;

/// Length of the wiggle: two 800 ms iterations
const WIGGLE_MS: u32 = 1600;

#[component]
pub fn SuccessEmoji(
    /// Bumped by the page on every clean result
    #[prop(into)]
    trigger: Signal<u32>,
) -> impl IntoView {
    let wiggling = create_rw_signal(false);

    create_effect(move |_| {
        if trigger.get() == 0 {
            return;
        }
        wiggling.set(true);
        gloo_timers::callback::Timeout::new(WIGGLE_MS, move || wiggling.set(false)).forget();
    });

    view! {
        <span
            class="success-emoji text-5xl inline-block"
            class:wiggle=move || wiggling.get()
        >
            "🎉"
        </span>
    }
}
