//! Navigation Component
//!
//! Header bar with a checkbox-driven mobile menu.

use leptos::*;
use leptos_router::*;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};

/// Smooth-scroll to an element id; false when it is not on the page
fn scroll_to(id: &str) -> bool {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    else {
        return false;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    element.scroll_into_view_with_scroll_into_view_options(&options);
    true
}

#[component]
pub fn Nav() -> impl IntoView {
    let menu_open = create_rw_signal(false);
    let pathname = use_location().pathname;

    let close_menu = move |_| menu_open.set(false);

    // Already on the generate page: scroll instead of navigating
    let on_generate = move |ev: ev::MouseEvent| {
        if pathname.get_untracked() == "/" && scroll_to("main-content") {
            ev.prevent_default();
        }
        menu_open.set(false);
    };

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    <A href="/" class="flex items-center space-x-3">
                        <span class="text-2xl">"🗓️"</span>
                        <span class="text-xl font-bold text-white">"Timetabler"</span>
                    </A>

                    <label for="menu-toggle" class="md:hidden cursor-pointer text-2xl">"☰"</label>
                    <input
                        id="menu-toggle"
                        type="checkbox"
                        class="hidden peer"
                        prop:checked=move || menu_open.get()
                        on:change=move |ev| menu_open.set(event_target_checked(&ev))
                    />

                    <div class=move || {
                        if menu_open.get() {
                            "absolute top-16 left-0 right-0 bg-gray-800 flex flex-col p-4 md:static md:flex-row md:p-0 md:space-x-1"
                        } else {
                            "hidden md:flex items-center space-x-1"
                        }
                    }>
                        <a
                            href="/"
                            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
                            on:click=on_generate
                        >
                            "Generate Schedule"
                        </a>
                        <a
                            href="/check"
                            class=move || {
                                if pathname.get() == "/check" {
                                    "px-4 py-2 rounded-lg bg-gray-700 text-white"
                                } else {
                                    "px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
                                }
                            }
                            on:click=close_menu
                        >
                            "Check Timetable"
                        </a>
                    </div>
                </div>
            </div>
        </nav>
    }
}
