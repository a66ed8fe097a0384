//! Toast Notification Component
//!
//! Non-blocking notices for downloads and checks. Generation failures
//! still use `window.alert`.

use leptos::*;

use crate::state::global::GlobalState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
        }
    }

    pub fn bg_class(&self) -> &'static str {
        match self {
            ToastKind::Success => "bg-green-600",
            ToastKind::Error => "bg-red-600",
        }
    }
}

#[component]
pub fn Toast() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    view! {
        <div class="fixed bottom-20 right-4 z-50 space-y-2">
            {move || state.success.get().map(|msg| view! {
                <ToastMessage message=msg kind=ToastKind::Success />
            })}
            {move || state.error.get().map(|msg| view! {
                <ToastMessage message=msg kind=ToastKind::Error />
            })}
        </div>
    }
}

#[component]
fn ToastMessage(#[prop(into)] message: String, kind: ToastKind) -> impl IntoView {
    view! {
        <div class=format!(
            "flex items-center space-x-3 {} text-white px-4 py-3 rounded-lg shadow-lg animate-slide-in",
            kind.bg_class()
        )>
            <span class="text-lg">{kind.icon()}</span>
            <span class="text-sm font-medium">{message}</span>
        </div>
    }
}
