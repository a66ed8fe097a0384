//! Upload Component
//!
//! Drop zone, trimester radios and the generate button.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, File, FileList, HtmlInputElement};

use crate::api::{self, GenerateResponse};
use crate::state::global::{alert, GlobalState};
use crate::state::upload::{SelectedFile, UploadForm};

fn selected_files(list: Option<FileList>) -> Vec<SelectedFile<File>> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|file| SelectedFile {
            name: file.name(),
            size: file.size(),
            handle: file,
        })
        .collect()
}

#[component]
pub fn UploadPanel() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let form = create_rw_signal(UploadForm::<File>::default());
    let input_ref = create_node_ref::<html::Input>();

    let on_pick = move |ev: ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        let file = selected_files(input.files()).into_iter().next();
        form.update(|f| f.select(file));
    };

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        form.update(|f| f.drag_over());
    };

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        form.update(|f| f.drag_leave());
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        let files = selected_files(ev.data_transfer().and_then(|dt| dt.files()));
        form.update(|f| f.drop_files(files));
    };

    let open_picker = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let request = match form.try_update(|f| f.begin_submit()) {
            Some(Ok(request)) => request,
            Some(Err(message)) => {
                alert(message);
                return;
            }
            None => return,
        };

        spawn_local(async move {
            let result = api::generate_schedule(&request.file, request.trimester).await;
            let Some(result) = form.try_update(|f| f.finish(result)) else {
                return;
            };

            match result {
                Ok(GenerateResponse::Metrics(metrics)) => {
                    state.record_metrics(request.trimester, metrics);
                    state.show_success("Schedule generated");
                }
                Ok(GenerateResponse::File {
                    filename,
                    content_type,
                    bytes,
                }) => {
                    if let Err(e) = api::save_bytes(&filename, &content_type, &bytes) {
                        alert(&format!("Error: {}", e));
                    }
                }
                Err(message) => alert(&message),
            }
        });
    };

    view! {
        <form class="bg-gray-800 rounded-xl p-6 space-y-6" on:submit=on_submit>
            <div
                class=move || {
                    if form.with(|f| f.is_highlighted()) {
                        "border-2 border-dashed border-primary-400 bg-gray-700 rounded-xl p-10 text-center cursor-pointer"
                    } else {
                        "border-2 border-dashed border-gray-600 rounded-xl p-10 text-center cursor-pointer"
                    }
                }
                on:click=open_picker
                on:dragover=on_drag_over
                on:dragleave=on_drag_leave
                on:drop=on_drop
            >
                <div class="text-4xl mb-2">"📂"</div>
                <p class="text-gray-300">"Drop your GA Input Excel file here or click to browse"</p>
                <p class="mt-2 text-primary-400 font-medium">
                    {move || form.with(|f| f.display_name())}
                </p>
            </div>
            <input
                type="file"
                accept=".xlsx"
                class="hidden"
                node_ref=input_ref
                on:change=on_pick
            />

            <fieldset class="flex items-center gap-6">
                <legend class="text-sm text-gray-400 mb-2">"Trimester"</legend>
                {[1u8, 2, 3]
                    .into_iter()
                    .map(|t| view! {
                        <label class="flex items-center gap-2">
                            <input
                                type="radio"
                                name="trimester"
                                value=t.to_string()
                                prop:checked=move || form.with(|f| f.trimester() == t)
                                on:change=move |_| form.update(|f| f.set_trimester(t))
                            />
                            {format!("Trimester {}", t)}
                        </label>
                    })
                    .collect_view()}
            </fieldset>

            <button
                type="submit"
                class="w-full flex items-center justify-center gap-2 px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                disabled=move || form.with(|f| f.is_submitting())
            >
                {move || form.with(|f| f.is_submitting()).then(|| view! {
                    <span class="loading-spinner w-4 h-4" />
                })}
                {move || form.with(|f| f.button_label())}
            </button>
        </form>
    }
}

/// Single-file picker used by the check page
#[component]
pub fn FilePicker(
    label: &'static str,
    accept: &'static str,
    file: RwSignal<Option<File>>,
) -> impl IntoView {
    let on_change = move |ev: ev::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok());
        let picked = input
            .and_then(|i| i.files())
            .and_then(|list| list.get(0));
        file.set(picked);
    };

    view! {
        <label class="block space-y-2">
            <span class="text-sm text-gray-400">{label}</span>
            <input
                type="file"
                accept=accept
                class="block w-full text-sm text-gray-300"
                on:change=on_change
            />
        </label>
    }
}
