//! Check Page
//!
//! Audit an exported timetable for double bookings and, given the input
//! workbook, missing curriculum hours.

use leptos::*;
use web_sys::File;

use crate::api::{self, CheckResponse, Conflict, Violation};
use crate::components::{FilePicker, SuccessEmoji};
use crate::state::global::GlobalState;

/// Summary line above the tables
pub fn summary_text(report: &CheckResponse) -> String {
    let mut text = format!(
        "{} sessions, {} conflicts",
        report.sessions,
        report.conflicts.len()
    );
    if report.coverage_checked {
        text.push_str(&format!(", {} curriculum violations", report.violations.len()));
    }
    text
}

#[component]
pub fn Check() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let timetable = create_rw_signal::<Option<File>>(None);
    let ga_input = create_rw_signal::<Option<File>>(None);
    let trimester = create_rw_signal::<Option<u8>>(None);
    let report = create_rw_signal::<Option<CheckResponse>>(None);
    let checking = create_rw_signal(false);
    let clean_runs = create_rw_signal(0u32);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let Some(file) = timetable.get_untracked() else {
            state.show_error("Timetable file not provided");
            return;
        };
        let input = ga_input.get_untracked();
        let t = trimester.get_untracked();

        checking.set(true);
        spawn_local(async move {
            match api::check_timetable(&file, input.as_ref(), t).await {
                Ok(result) => {
                    if result.conflicts.is_empty() {
                        clean_runs.update(|n| *n += 1);
                    }
                    report.set(Some(result));
                }
                Err(e) => state.show_error(&e),
            }
            checking.set(false);
        });
    };

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Check Timetable"</h1>
                <p class="text-gray-400 mt-1">
                    "Find double-booked rooms and groups in a generated timetable."
                </p>
            </div>

            <form class="bg-gray-800 rounded-xl p-6 space-y-4" on:submit=on_submit>
                <FilePicker label="Timetable JSON" accept=".json" file=timetable />
                <FilePicker label="GA input workbook (optional)" accept=".xlsx" file=ga_input />
                <label class="block space-y-2">
                    <span class="text-sm text-gray-400">"Trimester"</span>
                    <select
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        on:change=move |ev| trimester.set(event_target_value(&ev).parse().ok())
                    >
                        <option value="">"From file name"</option>
                        <option value="1">"1"</option>
                        <option value="2">"2"</option>
                        <option value="3">"3"</option>
                    </select>
                </label>
                <button
                    type="submit"
                    class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                    disabled=move || checking.get()
                >
                    {move || if checking.get() { "Checking..." } else { "Check" }}
                </button>
            </form>

            {move || report.get().map(|r| view! {
                <section class="space-y-6">
                    <div class="flex items-center gap-4">
                        {r.conflicts.is_empty().then(|| view! { <SuccessEmoji trigger=clean_runs /> })}
                        <p class="text-lg">{summary_text(&r)}</p>
                    </div>
                    <ConflictTable conflicts=r.conflicts.clone() />
                    {r.coverage_checked.then(|| view! {
                        <ViolationTable violations=r.violations.clone() />
                    })}
                </section>
            })}
        </div>
    }
}

#[component]
fn ConflictTable(conflicts: Vec<Conflict>) -> impl IntoView {
    if conflicts.is_empty() {
        return view! { <p class="text-green-400">"No conflicts found."</p> }.into_view();
    }

    view! {
        <table class="w-full text-sm bg-gray-800 rounded-lg overflow-hidden">
            <thead class="bg-gray-700 text-left">
                <tr>
                    <th class="p-2">"Kind"</th>
                    <th class="p-2">"Day"</th>
                    <th class="p-2">"Time"</th>
                    <th class="p-2">"Room / Group"</th>
                    <th class="p-2">"Sessions"</th>
                </tr>
            </thead>
            <tbody>
                {conflicts
                    .into_iter()
                    .map(|c| view! {
                        <tr class="border-t border-gray-700">
                            <td class="p-2">{c.kind}</td>
                            <td class="p-2">{c.day}</td>
                            <td class="p-2">{c.time}</td>
                            <td class="p-2">{c.entity}</td>
                            <td class="p-2">{c.details}</td>
                        </tr>
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_view()
}

#[component]
fn ViolationTable(violations: Vec<Violation>) -> impl IntoView {
    if violations.is_empty() {
        return view! { <p class="text-green-400">"Curriculum fully covered."</p> }.into_view();
    }

    view! {
        <table class="w-full text-sm bg-gray-800 rounded-lg overflow-hidden">
            <thead class="bg-gray-700 text-left">
                <tr>
                    <th class="p-2">"Group"</th>
                    <th class="p-2">"Course"</th>
                    <th class="p-2">"Type"</th>
                    <th class="p-2">"Required"</th>
                    <th class="p-2">"Scheduled"</th>
                    <th class="p-2">"Missing"</th>
                </tr>
            </thead>
            <tbody>
                {violations
                    .into_iter()
                    .map(|v| view! {
                        <tr class="border-t border-gray-700">
                            <td class="p-2">{v.group}</td>
                            <td class="p-2">{v.course}</td>
                            <td class="p-2">{v.kind}</td>
                            <td class="p-2">{v.required}</td>
                            <td class="p-2">{v.actual}</td>
                            <td class="p-2 text-red-400">{v.missing}</td>
                        </tr>
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_view()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(conflicts: usize, coverage_checked: bool) -> CheckResponse {
        CheckResponse {
            trimester: Some(1),
            sessions: 4,
            clean: conflicts == 0,
            conflicts: (0..conflicts)
                .map(|_| Conflict {
                    kind: "room".to_string(),
                    day: "Mon".to_string(),
                    time: "08:00".to_string(),
                    entity: "101".to_string(),
                    details: "IT-2401: Programming; CS-2401: Maths".to_string(),
                })
                .collect(),
            violations: Vec::new(),
            coverage_checked,
        }
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(summary_text(&response(1, false)), "4 sessions, 1 conflicts");
        assert_eq!(
            summary_text(&response(0, true)),
            "4 sessions, 0 conflicts, 0 curriculum violations"
        );
    }
}
