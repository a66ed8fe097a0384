//! Chart Components
//!
//! Line charts drawn on a canvas. The three system charts are fed
//! simulated samples; the fitness chart only ever shows real scores.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::state::global::GlobalState;
use crate::state::series::SeriesWindow;
use crate::state::FitnessBand;

/// Interval between simulated system samples
pub const SAMPLE_INTERVAL_MS: u32 = 2000;

/// Single line chart over a sliding window
#[component]
pub fn LineChart(
    title: &'static str,
    series: RwSignal<SeriesWindow>,
    color: &'static str,
    /// Fixed top of the y axis; derived from the data when absent
    #[prop(optional)]
    y_max: Option<f64>,
) -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();

    create_effect(move |_| {
        let data = series.get();
        if let Some(canvas) = canvas_ref.get() {
            draw_series(&canvas, &data, color, y_max);
        }
    });

    view! {
        <div class="bg-gray-800 rounded-xl p-4">
            <h3 class="text-sm font-medium text-gray-300 mb-2">{title}</h3>
            <canvas node_ref=canvas_ref width="400" height="200" class="w-full h-40 rounded-lg" />
        </div>
    }
}

/// CPU, RAM and memory load charts with simulated data
#[component]
pub fn SystemCharts() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let interval = gloo_timers::callback::Interval::new(SAMPLE_INTERVAL_MS, move || {
        let label = chrono::Local::now().format("%H:%M:%S").to_string();
        state.cpu_series.update(|s| s.push(label.clone(), js_sys::Math::random() * 100.0));
        state.ram_series.update(|s| s.push(label.clone(), js_sys::Math::random() * 50.0));
        state.memory_series.update(|s| s.push(label, 80.0 + js_sys::Math::random() * 20.0));
    });
    on_cleanup(move || drop(interval));

    view! {
        <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
            <LineChart title="CPU Load" series=state.cpu_series color="#2196F3" y_max=100.0 />
            <LineChart title="RAM Load" series=state.ram_series color="#9C27B0" y_max=100.0 />
            <LineChart title="Memory Load" series=state.memory_series color="#00BCD4" y_max=100.0 />
        </div>
    }
}

/// Fitness score trend with its interpretation
#[component]
pub fn FitnessTrend() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let band = create_memo(move |_| state.fitness_series.get().last().map(FitnessBand::from_score));

    view! {
        <div class="space-y-2">
            <LineChart title="Fitness Score Trend" series=state.fitness_series color="#4CAF50" y_max=100.0 />
            <p class=move || {
                band.get()
                    .map(|b| format!("text-sm {}", b.color_class()))
                    .unwrap_or_else(|| "text-sm text-gray-400".to_string())
            }>
                {move || match band.get() {
                    Some(b) => format!("{} {}", b.title(), b.detail()),
                    None => "Generate a schedule to see its fitness.".to_string(),
                }}
            </p>
        </div>
    }
}

fn draw_series(canvas: &HtmlCanvasElement, series: &SeriesWindow, color: &str, y_max: Option<f64>) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    let margin_left = 40.0;
    let margin_right = 10.0;
    let margin_top = 10.0;
    let margin_bottom = 30.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&"#1f2937".into());
    ctx.fill_rect(0.0, 0.0, width, height);

    let top = y_max.unwrap_or_else(|| series.values().fold(1.0, f64::max) * 1.1);

    ctx.set_stroke_style(&"#374151".into());
    ctx.set_line_width(1.0);
    ctx.set_fill_style(&"#9ca3af".into());
    ctx.set_font("11px sans-serif");
    for i in 0..=4 {
        let y = margin_top + (i as f64 / 4.0) * chart_height;
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        let value = top - (i as f64 / 4.0) * top;
        let _ = ctx.fill_text(&format!("{:.0}", value), 5.0, y + 4.0);
    }

    if series.is_empty() {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("14px sans-serif");
        let _ = ctx.fill_text("No data yet", width / 2.0 - 35.0, height / 2.0);
        return;
    }

    // Fixed slots so a filling window grows from the left
    let slots = series.len().max(2) - 1;
    let x_at = |i: usize| margin_left + (i as f64 / slots as f64) * chart_width;
    let y_at = |v: f64| margin_top + (1.0 - (v / top).clamp(0.0, 1.0)) * chart_height;

    ctx.set_stroke_style(&color.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, value) in series.values().enumerate() {
        if i == 0 {
            ctx.move_to(x_at(i), y_at(value));
        } else {
            ctx.line_to(x_at(i), y_at(value));
        }
    }
    ctx.stroke();

    ctx.set_fill_style(&color.into());
    for (i, value) in series.values().enumerate() {
        ctx.begin_path();
        let _ = ctx.arc(x_at(i), y_at(value), 3.0, 0.0, std::f64::consts::PI * 2.0);
        ctx.fill();
    }

    ctx.set_fill_style(&"#9ca3af".into());
    ctx.set_font("10px sans-serif");
    let last = series.len() - 1;
    for (i, label) in series.labels().enumerate() {
        if i == 0 || i == last {
            let _ = ctx.fill_text(label, x_at(i) - 20.0, height - 10.0);
        }
    }
}
