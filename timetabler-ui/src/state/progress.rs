//! Live Progress
//!
//! Listens on `GET /ws` for generation progress. Connection problems are
//! only logged to the console; the page works without the stream.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::global::{GlobalState, LiveProgress};
use crate::api::ScheduleMetrics;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected {
        connection_id: String,
    },
    Progress {
        trimester: u8,
        generation: usize,
        best_penalty: f64,
        #[serde(default)]
        conflicts: usize,
    },
    Completed {
        trimester: u8,
        metrics: ScheduleMetrics,
    },
    Failed {
        trimester: u8,
        message: String,
    },
    Pong,
    Error {
        message: String,
    },
}

/// Apply a server message to the page state
pub fn apply(message: WsMessage, state: &GlobalState) {
    match message {
        WsMessage::Connected { connection_id } => {
            web_sys::console::log_1(&format!("Progress stream connected: {}", connection_id).into());
        }
        WsMessage::Progress {
            trimester,
            generation,
            best_penalty,
            conflicts,
        } => {
            state.progress.set(Some(LiveProgress {
                trimester,
                generation,
                best_penalty,
                conflicts,
            }));
        }
        WsMessage::Completed { trimester, metrics } => {
            web_sys::console::log_1(
                &format!("Trimester {} finished with fitness {}", trimester, metrics.fitness_score).into(),
            );
            state.progress.set(None);
        }
        WsMessage::Failed { trimester, message } => {
            web_sys::console::warn_1(&format!("Trimester {} failed: {}", trimester, message).into());
            state.progress.set(None);
        }
        WsMessage::Pong => {}
        WsMessage::Error { message } => {
            web_sys::console::error_1(&format!("Server error: {}", message).into());
        }
    }
}

struct ProgressStream {
    url: String,
    attempts: Rc<RefCell<u32>>,
}

impl ProgressStream {
    fn connect(self: Rc<Self>, state: GlobalState) {
        match WebSocket::new(&self.url) {
            Ok(ws) => self.setup_handlers(&ws, state),
            Err(e) => {
                web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
                self.schedule_reconnect(state);
            }
        }
    }

    fn setup_handlers(self: &Rc<Self>, ws: &WebSocket, state: GlobalState) {
        let attempts = Rc::clone(&self.attempts);
        let on_open = Closure::wrap(Box::new(move |_: JsValue| {
            state.ws_connected.set(true);
            *attempts.borrow_mut() = 0;
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
                let text: String = text.into();
                match serde_json::from_str::<WsMessage>(&text) {
                    Ok(msg) => apply(msg, &state),
                    Err(e) => web_sys::console::error_1(
                        &format!("Failed to parse WebSocket message: {}", e).into(),
                    ),
                }
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        let stream = Rc::clone(self);
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            web_sys::console::log_1(&format!("WebSocket closed: code={}", event.code()).into());
            state.ws_connected.set(false);
            Rc::clone(&stream).schedule_reconnect(state);
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();
    }

    /// Exponential backoff, capped at 30 s, gives up after a few tries
    fn schedule_reconnect(self: Rc<Self>, state: GlobalState) {
        let attempts = *self.attempts.borrow();
        if attempts >= MAX_RECONNECT_ATTEMPTS {
            return;
        }
        *self.attempts.borrow_mut() = attempts + 1;

        let delay = (2_u32.pow(attempts) * 1000).min(30_000);
        gloo_timers::callback::Timeout::new(delay, move || self.connect(state)).forget();
    }
}

/// Open the progress stream (call once from the app root)
pub fn init_progress(state: GlobalState) {
    let Some(url) = crate::api::ws_url() else {
        return;
    };
    let stream = Rc::new(ProgressStream {
        url,
        attempts: Rc::new(RefCell::new(0)),
    });
    stream.connect(state);
}
