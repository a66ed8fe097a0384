//! Generation Progress Streaming
//!
//! Browsers connect to `GET /ws` and receive one `progress` message per
//! solver generation, then `completed` or `failed` when the run ends.
//!
//! # Protocol
//!
//! ## Server -> Client
//! ```json
//! {"type": "connected", "connection_id": "..."}
//! {"type": "progress", "trimester": 1, "generation": 4, "best_penalty": 16.0, "best_score": 96.0, "conflicts": 0}
//! {"type": "completed", "trimester": 1, "metrics": {...}}
//! {"type": "failed", "trimester": 1, "message": "..."}
//! {"type": "pong"}
//! ```
//!
//! ## Client -> Server
//! ```json
//! {"type": "ping"}
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
