//! State Management
//!
//! Page state, the upload form machine and the progress stream.

pub mod fitness;
pub mod global;
pub mod progress;
pub mod series;
pub mod upload;

pub use fitness::FitnessBand;
pub use global::{alert, provide_global_state, GlobalState, LiveProgress};
pub use progress::init_progress;
pub use series::SeriesWindow;
pub use upload::{Phase, SelectedFile, SubmitRequest, UploadForm};
