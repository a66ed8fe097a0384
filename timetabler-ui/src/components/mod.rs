//! UI Components

pub mod chart;
pub mod metrics_panel;
pub mod nav;
pub mod progress;
pub mod success;
pub mod toast;
pub mod upload;

pub use chart::{FitnessTrend, LineChart, SystemCharts};
pub use metrics_panel::MetricsPanel;
pub use nav::Nav;
pub use progress::ProgressBanner;
pub use success::SuccessEmoji;
pub use toast::Toast;
pub use upload::{FilePicker, UploadPanel};
