//! Application State
//!
//! Shared state accessible by all API handlers.

use crate::config::Config;
use crate::export::{OutputKind, OutputPaths};
use crate::websocket::{ConnectionHub, HubConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Output files of the latest run per trimester
    pub outputs: Arc<RwLock<HashMap<u8, OutputPaths>>>,
    /// Held for the whole of a generation; runs are serialised
    pub generation_lock: Arc<Mutex<()>>,
    pub start_time: Instant,
    /// Progress stream for `GET /ws`
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_ws_config(config, HubConfig::default())
    }

    pub fn with_ws_config(config: Config, hub_config: HubConfig) -> Self {
        Self {
            config: Arc::new(config),
            outputs: Arc::new(RwLock::new(HashMap::new())),
            generation_lock: Arc::new(Mutex::new(())),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    pub fn output_dir(&self) -> &Path {
        Path::new(&self.config.output.dir)
    }

    /// File to serve for a download: the cached path of the latest run,
    /// else the conventional name in the output directory
    pub async fn output_path(&self, trimester: u8, kind: OutputKind) -> PathBuf {
        if let Some(paths) = self.outputs.read().await.get(&trimester) {
            return paths.get(kind).to_path_buf();
        }
        OutputPaths::for_trimester(self.output_dir(), trimester)
            .get(kind)
            .to_path_buf()
    }

    pub async fn remember_outputs(&self, trimester: u8, paths: OutputPaths) {
        self.outputs.write().await.insert(trimester, paths);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_output_path_prefers_cached_run() {
        let mut config = Config::default();
        config.output.dir = "/srv/out".to_string();
        let state = AppState::new(config);

        assert_eq!(
            state.output_path(2, OutputKind::Json).await,
            PathBuf::from("/srv/out/timetable_T2.json")
        );

        let cached = OutputPaths::for_trimester(Path::new("/tmp/run"), 2);
        state.remember_outputs(2, cached).await;
        assert_eq!(
            state.output_path(2, OutputKind::Excel).await,
            PathBuf::from("/tmp/run/timetable_T2.xlsx")
        );
    }
}
