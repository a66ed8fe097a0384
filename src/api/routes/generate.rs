//! Schedule Generation Route
//!
//! - POST /generate_schedule - multipart `file` (xlsx) and `trimester`

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::form::Form;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::metrics::{Downloads, ScheduleMetrics};
use crate::pipeline::{self, parse_trimester};
use crate::websocket::ServerMessage;

/// POST /generate_schedule
///
/// Runs the whole pipeline on a blocking worker. Requests arriving during a
/// run wait for it to finish, including runs whose client has gone away.
/// Progress is published on the WebSocket hub.
pub async fn generate_schedule(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<ScheduleMetrics>> {
    let form = Form::read(multipart).await?;

    let (Some(file), Some(raw_trimester)) = (form.file("file"), form.text("trimester")) else {
        return Err(ApiError::Validation("File or trimester not provided".to_string()));
    };
    let trimester = parse_trimester(&raw_trimester)?;
    let data = file.data.clone();

    tracing::info!(
        trimester,
        file_name = file.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = data.len(),
        "Schedule generation requested"
    );

    let config = Arc::clone(&state.config);
    let hub = Arc::clone(&state.ws_hub);
    let outputs = Arc::clone(&state.outputs);
    let output_dir = state.output_dir().to_path_buf();

    // Everything after the solve happens on the worker too, so an abandoned
    // request still records its outputs and reports completion.
    let result = run_exclusive(Arc::clone(&state.generation_lock), move || {
        let result = pipeline::generate(&data, trimester, &config, &output_dir, |report| {
            hub.publish(ServerMessage::progress(trimester, report));
        });

        match result {
            Ok(output) => {
                outputs.blocking_write().insert(trimester, output.paths);
                let mut metrics = output.metrics;
                metrics.downloads = Some(Downloads::for_trimester(trimester));
                hub.publish(ServerMessage::Completed {
                    trimester,
                    metrics: metrics.clone(),
                });
                Ok(metrics)
            }
            Err(e) => {
                hub.publish(ServerMessage::Failed {
                    trimester,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    })
    .await?;

    let metrics = result?;

    tracing::info!(
        trimester,
        fitness_score = metrics.fitness_score,
        conflicts = metrics.conflicts,
        generations = metrics.generations,
        elapsed_secs = metrics.time,
        "Schedule generated"
    );

    Ok(Json(metrics))
}

/// Run `work` on a blocking worker while holding `lock`.
///
/// The guard moves into the worker: the lock stays held until the work
/// returns, even when the caller stops waiting for it.
pub(crate) async fn run_exclusive<T, F>(lock: Arc<Mutex<()>>, work: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = lock.lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Generation task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_held_after_request_is_dropped() {
        let lock = Arc::new(Mutex::new(()));
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let request = tokio::spawn(run_exclusive(Arc::clone(&lock), move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            42
        }));

        tokio::task::spawn_blocking(move || started_rx.recv().unwrap())
            .await
            .unwrap();

        // Client gone: the handler future is dropped mid-run
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());
        assert!(lock.try_lock().is_err());

        release_tx.send(()).unwrap();
        let relocked = tokio::time::timeout(Duration::from_secs(5), lock.lock()).await;
        assert!(relocked.is_ok());
    }

    #[tokio::test]
    async fn test_run_exclusive_returns_work_result() {
        let lock = Arc::new(Mutex::new(()));
        let value = run_exclusive(Arc::clone(&lock), || "done").await.unwrap();
        assert_eq!(value, "done");
        assert!(lock.try_lock().is_ok());
    }
}
