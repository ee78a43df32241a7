use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::events::ResultRow;
use super::sink::ResultSink;
use super::state::SearchSession;

use crate::core::{CoreError, ExtensionCatalog, SearchConfig, SearchEngine};

fn lock(state: &Mutex<SearchSession>) -> MutexGuard<'_, SearchSession> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Starts a debounced background search for the session's current input.
///
/// Any search still running is cancelled first. The session is snapshotted
/// here, so edits made while the task runs do not affect it. Returns the
/// generation number the results will carry.
pub fn start_search<S: ResultSink>(state: Arc<Mutex<SearchSession>>, sink: S) -> u64 {
    let mut state_guard = lock(&state);
    state_guard.cancel_current_search();

    let new_cancel_flag = Arc::new(AtomicBool::new(false));
    state_guard.search_cancellation_flag = new_cancel_flag.clone();
    state_guard.generation += 1;

    let generation = state_guard.generation;
    let (config, catalog) = state_guard.snapshot();
    let engine = state_guard.engine.clone();
    let debounce = Duration::from_millis(state_guard.config.debounce_ms);

    tracing::debug!("Spawning search task #{}", generation);
    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        search_task(
            SearchJob {
                engine,
                config,
                catalog,
                cancel_flag: new_cancel_flag,
                generation,
                debounce,
            },
            task_state,
            sink,
        )
        .await;
    });
    state_guard.search_task = Some(handle);
    generation
}

struct SearchJob {
    engine: Arc<SearchEngine>,
    config: SearchConfig,
    catalog: ExtensionCatalog,
    cancel_flag: Arc<AtomicBool>,
    generation: u64,
    debounce: Duration,
}

async fn search_task<S: ResultSink>(job: SearchJob, state: Arc<Mutex<SearchSession>>, sink: S) {
    if !job.debounce.is_zero() {
        tokio::time::sleep(job.debounce).await;
    }
    if job.cancel_flag.load(Ordering::Relaxed) {
        tracing::debug!("Search #{} superseded during debounce", job.generation);
        return;
    }

    let SearchJob {
        engine,
        config,
        catalog,
        cancel_flag,
        generation,
        ..
    } = job;

    let result = tokio::task::spawn_blocking(move || {
        engine.run_with_cancel(&config, &catalog, &cancel_flag)
    })
    .await;

    let mut state_lock = lock(&state);
    if state_lock.generation != generation {
        tracing::debug!("Discarding results of stale search #{}", generation);
        return;
    }
    state_lock.search_task = None;
    drop(state_lock);

    match result {
        Ok(Ok(records)) => {
            let rows: Vec<ResultRow> = records.into_iter().map(ResultRow::from).collect();
            sink.on_results(generation, rows);
        }
        Ok(Err(CoreError::Cancelled)) => {
            tracing::debug!("Search #{} was cancelled", generation);
        }
        Ok(Err(e)) => {
            tracing::warn!("Search #{} failed: {}", generation, e);
            sink.on_results(generation, Vec::new());
            sink.on_error(e.to_string());
        }
        Err(e) => {
            tracing::error!("Search task #{} panicked: {}", generation, e);
            sink.on_error(format!("Search failed unexpectedly: {}", e));
        }
    }
}
