//! Runs a batch of extraction tasks on a fixed pool of workers.

use crate::core::config::{Config, MAX_CONCURRENCY};
use crate::core::error::{AppError, Result};
use crate::core::fetch::DocumentFetcher;
use crate::core::models::{BatchProgress, BatchTask, TaskOutcome};
use crate::extract::extract_contacts;
use crate::utils::urls::normalize_url;

use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Receives `(done, total)` after every finished task. Calls are serialized and
/// `done` never decreases. Must not block.
pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
}

/// Single-use runner for one batch: `Idle -> Running -> Completed`.
pub struct BatchOrchestrator {
    config: Arc<Config>,
    fetcher: Arc<dyn DocumentFetcher>,
    state: RwLock<BatchState>,
}

/// State shared by the workers of one run.
struct RunState {
    tasks: Vec<BatchTask>,
    cursor: AtomicUsize,
    done: AtomicUsize,
    results: Mutex<Vec<TaskOutcome>>,
    progress: Option<ProgressCallback>,
    progress_lock: Mutex<()>,
}

impl RunState {
    /// Claims the next unprocessed task index. Each index is handed out once.
    fn claim(&self) -> Option<usize> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        (index < self.tasks.len()).then_some(index)
    }

    fn complete(&self, outcome: TaskOutcome) {
        self.results.lock().push(outcome);

        let _serialized = self.progress_lock.lock();
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(ref callback) = self.progress {
            callback(BatchProgress {
                done,
                total: self.tasks.len(),
            });
        }
    }
}

/// Rejects input that cannot form a batch: no tasks, concurrency outside
/// `1..=MAX_CONCURRENCY`, or a task with an empty group key or unusable URL.
pub fn validate_batch(tasks: &[BatchTask], concurrency: usize) -> Result<()> {
    if tasks.is_empty() {
        return Err(AppError::Validation("Task list is empty.".to_string()));
    }
    if concurrency == 0 || concurrency > MAX_CONCURRENCY {
        return Err(AppError::Validation(format!(
            "Concurrency must be between 1 and {} (got {})",
            MAX_CONCURRENCY, concurrency
        )));
    }
    for (index, task) in tasks.iter().enumerate() {
        if task.group_key.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Task {} ({}) has an empty group key",
                index, task.url
            )));
        }
        if task.url.trim().is_empty() {
            return Err(AppError::Validation(format!("Task {} has an empty URL", index)));
        }
        normalize_url(&task.url).map_err(|e| {
            AppError::Validation(format!("Task {} has an invalid URL '{}': {}", index, task.url, e))
        })?;
    }
    Ok(())
}

impl BatchOrchestrator {
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            config,
            fetcher,
            state: RwLock::new(BatchState::Idle),
        }
    }

    pub fn state(&self) -> BatchState {
        *self.state.read()
    }

    /// Processes every task with `concurrency` workers and returns one outcome
    /// per task, sorted by task index.
    ///
    /// Fetch and parse failures are contained in the task's outcome. Only
    /// invalid input or a worker that fails to join makes the call fail.
    pub async fn run(
        &self,
        tasks: Vec<BatchTask>,
        concurrency: usize,
        progress: Option<ProgressCallback>,
    ) -> Result<Vec<TaskOutcome>> {
        validate_batch(&tasks, concurrency)?;
        {
            let mut state = self.state.write();
            if *state != BatchState::Idle {
                return Err(AppError::Validation(format!(
                    "Batch orchestrator already used (state {:?})",
                    *state
                )));
            }
            *state = BatchState::Running;
        }

        let total = tasks.len();
        let worker_count = concurrency.min(total);
        let start_time = Instant::now();
        tracing::info!(
            "Starting batch of {} task(s) with {} worker(s).",
            total,
            worker_count
        );

        let run = Arc::new(RunState {
            tasks,
            cursor: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            results: Mutex::new(Vec::with_capacity(total)),
            progress,
            progress_lock: Mutex::new(()),
        });

        let mut workers = FuturesUnordered::new();
        for worker_id in 0..worker_count {
            let run = Arc::clone(&run);
            let config = Arc::clone(&self.config);
            let fetcher = Arc::clone(&self.fetcher);
            workers.push(tokio::spawn(async move {
                run_worker(worker_id, run, config, fetcher).await
            }));
        }

        let mut join_failure: Option<String> = None;
        while let Some(joined) = workers.next().await {
            if let Err(e) = joined {
                tracing::error!("Batch worker failed to complete: {}", e);
                join_failure.get_or_insert_with(|| e.to_string());
            }
        }
        *self.state.write() = BatchState::Completed;

        if let Some(reason) = join_failure {
            return Err(AppError::Internal(format!("Batch worker failed: {}", reason)));
        }

        let mut outcomes = std::mem::take(&mut *run.results.lock());
        if outcomes.len() != total {
            return Err(AppError::Internal(format!(
                "Batch produced {} outcome(s) for {} task(s)",
                outcomes.len(),
                total
            )));
        }
        outcomes.sort_by_key(|outcome| outcome.index);

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        tracing::info!(
            "Batch finished in {:.2?}: {} task(s), {} failed.",
            start_time.elapsed(),
            total,
            failed
        );
        Ok(outcomes)
    }
}

async fn run_worker(
    worker_id: usize,
    run: Arc<RunState>,
    config: Arc<Config>,
    fetcher: Arc<dyn DocumentFetcher>,
) {
    let mut processed = 0usize;
    while let Some(index) = run.claim() {
        let task = &run.tasks[index];
        let outcome = process_task(index, task, &config, fetcher.as_ref()).await;
        run.complete(outcome);
        processed += 1;
    }
    tracing::debug!("Worker {} finished after {} task(s).", worker_id, processed);
}

async fn process_task(
    index: usize,
    task: &BatchTask,
    config: &Config,
    fetcher: &dyn DocumentFetcher,
) -> TaskOutcome {
    let task_label = format!("{}#{} {}", task.group_key, index, task.url);
    tracing::info!(target: "batch_task", "[{}] Starting task", task_label);

    let url = match normalize_url(&task.url) {
        Ok(url) => url.to_string(),
        Err(e) => return TaskOutcome::failure(index, task, e.to_string()),
    };

    let fetched = match tokio::time::timeout(config.request_timeout, fetcher.fetch(&url)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Fetch {
            url: url.clone(),
            reason: format!("timed out after {:?}", config.request_timeout),
        }),
    };

    match fetched.and_then(|raw| extract_contacts(config, &raw)) {
        Ok(contacts) => {
            tracing::info!(
                target: "batch_task",
                "[{}] Found {} contact(s)",
                task_label,
                contacts.len()
            );
            TaskOutcome::success(index, task, contacts)
        }
        Err(e) => {
            if e.is_task_level() {
                tracing::warn!(target: "batch_task", "[{}] Task failed: {}", task_label, e);
            } else {
                tracing::error!(target: "batch_task", "[{}] Unexpected task error: {}", task_label, e);
            }
            TaskOutcome::failure(index, task, e.to_string())
        }
    }
}
