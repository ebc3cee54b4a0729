use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

use super::core::IndexStore;
use super::scanner::{scan_snippets, ScanOutcome, SnippetSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    Idle,
    Running,
    Cancelling,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running(Arc<AtomicBool>),
    Cancelling,
}

#[derive(Debug)]
struct WorkerState {
    phase: Phase,
    /// At most one follow-up run is ever queued.
    pending: bool,
    shutdown: bool,
}

struct Shared {
    state: Mutex<WorkerState>,
    wakeup: Condvar,
    store: Arc<IndexStore>,
    source: Arc<dyn SnippetSource>,
    started_runs: AtomicU64,
    completed_runs: AtomicU64,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, WorkerState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => {
                error!("Indexer state mutex poisoned, recovering: {:?}", poisoned);
                poisoned.into_inner()
            }
        }
    }

    fn restart(&self) {
        let mut state = self.lock_state();
        if state.shutdown {
            return;
        }

        state.pending = true;
        if let Phase::Running(cancel) = &state.phase {
            cancel.store(true, Ordering::Release);
            state.phase = Phase::Cancelling;
            debug!("INDEX_RESTART: cancelling in-flight run");
        }
        drop(state);

        self.wakeup.notify_all();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub total_snippets: usize,
    pub started_runs: u64,
    pub completed_runs: u64,
    pub is_scanning: bool,
}

/// Cheap handle that can request restarts from any thread, e.g. a watcher
/// callback. It does not keep the worker alive.
#[derive(Clone)]
pub struct RestartHandle {
    shared: Arc<Shared>,
}

impl RestartHandle {
    pub fn restart(&self) {
        self.shared.restart();
    }
}

impl std::fmt::Debug for RestartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartHandle").finish_non_exhaustive()
    }
}

/// Runs scans on one dedicated thread and publishes completed runs to the
/// store. A restart during a run cancels it and queues exactly one successor.
pub struct BackgroundIndexer {
    shared: Arc<Shared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl std::fmt::Debug for BackgroundIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundIndexer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl BackgroundIndexer {
    /// Spawns the worker. Nothing is scanned until the first `restart()`.
    pub fn spawn(source: Arc<dyn SnippetSource>, store: Arc<IndexStore>) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(WorkerState {
                phase: Phase::Idle,
                pending: false,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            store,
            source,
            started_runs: AtomicU64::new(0),
            completed_runs: AtomicU64::new(0),
        });

        let worker = thread::Builder::new()
            .name("snippets-indexer".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                move || worker_loop(shared)
            })
            .map_err(Error::Spawn)?;

        Ok(Self {
            shared,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Never blocks on a running scan.
    pub fn restart(&self) {
        self.shared.restart();
    }

    pub fn restart_handle(&self) -> RestartHandle {
        RestartHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> IndexerState {
        match self.shared.lock_state().phase {
            Phase::Idle => IndexerState::Idle,
            Phase::Running(_) => IndexerState::Running,
            Phase::Cancelling => IndexerState::Cancelling,
        }
    }

    #[inline]
    pub fn is_scanning(&self) -> bool {
        self.state() != IndexerState::Idle
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.shared.store
    }

    pub fn scan_progress(&self) -> ScanProgress {
        ScanProgress {
            total_snippets: self.shared.store.current().len(),
            started_runs: self.shared.started_runs.load(Ordering::Acquire),
            completed_runs: self.shared.completed_runs.load(Ordering::Acquire),
            is_scanning: self.is_scanning(),
        }
    }

    /// Blocks until no run is in flight or queued. Returns `false` on timeout.
    pub fn wait_for_idle(&self, timeout: Duration) -> bool {
        let state = self.shared.lock_state();
        let result = self.shared.wakeup.wait_timeout_while(state, timeout, |state| {
            !state.shutdown && (state.pending || !matches!(state.phase, Phase::Idle))
        });

        match result {
            Ok((_, wait)) => !wait.timed_out(),
            Err(poisoned) => !poisoned.into_inner().1.timed_out(),
        }
    }

    /// Cancels the in-flight run and joins the worker. Later restarts are
    /// ignored.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock_state();
            state.shutdown = true;
            state.pending = false;
            if let Phase::Running(cancel) = &state.phase {
                cancel.store(true, Ordering::Release);
            }
        }
        self.shared.wakeup.notify_all();

        let worker = match self.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(worker) = worker {
            if worker.join().is_err() {
                error!("Indexer thread panicked");
            }
        }
    }
}

impl Drop for BackgroundIndexer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let cancel = {
            let mut state = shared.lock_state();
            while !state.pending && !state.shutdown {
                state = match shared.wakeup.wait(state) {
                    Ok(state) => state,
                    Err(poisoned) => {
                        error!("Indexer condvar wait poisoned, recovering: {:?}", poisoned);
                        poisoned.into_inner()
                    }
                };
            }

            if state.shutdown {
                state.phase = Phase::Idle;
                drop(state);
                shared.wakeup.notify_all();
                debug!("INDEX_WORKER: shutting down");
                return;
            }

            state.pending = false;
            let cancel = Arc::new(AtomicBool::new(false));
            state.phase = Phase::Running(Arc::clone(&cancel));
            cancel
        };

        let run = shared.started_runs.fetch_add(1, Ordering::AcqRel) + 1;
        let run_start = std::time::Instant::now();
        info!("INDEX_RUN: starting run {}", run);

        match scan_snippets(shared.source.as_ref(), &cancel) {
            ScanOutcome::Completed(records) => {
                let count = records.len();
                let generation = shared.store.publish(records);
                shared.completed_runs.fetch_add(1, Ordering::AcqRel);
                info!(
                    "INDEX_RUN: Indexed {} snippets (run {}, generation {}, {:?})",
                    count,
                    run,
                    generation,
                    run_start.elapsed()
                );
            }
            ScanOutcome::Cancelled { processed } => {
                info!(
                    "INDEX_RUN: run {} cancelled after {} snippets, keeping previous index",
                    run, processed
                );
            }
        }

        shared.lock_state().phase = Phase::Idle;
        shared.wakeup.notify_all();
    }
}
