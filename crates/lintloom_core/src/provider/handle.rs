//! Engine handles, the provider's unit of reuse.
//!
//! A handle bundles a probe engine (always in-process, serving ignore and
//! formatter queries in every mode) with a dispatch state: a worker pool
//! or the probe itself. Cleanup demotes a pooled handle to the probe
//! exactly once; callers holding the handle across cleanup keep getting
//! valid results.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use lintloom_engine::{
    EngineError, EngineFactory, EngineOptions, FileLintResult, Formatter, LintEngine,
};
use parking_lot::Mutex;
use tracing::debug;

use super::workers::{WorkerPool, lint_with};

/// Dispatch state of a handle.
enum HandleState {
    /// Jobs go to the worker pool.
    Pooled(WorkerPool),
    /// Placeholder while cleanup moves the pool out. Never observable by
    /// dispatchers: cleanup holds the state lock across the whole
    /// transition.
    Draining,
    /// Jobs run in-process.
    Local(Arc<dyn LintEngine>),
}

/// A dispatched lint, either already settled or pending a worker reply.
pub enum PendingLint {
    /// In-process outcome.
    Ready(Result<Vec<FileLintResult>, EngineError>),
    /// Worker reply channel.
    Pending(Receiver<Result<Vec<FileLintResult>, EngineError>>),
}

impl PendingLint {
    /// Blocks until the outcome is available.
    pub fn resolve(self) -> Result<Vec<FileLintResult>, EngineError> {
        match self {
            Self::Ready(outcome) => outcome,
            Self::Pending(rx) => rx
                .recv()
                .unwrap_or_else(|_| Err(EngineError::execution("lint worker disappeared"))),
        }
    }
}

/// A memoized engine, pooled or in-process.
pub struct EngineHandle {
    threads: usize,
    fix: bool,
    probe: Arc<dyn LintEngine>,
    state: Mutex<HandleState>,
}

impl EngineHandle {
    /// Builds a handle. The probe engine is constructed eagerly, so fully
    /// broken options fail here; with `threads > 1` a worker pool is
    /// spawned as well.
    pub fn new(
        threads: usize,
        factory: Arc<dyn EngineFactory>,
        engine_options: EngineOptions,
    ) -> Result<Self, EngineError> {
        let probe = factory.build(&engine_options)?;
        let state = if threads > 1 {
            HandleState::Pooled(WorkerPool::spawn(threads, factory, &engine_options)?)
        } else {
            HandleState::Local(probe.clone())
        };
        Ok(Self {
            threads,
            fix: engine_options.fix,
            probe,
            state: Mutex::new(state),
        })
    }

    /// The configured worker count. Stable across cleanup, so a session's
    /// dispatch mode never flips mid-cycle.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Whether dispatches currently go to a worker pool.
    pub fn is_pooled(&self) -> bool {
        matches!(&*self.state.lock(), HandleState::Pooled(_))
    }

    /// Dispatches `paths` for linting.
    ///
    /// Pooled handles answer with a pending reply immediately; in-process
    /// handles lint on the calling thread.
    pub fn lint_files(&self, paths: Vec<PathBuf>) -> PendingLint {
        let local = {
            let state = self.state.lock();
            match &*state {
                HandleState::Pooled(pool) => return PendingLint::Pending(pool.lint_files(paths)),
                HandleState::Draining => None,
                HandleState::Local(engine) => Some(engine.clone()),
            }
        };
        match local {
            Some(engine) => PendingLint::Ready(lint_with(engine.as_ref(), &paths, self.fix)),
            // Unreachable while cleanup holds the lock; kept total.
            None => PendingLint::Ready(Err(EngineError::execution("engine handle is draining"))),
        }
    }

    /// Whether the engine's ignore configuration excludes `path`.
    pub fn is_path_ignored(&self, path: &Path) -> Result<bool, EngineError> {
        self.probe.is_path_ignored(path)
    }

    /// Loads a formatter through the probe engine.
    pub fn load_formatter(&self, name: Option<&str>) -> Result<Arc<dyn Formatter>, EngineError> {
        self.probe.load_formatter(name)
    }

    /// Tears the worker pool down and routes future dispatches to the
    /// probe engine. Queued jobs drain before the workers join; calling
    /// this on an already-local handle is a no-op.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        if !matches!(&*state, HandleState::Pooled(_)) {
            return;
        }
        let old = std::mem::replace(&mut *state, HandleState::Draining);
        if let HandleState::Pooled(pool) = old {
            debug!(workers = pool.size(), "draining lint worker pool");
            pool.shutdown();
        }
        *state = HandleState::Local(self.probe.clone());
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("threads", &self.threads)
            .field("fix", &self.fix)
            .finish_non_exhaustive()
    }
}
