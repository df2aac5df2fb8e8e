//! Worker pool for threaded linting.
//!
//! Each worker owns one engine instance, constructed once at thread start
//! and never re-configured. Jobs are assigned round-robin and answered on
//! per-job reply channels, so the dispatching thread keeps collecting
//! module events while workers lint.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use lintloom_engine::{EngineError, EngineFactory, EngineOptions, FileLintResult, LintEngine};
use tracing::{debug, warn};

/// A lint job travelling to a worker.
struct LintJob {
    paths: Vec<PathBuf>,
    reply: Sender<Result<Vec<FileLintResult>, EngineError>>,
}

/// Fixed-size pool of lint workers.
pub struct WorkerPool {
    senders: Vec<Sender<LintJob>>,
    handles: Vec<JoinHandle<()>>,
    next: AtomicUsize,
}

impl WorkerPool {
    /// Spawns `size` workers, each constructing its own engine from
    /// `options`.
    pub fn spawn(
        size: usize,
        factory: Arc<dyn EngineFactory>,
        options: &EngineOptions,
    ) -> Result<Self, std::io::Error> {
        let mut senders = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);
        for index in 0..size {
            let (tx, rx) = crossbeam_channel::unbounded::<LintJob>();
            let factory = factory.clone();
            let options = options.clone();
            let handle = std::thread::Builder::new()
                .name(format!("lintloom-worker-{index}"))
                .spawn(move || worker_loop(index, rx, factory, options))?;
            senders.push(tx);
            handles.push(handle);
        }
        Ok(Self {
            senders,
            handles,
            next: AtomicUsize::new(0),
        })
    }

    /// Queues `paths` on the next worker and returns the reply channel.
    pub fn lint_files(
        &self,
        paths: Vec<PathBuf>,
    ) -> Receiver<Result<Vec<FileLintResult>, EngineError>> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        let job = LintJob {
            paths,
            reply: reply_tx,
        };
        if let Err(err) = self.senders[index].send(job) {
            // The worker is gone; answer the caller directly.
            let job = err.into_inner();
            let _ = job
                .reply
                .send(Err(EngineError::execution("lint worker unavailable")));
        }
        reply_rx
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.senders.len()
    }

    /// Closes the job channels and joins all workers.
    ///
    /// Queued jobs drain first; their reply channels stay valid, so
    /// in-flight dispatches still resolve after shutdown.
    pub fn shutdown(mut self) {
        self.senders.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("lint worker panicked during shutdown");
            }
        }
    }
}

fn worker_loop(
    index: usize,
    jobs: Receiver<LintJob>,
    factory: Arc<dyn EngineFactory>,
    options: EngineOptions,
) {
    // One-time setup: the engine exists before the first job arrives.
    let engine = factory.build(&options);
    match &engine {
        Ok(_) => debug!(worker = index, "lint worker ready"),
        Err(e) => warn!(worker = index, error = %e, "lint worker failed to construct engine"),
    }

    for job in jobs.iter() {
        let outcome = match &engine {
            Ok(engine) => lint_with(engine.as_ref(), &job.paths, options.fix),
            Err(e) => Err(EngineError::construction(e.to_string())),
        };
        // The caller may have given up on the reply; nothing to do then.
        let _ = job.reply.send(outcome);
    }
    debug!(worker = index, "lint worker stopped");
}

/// Lints and, in fix mode, persists the computed fixes. Shared with the
/// in-process path so both modes behave identically.
pub(crate) fn lint_with(
    engine: &dyn LintEngine,
    paths: &[PathBuf],
    fix: bool,
) -> Result<Vec<FileLintResult>, EngineError> {
    let results = engine.lint_files(paths)?;
    if fix {
        engine.output_fixes(&results)?;
    }
    Ok(results)
}
