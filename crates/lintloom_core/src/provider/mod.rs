//! Engine provisioning: handle memoization, the handle state machine and
//! the worker pool.

mod handle;
mod registry;
mod workers;

pub use handle::{EngineHandle, PendingLint};
pub use registry::EngineRegistry;
pub use workers::WorkerPool;
