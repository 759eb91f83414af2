mod endpoint;
mod error;
mod job;
mod queue;
mod solver;
mod task;

pub use endpoint::{Endpoint, RetryPolicy};
pub use error::{Result, TaskError, WorkError};
pub use job::{Job, TaskDescriptor, TaskOutcome};
pub use queue::{SharedQueue, WorkQueue};
pub use solver::{GaussianSolver, Solver};
pub use task::Task;

/// Default size range `[min, max)` for tasks created without an explicit size.
pub const DEFAULT_SIZE_RANGE: std::ops::Range<usize> = 300..3000;
