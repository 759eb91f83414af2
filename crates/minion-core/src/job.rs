use serde::{Deserialize, Serialize};

/// Minimal wire form of a task: enough for a minion to rebuild it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub identifier: u64,
    pub size: usize,
}

/// An item on the task queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Job {
    /// Build and execute the described task
    Run(TaskDescriptor),
    /// Termination sentinel, one per minion
    Stop,
}

impl Job {
    pub fn run(identifier: u64, size: usize) -> Self {
        Job::Run(TaskDescriptor { identifier, size })
    }
}

/// An item on the result queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub identifier: u64,
    pub elapsed_secs: f64,
}
