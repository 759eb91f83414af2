use crate::config::MinionConfig;
use minion_client::QueueClient;
use minion_core::{GaussianSolver, Job, Solver, Task, TaskOutcome, WorkQueue};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinionState {
    Connecting,
    Ready,
    Executing,
    Stopped,
}

/// Pulls jobs off the task queue until it sees a stop sentinel.
pub struct Minion {
    config: MinionConfig,
    name: String,
    solver: Arc<dyn Solver>,
    state: Mutex<MinionState>,
}

impl Minion {
    pub fn new(config: MinionConfig) -> Self {
        Self::with_solver(config, Arc::new(GaussianSolver))
    }

    pub fn with_solver(config: MinionConfig, solver: Arc<dyn Solver>) -> Self {
        let name = config.minion_name();

        Minion {
            config,
            name,
            solver,
            state: Mutex::new(MinionState::Connecting),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> MinionState {
        *self.state.lock()
    }

    fn set_state(&self, state: MinionState) {
        debug!("Minion {} -> {:?}", self.name, state);
        *self.state.lock() = state;
    }

    /// Connect to the configured server and work until stopped.
    ///
    /// Returns the number of tasks completed.
    pub async fn run(&self) -> anyhow::Result<usize> {
        self.set_state(MinionState::Connecting);
        info!(
            "Minion {} connecting to {}",
            self.name,
            self.config.endpoint.address()
        );

        let client = QueueClient::connect(&self.config.endpoint, self.config.retry).await?;
        self.run_on(&client.task_queue, &client.result_queue).await
    }

    /// Work loop over any pair of queues.
    ///
    /// Execution errors are not caught: they end the loop with an error.
    pub async fn run_on<Q, R>(&self, tasks: &Q, results: &R) -> anyhow::Result<usize>
    where
        Q: WorkQueue<Job> + ?Sized,
        R: WorkQueue<TaskOutcome> + ?Sized,
    {
        let mut completed = 0;

        loop {
            self.set_state(MinionState::Ready);

            let descriptor = match tasks.get().await? {
                Job::Stop => break,
                Job::Run(descriptor) => descriptor,
            };

            self.set_state(MinionState::Executing);
            debug!(
                "Minion {} executing task {} (size {})",
                self.name, descriptor.identifier, descriptor.size
            );

            let solver = self.solver.clone();
            let task = tokio::task::spawn_blocking(move || {
                let mut task = Task::from_descriptor(descriptor)?;
                task.execute_with(solver.as_ref())?;
                Ok::<_, minion_core::TaskError>(task)
            })
            .await??;

            results.put(task.outcome()).await?;
            completed += 1;

            info!(
                "Minion {} finished task {} in {:.4}s",
                self.name, task.identifier, task.time
            );
        }

        self.set_state(MinionState::Stopped);
        info!("Minion {} stopping after {} tasks", self.name, completed);
        Ok(completed)
    }
}
