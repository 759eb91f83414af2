use crate::{
    GaussianSolver, Result, Solver, TaskDescriptor, TaskError, TaskOutcome, DEFAULT_SIZE_RANGE,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

const RTOL: f64 = 1e-5;
const ATOL: f64 = 1e-8;
const TIME_TOLERANCE: f64 = 1e-9;

/// One unit of work: a random dense system `a · x = b`.
///
/// `x` and `time` stay zero until [`Task::execute`] completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub identifier: u64,
    pub size: usize,
    /// `size × size` coefficients
    pub a: Vec<Vec<f64>>,
    /// Right-hand side, length `size`
    pub b: Vec<f64>,
    /// Solution, length `size`
    pub x: Vec<f64>,
    /// Seconds spent in the work function
    pub time: f64,
}

impl Task {
    /// Create a task with freshly generated input.
    ///
    /// Without an explicit size one is drawn from [`DEFAULT_SIZE_RANGE`].
    pub fn new(identifier: u64, size: Option<usize>) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let size = match size {
            Some(0) => return Err(TaskError::InvalidSize(0)),
            Some(size) => size,
            None => rng.gen_range(DEFAULT_SIZE_RANGE),
        };

        let a = (0..size)
            .map(|_| (0..size).map(|_| rng.gen::<f64>()).collect())
            .collect();
        let b = (0..size).map(|_| rng.gen::<f64>()).collect();

        Ok(Task {
            identifier,
            size,
            a,
            b,
            x: vec![0.0; size],
            time: 0.0,
        })
    }

    /// Rebuild a task from its queue descriptor.
    pub fn from_descriptor(descriptor: TaskDescriptor) -> Result<Self> {
        Self::new(descriptor.identifier, Some(descriptor.size))
    }

    /// Run the default work function.
    pub fn execute(&mut self) -> Result<()> {
        self.execute_with(&GaussianSolver)
    }

    /// Run `solver` on this task's input, recording the solution and the
    /// wall-clock time it took.
    pub fn execute_with(&mut self, solver: &dyn Solver) -> Result<()> {
        let start = Instant::now();
        let x = solver.solve(&self.a, &self.b)?;
        self.time = start.elapsed().as_secs_f64();
        self.x = x;

        debug!(
            identifier = self.identifier,
            size = self.size,
            elapsed = self.time,
            "task executed"
        );
        Ok(())
    }

    pub fn descriptor(&self) -> TaskDescriptor {
        TaskDescriptor {
            identifier: self.identifier,
            size: self.size,
        }
    }

    pub fn outcome(&self) -> TaskOutcome {
        TaskOutcome {
            identifier: self.identifier,
            elapsed_secs: self.time,
        }
    }

    /// Euclidean norm of `a · x - b`.
    pub fn residual_norm(&self) -> f64 {
        self.a
            .iter()
            .zip(&self.b)
            .map(|(row, rhs)| {
                let lhs: f64 = row.iter().zip(&self.x).map(|(a, x)| a * x).sum();
                (lhs - rhs).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a task, rejecting payloads whose shapes disagree with `size`.
    pub fn from_json(text: &str) -> Result<Self> {
        let task: Task =
            serde_json::from_str(text).map_err(|e| TaskError::Decode(e.to_string()))?;
        task.validate_shape()?;
        Ok(task)
    }

    fn validate_shape(&self) -> Result<()> {
        let n = self.size;
        if n == 0 {
            return Err(TaskError::Decode("size must be positive".to_string()));
        }
        if self.a.len() != n || self.a.iter().any(|row| row.len() != n) {
            return Err(TaskError::Decode(format!("`a` is not {n}x{n}")));
        }
        if self.b.len() != n {
            return Err(TaskError::Decode(format!("`b` does not have length {n}")));
        }
        if self.x.len() != n {
            return Err(TaskError::Decode(format!("`x` does not have length {n}")));
        }
        if !(self.time >= 0.0) {
            return Err(TaskError::Decode(format!("negative time {}", self.time)));
        }
        Ok(())
    }
}

fn all_close(lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(p, q)| (p - q).abs() <= ATOL + RTOL * q.abs())
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.size == other.size
            && self.a.len() == other.a.len()
            && self.a.iter().zip(&other.a).all(|(p, q)| all_close(p, q))
            && all_close(&self.b, &other.b)
            && all_close(&self.x, &other.x)
            && (self.time - other.time).abs() < TIME_TOLERANCE
    }
}
