pub mod boss;
pub mod config;
pub mod launch;
pub mod report;

pub use boss::Boss;
pub use config::BossConfig;
pub use launch::{MinionLaunch, RunningMinion};
pub use report::{render, results_table, Format};

use minion_protocol::ProtocolError;
use minion_server::ServerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BossError {
    #[error("Queue server error: {0}")]
    Server(#[from] ServerError),

    #[error("Queue error: {0}")]
    Queue(#[from] ProtocolError),

    #[error("Timed out after receiving {received} of {expected} results")]
    Timeout { received: usize, expected: usize },

    #[error("Failed to launch minion {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Minion {index} failed: {reason}")]
    Minion { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, BossError>;
