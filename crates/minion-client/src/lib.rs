mod api;
mod client;
mod connection;
mod remote;

pub use api::{collect_results, collect_results_within, enqueue_stops, enqueue_tasks, CollectError};
pub use client::QueueClient;
pub use remote::RemoteQueue;

use minion_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    ConnectionError(#[source] std::io::Error),

    #[error("Could not reach queue server after {attempts} attempts: {source}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
