pub mod auth;
pub mod local;
pub mod server;

pub use auth::SharedSecret;
pub use local::LocalQueue;
pub use server::{QueueServer, ServerHandle};

use minion_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
