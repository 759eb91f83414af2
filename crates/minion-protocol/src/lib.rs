mod message;
mod codec;

pub use message::{Message, MessageType, QueueName};
pub use codec::MessageCodec;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid message type: {0}")]
    InvalidMessageType(u8),

    #[error("Message too large: {0} bytes")]
    MessageTooLarge(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Maximum frame size: 64MB
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Encode a queue item. The server stores these bytes without looking inside.
pub fn encode_item<T: Serialize>(item: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(item)?)
}

pub fn decode_item<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(payload)?)
}
