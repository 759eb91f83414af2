use crate::connection::Connection;
use crate::{ClientError, Result};
use async_trait::async_trait;
use minion_core::WorkQueue;
use minion_protocol::{decode_item, encode_item, Message, QueueName};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use tokio::sync::Mutex;

/// Network stub for one named queue on the server.
///
/// Each stub owns its own connection; calls from several tasks are
/// serialized on it. A `get` that is cancelled while waiting leaves its
/// reply in flight, so the stub should be dropped afterwards.
pub struct RemoteQueue<T> {
    name: QueueName,
    connection: Mutex<Connection>,
    _item: PhantomData<fn() -> T>,
}

impl<T> RemoteQueue<T> {
    pub(crate) fn new(name: QueueName, connection: Connection) -> Self {
        RemoteQueue {
            name,
            connection: Mutex::new(connection),
            _item: PhantomData,
        }
    }

    /// Number of items currently waiting on the server
    pub async fn len(&self) -> Result<u64> {
        let reply = self
            .connection
            .lock()
            .await
            .request(Message::Len { queue: self.name })
            .await?;

        match reply {
            Message::Length { len } => Ok(len),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Message) -> ClientError {
    match reply {
        Message::Nack { error } => ClientError::ServerError(error),
        other => ClientError::UnexpectedResponse(format!("{:?}", other.message_type())),
    }
}

#[async_trait]
impl<T> WorkQueue<T> for RemoteQueue<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Error = ClientError;

    async fn get(&self) -> Result<T> {
        let reply = self
            .connection
            .lock()
            .await
            .request(Message::Get { queue: self.name })
            .await?;

        match reply {
            Message::Item { payload } => Ok(decode_item(&payload)?),
            other => Err(unexpected(other)),
        }
    }

    async fn put(&self, item: T) -> Result<()> {
        let payload = encode_item(&item)?;
        let reply = self
            .connection
            .lock()
            .await
            .request(Message::Put {
                queue: self.name,
                payload,
            })
            .await?;

        match reply {
            Message::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
