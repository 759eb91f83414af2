use crate::{ClientError, Result};
use minion_core::Endpoint;
use minion_protocol::{Message, MessageCodec};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

/// One authenticated connection to the queue server.
pub(crate) struct Connection {
    framed: Framed<TcpStream, MessageCodec>,
}

impl Connection {
    /// Connect and run the shared-secret handshake.
    pub(crate) async fn open(endpoint: &Endpoint) -> Result<Self> {
        let stream = TcpStream::connect(endpoint.address())
            .await
            .map_err(ClientError::ConnectionError)?;
        let mut connection = Connection {
            framed: Framed::new(stream, MessageCodec),
        };

        let hello = Message::Hello {
            secret: endpoint.secret_bytes().to_vec(),
        };
        match connection.request(hello).await? {
            Message::Welcome => {
                debug!("Connected to queue server at {}", endpoint.address());
                Ok(connection)
            }
            Message::Refused { reason } => Err(ClientError::Unauthorized(reason)),
            other => Err(ClientError::UnexpectedResponse(format!(
                "{:?} during handshake",
                other.message_type()
            ))),
        }
    }

    /// Send one message and wait for its reply.
    pub(crate) async fn request(&mut self, message: Message) -> Result<Message> {
        self.framed.send(message).await?;

        match self.framed.next().await {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::ConnectionClosed),
        }
    }
}
