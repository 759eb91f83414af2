use crate::{LocalQueue, Result, ServerError, SharedSecret};
use minion_core::{Job, SharedQueue, TaskOutcome};
use minion_protocol::{Message, MessageCodec, QueueName};

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::codec::Framed;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Connections that do not say `Hello` within this window are dropped.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the two named queues for the lifetime of one server instance.
pub struct QueueServer {
    tasks: Arc<SharedQueue<Vec<u8>>>,
    results: Arc<SharedQueue<Vec<u8>>>,
    secret: SharedSecret,
}

impl QueueServer {
    pub fn new(secret: SharedSecret) -> Self {
        QueueServer {
            tasks: Arc::new(SharedQueue::new()),
            results: Arc::new(SharedQueue::new()),
            secret,
        }
    }

    /// Bind `address` and serve connections in the background.
    ///
    /// Returns once the listener is bound.
    pub async fn start(
        address: impl ToSocketAddrs + std::fmt::Display,
        secret: impl Into<Vec<u8>>,
    ) -> Result<ServerHandle> {
        let server = Arc::new(QueueServer::new(SharedSecret::new(secret)));
        server.bind(address).await
    }

    /// Bind and spawn the accept loop for an existing server.
    pub async fn bind(
        self: Arc<Self>,
        address: impl ToSocketAddrs + std::fmt::Display,
    ) -> Result<ServerHandle> {
        let display = address.to_string();
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind {
                address: display,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        info!("Queue server listening on {}", local_addr);

        let shutdown = Arc::new(Notify::new());
        let accept_task = tokio::spawn(self.clone().accept_loop(listener, shutdown.clone()));

        Ok(ServerHandle {
            local_addr,
            server: self,
            shutdown,
            accept_task: Some(accept_task),
        })
    }

    fn queue(&self, name: QueueName) -> &SharedQueue<Vec<u8>> {
        match name {
            QueueName::Tasks => &self.tasks,
            QueueName::Results => &self.results,
        }
    }

    async fn accept_loop(self: Arc<Self>, listener: TcpListener, shutdown: Arc<Notify>) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!("New connection from {}", peer);
                            let server = self.clone();
                            connections.spawn(async move {
                                if let Err(e) = server.handle_connection(stream, peer).await {
                                    warn!("Connection {} closed with error: {}", peer, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                // Reap finished connections
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.notified() => {
                    info!("Shutting down queue server ({} open connections)", connections.len());
                    break;
                }
            }
        }

        connections.shutdown().await;
    }

    /// Handle a client connection
    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        let mut framed = Framed::new(stream, MessageCodec);

        if !self.admit(&mut framed, peer).await? {
            return Ok(());
        }

        while let Some(result) = framed.next().await {
            let response = match result? {
                Message::Get { queue } => {
                    // Watch the socket while waiting so a departed client
                    // does not swallow an item.
                    tokio::select! {
                        payload = self.queue(queue).pop() => Message::Item { payload },
                        next = framed.next() => {
                            match next {
                                None => {
                                    debug!("{} disconnected while waiting on {}", peer, queue);
                                    return Ok(());
                                }
                                Some(Err(e)) => return Err(e.into()),
                                Some(Ok(other)) => {
                                    return Err(ServerError::UnexpectedMessage(format!(
                                        "{:?} sent while a Get was pending",
                                        other.message_type()
                                    )));
                                }
                            }
                        }
                    }
                }
                message => self.handle_message(message),
            };
            framed.send(response).await?;
        }

        debug!("{} disconnected", peer);
        Ok(())
    }

    /// Run the shared-secret handshake. Returns whether the peer was admitted.
    async fn admit(&self, framed: &mut Framed<TcpStream, MessageCodec>, peer: SocketAddr) -> Result<bool> {
        let first = match tokio::time::timeout(HANDSHAKE_TIMEOUT, framed.next()).await {
            Ok(Some(result)) => result?,
            Ok(None) => return Ok(false),
            Err(_) => {
                warn!("{} did not complete the handshake in time", peer);
                return Ok(false);
            }
        };

        let reason = match first {
            Message::Hello { secret } if self.secret.verify(&secret) => {
                framed.send(Message::Welcome).await?;
                debug!("Admitted {}", peer);
                return Ok(true);
            }
            Message::Hello { .. } => "authentication failed: invalid secret".to_string(),
            other => format!("expected Hello, got {:?}", other.message_type()),
        };

        warn!("Refusing {}: {}", peer, reason);
        framed.send(Message::Refused { reason }).await?;
        Ok(false)
    }

    /// Handle the non-blocking requests
    fn handle_message(&self, message: Message) -> Message {
        match message {
            Message::Put { queue, payload } => {
                self.queue(queue).push(payload);
                Message::Ack
            }
            Message::Len { queue } => Message::Length {
                len: self.queue(queue).len() as u64,
            },
            other => Message::Nack {
                error: format!("Unsupported message type: {:?}", other.message_type()),
            },
        }
    }
}

/// Handle to a running server.
///
/// Dropping the handle without calling [`ServerHandle::shutdown`] aborts the
/// accept loop without waiting for it.
pub struct ServerHandle {
    local_addr: SocketAddr,
    server: Arc<QueueServer>,
    shutdown: Arc<Notify>,
    accept_task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn task_queue(&self) -> LocalQueue<Job> {
        LocalQueue::new(self.server.tasks.clone())
    }

    pub fn result_queue(&self) -> LocalQueue<TaskOutcome> {
        LocalQueue::new(self.server.results.clone())
    }

    /// Stop accepting, close every connection and drop the queues.
    pub async fn shutdown(mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                error!("Queue server task failed: {}", e);
            }
        }
        info!("Queue server on {} stopped", self.local_addr);
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}
