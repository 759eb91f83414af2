use crate::connection::Connection;
use crate::{ClientError, RemoteQueue, Result};
use minion_core::{Endpoint, Job, RetryPolicy, TaskOutcome};
use minion_protocol::QueueName;
use tracing::{debug, info};

/// Proxies to the two named queues of one server.
pub struct QueueClient {
    pub task_queue: RemoteQueue<Job>,
    pub result_queue: RemoteQueue<TaskOutcome>,
}

impl QueueClient {
    /// Connect to both queues, tolerating a server that is not up yet.
    ///
    /// Only "connection refused" is retried. A wrong secret fails on the
    /// first attempt.
    pub async fn connect(endpoint: &Endpoint, policy: RetryPolicy) -> Result<Self> {
        let tasks = open_with_retry(endpoint, policy).await?;
        let results = open_with_retry(endpoint, policy).await?;

        info!("Connected to queue server at {}", endpoint.address());

        Ok(QueueClient {
            task_queue: RemoteQueue::new(QueueName::Tasks, tasks),
            result_queue: RemoteQueue::new(QueueName::Results, results),
        })
    }
}

async fn open_with_retry(endpoint: &Endpoint, policy: RetryPolicy) -> Result<Connection> {
    // At least one attempt, even with `retries: 0`
    let attempts = policy.retries.max(1);

    let mut attempt = 1;
    loop {
        match Connection::open(endpoint).await {
            Ok(connection) => return Ok(connection),
            Err(ClientError::ConnectionError(source))
                if source.kind() == std::io::ErrorKind::ConnectionRefused =>
            {
                if attempt >= attempts {
                    return Err(ClientError::ConnectFailed { attempts, source });
                }
                debug!(
                    "Queue server at {} not reachable (attempt {}/{}): {}",
                    endpoint.address(),
                    attempt,
                    attempts,
                    source
                );
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
