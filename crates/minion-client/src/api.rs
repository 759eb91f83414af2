//! Producer and results helpers, usable with any [`WorkQueue`].

use minion_core::{Job, TaskOutcome, WorkQueue};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CollectError<E: std::error::Error + 'static> {
    #[error("Queue error: {0}")]
    Queue(#[source] E),

    #[error("Timed out after receiving {received} of {expected} results")]
    Timeout { received: usize, expected: usize },
}

/// Enqueue `count` task descriptors with identifiers `0..count`.
pub async fn enqueue_tasks<Q>(queue: &Q, count: u64, size: usize) -> Result<(), Q::Error>
where
    Q: WorkQueue<Job> + ?Sized,
{
    for identifier in 0..count {
        queue.put(Job::run(identifier, size)).await?;
    }
    info!("Enqueued {} tasks (size={})", count, size);
    Ok(())
}

/// Enqueue one termination sentinel per minion.
pub async fn enqueue_stops<Q>(queue: &Q, minions: usize) -> Result<(), Q::Error>
where
    Q: WorkQueue<Job> + ?Sized,
{
    for _ in 0..minions {
        queue.put(Job::Stop).await?;
    }
    debug!("Enqueued {} stop sentinels", minions);
    Ok(())
}

/// Block until `expected` results have been received.
pub async fn collect_results<Q>(queue: &Q, expected: usize, sorted: bool) -> Result<Vec<TaskOutcome>, Q::Error>
where
    Q: WorkQueue<TaskOutcome> + ?Sized,
{
    let mut results = Vec::with_capacity(expected);
    while results.len() < expected {
        let outcome = queue.get().await?;
        debug!(
            "Result {} received ({}/{})",
            outcome.identifier,
            results.len() + 1,
            expected
        );
        results.push(outcome);
    }

    if sorted {
        sort_by_identifier(&mut results);
    }
    Ok(results)
}

/// Like [`collect_results`], but give up once `deadline` has elapsed.
pub async fn collect_results_within<Q>(
    queue: &Q,
    expected: usize,
    sorted: bool,
    deadline: Duration,
) -> Result<Vec<TaskOutcome>, CollectError<Q::Error>>
where
    Q: WorkQueue<TaskOutcome> + ?Sized,
{
    let mut results = Vec::with_capacity(expected);

    let collect = async {
        while results.len() < expected {
            results.push(queue.get().await?);
        }
        Ok::<(), Q::Error>(())
    };

    let finished = tokio::time::timeout(deadline, collect).await;
    match finished {
        Ok(outcome) => outcome.map_err(CollectError::Queue)?,
        Err(_) => {
            return Err(CollectError::Timeout {
                received: results.len(),
                expected,
            })
        }
    }

    if sorted {
        sort_by_identifier(&mut results);
    }
    Ok(results)
}

fn sort_by_identifier(results: &mut [TaskOutcome]) {
    results.sort_by_key(|outcome| outcome.identifier);
}

#[cfg(test)]
mod tests {
    use super::*;
    use minion_core::SharedQueue;

    #[tokio::test]
    async fn test_enqueue_tasks_then_stops() {
        let queue = SharedQueue::new();

        enqueue_tasks(&queue, 3, 50).await.unwrap();
        enqueue_stops(&queue, 2).await.unwrap();

        let drained: Vec<Job> = std::iter::from_fn(|| queue.try_pop()).collect();
        assert_eq!(
            drained,
            vec![Job::run(0, 50), Job::run(1, 50), Job::run(2, 50), Job::Stop, Job::Stop]
        );
    }

    #[tokio::test]
    async fn test_collect_results_sorted() {
        let queue = SharedQueue::new();
        for identifier in [2, 0, 1] {
            queue.push(TaskOutcome { identifier, elapsed_secs: 0.1 });
        }

        let results = collect_results(&queue, 3, true).await.unwrap();
        let ids: Vec<u64> = results.iter().map(|r| r.identifier).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_collect_results_unsorted_keeps_arrival_order() {
        let queue = SharedQueue::new();
        for identifier in [2, 0, 1] {
            queue.push(TaskOutcome { identifier, elapsed_secs: 0.1 });
        }

        let results = collect_results(&queue, 2, false).await.unwrap();
        let ids: Vec<u64> = results.iter().map(|r| r.identifier).collect();
        assert_eq!(ids, vec![2, 0]);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_results_within_times_out() {
        let queue = SharedQueue::new();
        queue.push(TaskOutcome { identifier: 0, elapsed_secs: 0.1 });

        let err = collect_results_within(&queue, 2, true, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Timeout { received: 1, expected: 2 }));
    }
}
