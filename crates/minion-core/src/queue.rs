use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::convert::Infallible;
use tokio::sync::Semaphore;

/// A FIFO queue reachable either in-process or over the network.
///
/// Minion and boss code is written against this trait so the same loop runs
/// on top of a [`SharedQueue`] or a network-backed stub.
#[async_trait]
pub trait WorkQueue<T: Send + 'static>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Remove the oldest item, waiting until one is available.
    async fn get(&self) -> Result<T, Self::Error>;

    /// Append an item.
    async fn put(&self, item: T) -> Result<(), Self::Error>;
}

/// Unbounded in-process FIFO queue with a blocking `pop`.
///
/// The semaphore holds one permit per stored item. It is fair, so waiting
/// consumers are served in arrival order.
pub struct SharedQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Semaphore,
}

impl<T> SharedQueue<T> {
    pub fn new() -> Self {
        SharedQueue {
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
        }
    }

    /// Push an item onto the back of the queue
    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.add_permits(1);
    }

    /// Pop the front item, waiting until one exists. Cancel safe.
    pub async fn pop(&self) -> T {
        loop {
            match self.available.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => unreachable!("queue semaphore is never closed"),
            }
            if let Some(item) = self.items.lock().pop_front() {
                return item;
            }
        }
    }

    /// Pop the front item if one is available right now
    pub fn try_pop(&self) -> Option<T> {
        let permit = self.available.try_acquire().ok()?;
        permit.forget();
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SharedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + 'static> WorkQueue<T> for SharedQueue<T> {
    type Error = Infallible;

    async fn get(&self) -> Result<T, Infallible> {
        Ok(self.pop().await)
    }

    async fn put(&self, item: T) -> Result<(), Infallible> {
        self.push(item);
        Ok(())
    }
}
