use async_trait::async_trait;
use minion_core::{SharedQueue, WorkQueue};
use minion_protocol::{decode_item, encode_item, ProtocolError};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed view of one of the server's queues for code running in the
/// hosting process. Items use the same encoding as network clients, so
/// local and remote producers can feed the same queue.
pub struct LocalQueue<T> {
    inner: Arc<SharedQueue<Vec<u8>>>,
    _item: PhantomData<fn() -> T>,
}

impl<T> LocalQueue<T> {
    pub(crate) fn new(inner: Arc<SharedQueue<Vec<u8>>>) -> Self {
        LocalQueue {
            inner,
            _item: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Clone for LocalQueue<T> {
    fn clone(&self) -> Self {
        LocalQueue::new(self.inner.clone())
    }
}

#[async_trait]
impl<T> WorkQueue<T> for LocalQueue<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Error = ProtocolError;

    async fn get(&self) -> Result<T, ProtocolError> {
        let payload = self.inner.pop().await;
        decode_item(&payload)
    }

    async fn put(&self, item: T) -> Result<(), ProtocolError> {
        self.inner.push(encode_item(&item)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minion_core::Job;

    #[tokio::test]
    async fn test_typed_view_shares_storage() {
        let shared = Arc::new(SharedQueue::new());
        let producer: LocalQueue<Job> = LocalQueue::new(shared.clone());
        let consumer = producer.clone();

        producer.put(Job::run(1, 10)).await.unwrap();
        producer.put(Job::Stop).await.unwrap();
        assert_eq!(shared.len(), 2);

        assert_eq!(consumer.get().await.unwrap(), Job::run(1, 10));
        assert_eq!(consumer.get().await.unwrap(), Job::Stop);
        assert!(consumer.is_empty());
    }
}
