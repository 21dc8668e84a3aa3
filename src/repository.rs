use crate::models::Stream;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for stream snapshot storage backends
///
/// Atomicity of read-modify-write is not this layer's job: each stream has a
/// single writer (its actor), so a put always carries the latest snapshot.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    async fn get(&self, stream_id: u64) -> Option<Stream>;
    async fn put(&self, stream_id: u64, stream: Stream) -> Result<()>;
    async fn remove(&self, stream_id: u64) -> Result<()>;
}

/// In-memory repository (simple, fast, no persistence needed in CLI mode)
pub struct InMemoryRepository {
    cache: Arc<RwLock<HashMap<u64, Stream>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamRepository for InMemoryRepository {
    async fn get(&self, stream_id: u64) -> Option<Stream> {
        let cache = self.cache.read().await;
        cache.get(&stream_id).cloned()
    }

    async fn put(&self, stream_id: u64, stream: Stream) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.insert(stream_id, stream);
        Ok(())
    }

    async fn remove(&self, stream_id: u64) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.remove(&stream_id);
        Ok(())
    }
}
