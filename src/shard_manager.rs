use crate::errors::ProcessingError;
use crate::models::{CommandRow, Stream};
use crate::repository::StreamRepository;
use crate::stream_actor::{StreamActor, StreamHandle};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Manages multiple shards of stream actors for parallel processing
pub struct ShardManager {
    shards: Vec<Arc<RwLock<Shard>>>,
    num_shards: usize,
    repository: Arc<dyn StreamRepository>,
}

struct Shard {
    actors: HashMap<u64, StreamHandle>,
}

impl ShardManager {
    pub fn new(num_shards: usize, repository: Arc<dyn StreamRepository>) -> Self {
        let shards = (0..num_shards)
            .map(|_| {
                Arc::new(RwLock::new(Shard {
                    actors: HashMap::new(),
                }))
            })
            .collect();

        Self {
            shards,
            num_shards,
            repository,
        }
    }

    /// Get or create the actor for a stream
    async fn get_or_create_actor(&self, stream_id: u64) -> StreamHandle {
        let shard_id = (stream_id as usize) % self.num_shards;
        let shard = &self.shards[shard_id];

        // Check if actor exists (read lock)
        {
            let shard_lock = shard.read().await;
            if let Some(handle) = shard_lock.actors.get(&stream_id) {
                return handle.clone();
            }
        }

        // Create new actor (write lock)
        let mut shard_lock = shard.write().await;

        // Double-check (another task might have created it)
        if let Some(handle) = shard_lock.actors.get(&stream_id) {
            return handle.clone();
        }

        let (tx, rx) = mpsc::channel(1000);
        let handle = StreamHandle::new(tx);

        let actor = StreamActor::new(stream_id, rx, self.repository.clone());

        tokio::spawn(async move {
            actor.run().await;
        });

        shard_lock.actors.insert(stream_id, handle.clone());
        handle
    }

    pub async fn process(&self, cmd: CommandRow) -> Result<(), ProcessingError> {
        let actor = self.get_or_create_actor(cmd.stream).await;
        actor.apply(cmd).await
    }

    /// Get all stream states parallelly
    pub async fn get_all_streams(&self) -> Vec<Stream> {
        use futures::future::join_all;

        let futures: Vec<_> = self
            .shards
            .iter()
            .map(|shard| async move {
                let shard_lock = shard.read().await;
                let mut shard_streams = Vec::new();

                for handle in shard_lock.actors.values() {
                    if let Ok(Some(stream)) = handle.get_state().await {
                        shard_streams.push(stream);
                    }
                }

                shard_streams
            })
            .collect();

        let results = join_all(futures).await;
        results.into_iter().flatten().collect()
    }

    pub async fn get_stream(&self, stream_id: u64) -> Option<Stream> {
        let handle = self.existing_actor(stream_id).await?;
        handle.get_state().await.ok().flatten()
    }

    /// Claimable balance for a stream at the given block height
    pub async fn claimable(
        &self,
        stream_id: u64,
        block: u64,
    ) -> Result<Decimal, ProcessingError> {
        let handle = self
            .existing_actor(stream_id)
            .await
            .ok_or(ProcessingError::StreamNotFound)?;
        handle.claimable(block).await
    }

    async fn existing_actor(&self, stream_id: u64) -> Option<StreamHandle> {
        let shard_id = (stream_id as usize) % self.num_shards;
        let shard = &self.shards[shard_id];

        let shard_lock = shard.read().await;
        shard_lock.actors.get(&stream_id).cloned()
    }
}
