use anyhow::Result;
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};

/// Message types for the claim registry actor
pub enum ClaimRegistryMessage {
    Register {
        key: (u64, u64),
        // true if new, false if this claim was already submitted
        reply: oneshot::Sender<bool>,
    },
    Unregister {
        key: (u64, u64),
        // true if the key was present
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

/// Actor managing a shard of submitted claim keys.
///
/// A claim is identified by `(stream_id, block)`: replaying the same claim at
/// the same height is a duplicate submission, while a claim at a later height
/// is a new claim (more blocks have accrued by then).
pub struct ClaimRegistryActor {
    seen_claims: HashSet<(u64, u64)>,
    receiver: mpsc::Receiver<ClaimRegistryMessage>,
}

impl ClaimRegistryActor {
    pub fn new(receiver: mpsc::Receiver<ClaimRegistryMessage>) -> Self {
        Self {
            seen_claims: HashSet::new(),
            receiver,
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ClaimRegistryMessage::Register { key, reply } => {
                    let is_new = self.seen_claims.insert(key);
                    let _ = reply.send(is_new);
                }
                ClaimRegistryMessage::Unregister { key, reply } => {
                    let was_present = self.seen_claims.remove(&key);
                    let _ = reply.send(was_present);
                }
                ClaimRegistryMessage::Shutdown => break,
            }
        }
    }
}

#[derive(Clone)]
pub struct ClaimRegistryHandle {
    sender: mpsc::Sender<ClaimRegistryMessage>,
}

impl ClaimRegistryHandle {
    pub fn new(sender: mpsc::Sender<ClaimRegistryMessage>) -> Self {
        Self { sender }
    }

    pub async fn register(&self, key: (u64, u64)) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender
            .send(ClaimRegistryMessage::Register { key, reply: reply_tx })
            .await?;

        Ok(reply_rx.await?)
    }

    pub async fn unregister(&self, key: (u64, u64)) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender
            .send(ClaimRegistryMessage::Unregister { key, reply: reply_tx })
            .await?;

        Ok(reply_rx.await?)
    }
}

/// Sharded claim registry with multiple actors for parallel processing
#[derive(Clone)]
pub struct ShardedClaimRegistry {
    shards: Vec<ClaimRegistryHandle>,
}

impl ShardedClaimRegistry {
    pub fn new(num_shards: usize) -> Self {
        let mut shards = Vec::new();

        for _ in 0..num_shards {
            let (tx, rx) = mpsc::channel(10_000);
            let handle = ClaimRegistryHandle::new(tx);
            let actor = ClaimRegistryActor::new(rx);

            tokio::spawn(async move {
                actor.run().await;
            });

            shards.push(handle);
        }

        Self { shards }
    }

    pub async fn register(&self, stream_id: u64, block: u64) -> Result<bool> {
        // Route to appropriate shard by stream id
        let shard_id = (stream_id as usize) % self.shards.len();
        self.shards[shard_id].register((stream_id, block)).await
    }

    /// Unregister a claim key (used to roll back a rejected claim)
    pub async fn unregister(&self, stream_id: u64, block: u64) -> Result<bool> {
        let shard_id = (stream_id as usize) % self.shards.len();
        self.shards[shard_id].unregister((stream_id, block)).await
    }
}
