use crate::accrual;
use crate::errors::ProcessingError;
use crate::models::{CommandKind, CommandRow, Stream};
use crate::repository::StreamRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

pub enum StreamMessage {
    Apply {
        cmd: CommandRow,
        reply: oneshot::Sender<Result<(), ProcessingError>>,
    },
    GetState {
        reply: oneshot::Sender<Option<Stream>>,
    },
    Claimable {
        block: u64,
        reply: oneshot::Sender<Result<Decimal, ProcessingError>>,
    },
    Shutdown,
}

/// Single writer for one stream.
///
/// Owns the authoritative snapshot and serializes all mutations through its
/// mailbox; the arithmetic itself lives in the pure `accrual` module. Each
/// successful mutation is mirrored to the repository.
pub struct StreamActor {
    stream_id: u64,
    stream: Option<Stream>,
    repository: Arc<dyn StreamRepository>,
    receiver: mpsc::Receiver<StreamMessage>,
}

impl StreamActor {
    pub fn new(
        stream_id: u64,
        receiver: mpsc::Receiver<StreamMessage>,
        repository: Arc<dyn StreamRepository>,
    ) -> Self {
        Self {
            stream_id,
            stream: None,
            repository,
            receiver,
        }
    }

    pub async fn run(mut self) {
        // Adopt an existing snapshot so a respawned actor resumes where the
        // previous one left off
        if let Some(snapshot) = self.repository.get(self.stream_id).await {
            self.stream = Some(snapshot);
        }

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StreamMessage::Apply { cmd, reply } => {
                    let result = self.apply_command(cmd).await;
                    let _ = reply.send(result);
                }
                StreamMessage::GetState { reply } => {
                    let _ = reply.send(self.stream.clone());
                }
                StreamMessage::Claimable { block, reply } => {
                    let result = self
                        .stream
                        .as_ref()
                        .ok_or(ProcessingError::StreamNotFound)
                        .and_then(|s| accrual::compute_claimable(s, block));
                    let _ = reply.send(result);
                }
                StreamMessage::Shutdown => break,
            }
        }

        tracing::debug!("Actor for stream {} terminated", self.stream_id);
    }

    async fn apply_command(&mut self, cmd: CommandRow) -> Result<(), ProcessingError> {
        let next = match cmd.op {
            CommandKind::Create => {
                if self.stream.is_some() {
                    return Err(ProcessingError::DuplicateStream);
                }
                let rate = cmd.rate.ok_or(ProcessingError::MissingRate)?;
                let cap = cmd.cap.ok_or(ProcessingError::MissingCap)?;
                accrual::create_stream(
                    self.stream_id,
                    cmd.employer.unwrap_or_default(),
                    cmd.employee.unwrap_or_default(),
                    rate,
                    cap,
                    cmd.block,
                )?
            }
            CommandKind::Claim => {
                let stream = self.stream.as_ref().ok_or(ProcessingError::StreamNotFound)?;
                let amount = cmd.amount.ok_or(ProcessingError::MissingAmount)?;
                accrual::apply_claim(stream, cmd.block, amount)?
            }
            CommandKind::Pause => {
                let stream = self.stream.as_ref().ok_or(ProcessingError::StreamNotFound)?;
                accrual::pause_stream(stream, cmd.block)?
            }
            CommandKind::Resume => {
                let stream = self.stream.as_ref().ok_or(ProcessingError::StreamNotFound)?;
                accrual::resume_stream(stream, cmd.block)?
            }
            CommandKind::Cancel => {
                let stream = self.stream.as_ref().ok_or(ProcessingError::StreamNotFound)?;
                accrual::cancel_stream(stream, cmd.block)?
            }
        };

        // The actor state is authoritative; a failed mirror write is logged
        // and retried on the next mutation
        if let Err(e) = self.repository.put(self.stream_id, next.clone()).await {
            error!(
                stream_id = self.stream_id,
                error = ?e,
                "Failed to persist stream snapshot"
            );
        }

        self.stream = Some(next);
        Ok(())
    }
}

#[derive(Clone)]
pub struct StreamHandle {
    sender: mpsc::Sender<StreamMessage>,
}

impl StreamHandle {
    pub fn new(sender: mpsc::Sender<StreamMessage>) -> Self {
        Self { sender }
    }

    pub async fn apply(&self, cmd: CommandRow) -> Result<(), ProcessingError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender
            .send(StreamMessage::Apply { cmd, reply: reply_tx })
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)?;

        reply_rx
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)?
    }

    pub async fn get_state(&self) -> Result<Option<Stream>, ProcessingError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender
            .send(StreamMessage::GetState { reply: reply_tx })
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)?;

        reply_rx
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)
    }

    pub async fn claimable(&self, block: u64) -> Result<Decimal, ProcessingError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender
            .send(StreamMessage::Claimable { block, reply: reply_tx })
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)?;

        reply_rx
            .await
            .map_err(|_| ProcessingError::ActorCommunicationError)?
    }
}
