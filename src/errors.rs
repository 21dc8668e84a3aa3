use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("invalid stream state")]
    InvalidStreamState,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("insufficient accrued balance")]
    InsufficientAccrued,
    #[error("invalid status transition")]
    InvalidTransition,
    #[error("missing amount")]
    MissingAmount,
    #[error("missing rate")]
    MissingRate,
    #[error("missing cap")]
    MissingCap,
    #[error("stream not found")]
    StreamNotFound,
    #[error("duplicate stream ID")]
    DuplicateStream,
    #[error("duplicate claim submission")]
    DuplicateClaim,
    #[error("event log append failed")]
    EventLogFailure,
    #[error("actor communication failed")]
    ActorCommunicationError,
}
