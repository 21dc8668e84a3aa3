pub mod accrual;
pub mod claim_registry;
pub mod cli;
pub mod csv_io;
pub mod engine;
pub mod errors;
pub mod event_store;
pub mod models;
pub mod repository;
pub mod server;
pub mod shard_manager;
pub mod stream_actor;

pub use engine::PayrollEngine;
pub use errors::ProcessingError;
pub use models::{CommandKind, CommandRow, Stream, StreamOutput, StreamStatus};
pub use repository::{InMemoryRepository, StreamRepository};
