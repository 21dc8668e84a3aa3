use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a stream. `Cancelled` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Active,
    Paused,
    Cancelled,
    Completed,
}

impl StreamStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamStatus::Cancelled | StreamStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Active => "active",
            StreamStatus::Paused => "paused",
            StreamStatus::Cancelled => "cancelled",
            StreamStatus::Completed => "completed",
        }
    }
}

/// One employer-to-employee payroll commitment.
///
/// `unclaimed_balance` is the settled balance as of `last_updated_block`;
/// accrual past that block is computed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: u64,
    pub issuer: String,
    pub owner: String,
    pub rate_per_block: Decimal,
    pub start_block: u64,
    pub last_updated_block: u64,
    pub max_cap: Decimal,
    pub total_claimed: Decimal,
    pub unclaimed_balance: Decimal,
    pub status: StreamStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Create,
    Claim,
    Pause,
    Resume,
    Cancel,
}

/// One payroll command as read from the CSV surface.
///
/// `block` is the current block height the command executes at; for `create`
/// it is the start block. Optional columns are required per op: `rate` and
/// `cap` for `create`, `amount` for `claim`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRow {
    pub op: CommandKind,
    pub stream: u64,
    pub block: u64,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub cap: Option<Decimal>,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub employee: Option<String>,
}

#[derive(Debug)]
pub struct StreamOutput {
    pub stream: u64,
    pub employee: String,
    pub status: StreamStatus,
    pub rate: Decimal,
    pub cap: Decimal,
    pub total_claimed: Decimal,
    pub unclaimed: Decimal,
    pub last_block: u64,
}

impl From<&Stream> for StreamOutput {
    fn from(s: &Stream) -> Self {
        Self {
            stream: s.id,
            employee: s.owner.clone(),
            status: s.status,
            rate: s.rate_per_block,
            cap: s.max_cap,
            total_claimed: s.total_claimed,
            unclaimed: s.unclaimed_balance,
            last_block: s.last_updated_block,
        }
    }
}

impl CommandRow {
    pub fn op_str(&self) -> &str {
        match self.op {
            CommandKind::Create => "create",
            CommandKind::Claim => "claim",
            CommandKind::Pause => "pause",
            CommandKind::Resume => "resume",
            CommandKind::Cancel => "cancel",
        }
    }
}

pub fn parse_command_kind(s: &str) -> Result<CommandKind, anyhow::Error> {
    match s.trim().to_lowercase().as_str() {
        "create" => Ok(CommandKind::Create),
        "claim" => Ok(CommandKind::Claim),
        "pause" => Ok(CommandKind::Pause),
        "resume" => Ok(CommandKind::Resume),
        "cancel" => Ok(CommandKind::Cancel),
        _ => anyhow::bail!("Unknown command op: {}", s),
    }
}
