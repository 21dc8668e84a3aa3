use crate::models::CommandRow;
use anyhow::Result;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// Simple append-only event store using CSV format
pub struct EventStore {
    path: PathBuf,
    writer: Mutex<File>,
}

impl EventStore {
    pub async fn new(path: PathBuf) -> Result<Self> {
        // Create file if doesn't exist, append if exists
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Append a command to the event log
    pub async fn append(&self, cmd: &CommandRow) -> Result<()> {
        let mut writer = self.writer.lock().await;

        let line = format!(
            "{},{},{},{},{},{},{},{}\n",
            cmd.op_str(),
            cmd.stream,
            cmd.block,
            cmd.amount.map(|a| a.to_string()).unwrap_or_default(),
            cmd.rate.map(|r| r.to_string()).unwrap_or_default(),
            cmd.cap.map(|c| c.to_string()).unwrap_or_default(),
            cmd.employer.as_deref().unwrap_or_default(),
            cmd.employee.as_deref().unwrap_or_default()
        );

        writer.write_all(line.as_bytes()).await?;

        Ok(())
    }

    /// Replay all commands from the log
    pub async fn replay(&self) -> Result<Vec<CommandRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut commands = Vec::new();

        // Skip header if exists
        if let Some(first_line) = lines.next_line().await? {
            if !first_line.starts_with("op") {
                if let Ok(cmd) = parse_csv_line(&first_line) {
                    commands.push(cmd);
                }
            }
        }

        while let Some(line) = lines.next_line().await? {
            if let Ok(cmd) = parse_csv_line(&line) {
                commands.push(cmd);
            }
        }

        Ok(commands)
    }
}

fn parse_csv_line(line: &str) -> Result<CommandRow> {
    use crate::models::parse_command_kind;

    let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();

    if parts.len() < 3 {
        anyhow::bail!("Invalid CSV line");
    }

    let op = parse_command_kind(parts[0])?;
    let stream = parts[1].parse()?;
    let block = parts[2].parse()?;

    let decimal_at = |idx: usize| -> Result<Option<rust_decimal::Decimal>> {
        match parts.get(idx) {
            Some(s) if !s.is_empty() => Ok(Some(s.parse()?)),
            _ => Ok(None),
        }
    };
    let string_at = |idx: usize| -> Option<String> {
        parts
            .get(idx)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Ok(CommandRow {
        op,
        stream,
        block,
        amount: decimal_at(3)?,
        rate: decimal_at(4)?,
        cap: decimal_at(5)?,
        employer: string_at(6),
        employee: string_at(7),
    })
}
