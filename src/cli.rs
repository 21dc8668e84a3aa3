use crate::csv_io::{stream_commands, write_streams};
use crate::engine::PayrollEngine;
use crate::models::StreamOutput;
use crate::repository::{InMemoryRepository, StreamRepository};
use anyhow::Result;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufReader;

pub async fn run(input_path: PathBuf) -> Result<()> {
    // Clean up all old temp files from previous runs as they persist across runs
    let temp_dir = PathBuf::from("/tmp");
    if let Ok(mut entries) = tokio::fs::read_dir(&temp_dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with("payroll-streams-cli-") && name.ends_with(".log") {
                    let _ = tokio::fs::remove_file(entry.path()).await;
                }
            }
        }
    }

    // Create unique temporary event store to avoid race conditions
    let temp_log = PathBuf::from(format!(
        "/tmp/payroll-streams-cli-{}.log",
        std::process::id()
    ));

    // Use the in-memory repository for CLI (no persistence needed)
    let repository: Arc<dyn StreamRepository> = Arc::new(InMemoryRepository::new());

    // Initialize engine with 16 shards for parallel processing
    let engine = PayrollEngine::new(temp_log.clone(), 16, repository).await?;

    // Open and process input file
    let file = File::open(&input_path).await?;
    let reader = BufReader::new(file);
    let mut stream = stream_commands(reader);

    while let Some(result) = stream.next().await {
        match result {
            Ok(row) => {
                // Process with the engine (parallel via actors)
                let _ = engine.process(row).await;
            }
            Err(_) => {
                // Ignore parse errors
            }
        }
    }

    let mut streams: Vec<StreamOutput> = engine
        .get_streams()
        .await
        .iter()
        .map(StreamOutput::from)
        .collect();

    // Sort streams by ID for simplicity
    streams.sort_by_key(|s| s.stream);

    write_streams(tokio::io::stdout(), streams).await?;

    let _ = tokio::fs::remove_file(&temp_log).await;

    Ok(())
}
