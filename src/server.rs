use crate::csv_io::{stream_commands, write_streams};
use crate::engine::PayrollEngine;
use crate::models::StreamOutput;
use crate::repository::{InMemoryRepository, StreamRepository};
use anyhow::Result;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

pub async fn run(bind: String, max_connections: usize) -> Result<()> {
    tracing::info!("Server mode: binding to {}", bind);

    // Use the in-memory repository for the server
    let repository: Arc<dyn StreamRepository> = Arc::new(InMemoryRepository::new());

    let event_log_path = PathBuf::from("payroll_streams.log");
    let engine = Arc::new(PayrollEngine::new(event_log_path, 16, repository).await?);

    // Rebuild state from previous runs
    engine.rebuild_from_events().await?;

    let listener = TcpListener::bind(&bind).await?;
    let semaphore = Arc::new(Semaphore::new(max_connections));

    tracing::info!("Listening on {}, max {} connections", bind, max_connections);

    loop {
        let permit = semaphore.clone().acquire_owned().await?;
        let (socket, addr) = listener.accept().await?;
        tracing::info!("Accepted connection from {}", addr);

        let engine = engine.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, engine).await {
                tracing::error!("Connection {} error: {}", addr, e);
            }
            drop(permit);
        });
    }
}

async fn handle_connection(socket: TcpStream, engine: Arc<PayrollEngine>) -> Result<()> {
    let (reader, writer) = socket.into_split();
    let reader = BufReader::new(reader);

    // Stream CSV commands from the socket
    let mut stream = stream_commands(reader);

    while let Some(result) = stream.next().await {
        match result {
            Ok(row) => {
                // Process via parallel actors
                let _ = engine.process(row).await;
            }
            Err(e) => {
                tracing::warn!("CSV parse error: {}", e);
            }
        }
    }

    // Read final state and return to client
    let mut streams: Vec<StreamOutput> = engine
        .get_streams()
        .await
        .iter()
        .map(StreamOutput::from)
        .collect();

    // Sort streams by ID for simplicity in the output
    streams.sort_by_key(|s| s.stream);

    let writer = BufWriter::new(writer);
    write_streams(writer, streams).await?;

    Ok(())
}
