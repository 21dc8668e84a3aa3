use crate::models::{CommandRow, StreamOutput};
use csv_async::AsyncReaderBuilder;
use futures::stream::Stream;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Stream payroll commands from an async reader
pub fn stream_commands<R: AsyncRead + Unpin + Send + 'static>(
    reader: R,
) -> impl Stream<Item = Result<CommandRow, csv_async::Error>> {
    let compat_reader = reader.compat();
    let csv_reader = AsyncReaderBuilder::new()
        .trim(csv_async::Trim::All)
        .flexible(true)
        .create_deserializer(compat_reader);

    csv_reader.into_deserialize::<CommandRow>()
}

pub async fn write_streams<W: AsyncWrite + Unpin>(
    mut writer: W,
    streams: Vec<StreamOutput>,
) -> Result<(), anyhow::Error> {
    writer
        .write_all(b"stream,employee,status,rate,cap,total_claimed,unclaimed,last_block\n")
        .await?;

    for stream in streams {
        let line = format!(
            "{},{},{},{:.4},{:.4},{:.4},{:.4},{}\n",
            stream.stream,
            stream.employee,
            stream.status.as_str(),
            stream.rate,
            stream.cap,
            stream.total_claimed,
            stream.unclaimed,
            stream.last_block
        );
        writer.write_all(line.as_bytes()).await?;
    }

    writer.flush().await?;
    Ok(())
}
