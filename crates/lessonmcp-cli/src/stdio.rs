//! Stdio transport — newline-delimited JSON-RPC on stdin/stdout.
//!
//! Each line is handled on its own task; responses funnel through one writer
//! task so lines never interleave. Logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::rpc::RpcDispatcher;

/// Serve stdin until EOF.
pub async fn run(dispatcher: Arc<RpcDispatcher>) -> Result<()> {
    info!("Stdio transport ready");
    serve_lines(dispatcher, BufReader::new(io::stdin()), io::stdout()).await?;
    info!("Stdin closed, stdio transport stopped");
    Ok(())
}

/// Read requests from `reader` until EOF and write responses to `writer`.
/// Returns the writer once every in-flight request has been answered.
pub async fn serve_lines<R, W>(dispatcher: Arc<RpcDispatcher>, mut reader: R, writer: W) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(writer)
    });

    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("failed to read stdin")?;
        if read == 0 {
            break;
        }

        // Invalid UTF-8 decodes lossily and then fails JSON parsing (-32700).
        let line = String::from_utf8_lossy(&buf).trim().to_string();
        if line.is_empty() {
            continue;
        }

        let dispatcher = dispatcher.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let Some(response) = dispatcher.handle_text(&line).await else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(text) => {
                    if tx.send(text).is_err() {
                        debug!("Writer gone, dropping response");
                    }
                }
                Err(e) => error!(error = %e, "Failed to serialize response"),
            }
        });
    }

    // The writer drains once the last in-flight task drops its sender.
    drop(tx);
    let writer = writer_task
        .await
        .context("stdout writer task panicked")?
        .context("failed to write stdout")?;
    Ok(writer)
}
