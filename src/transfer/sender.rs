//! Sender side of the transfer protocol.
//!
//! For every unit in walker order: send the head frame, wait for the peer's
//! decision, and stream the file in fixed-size chunks if accepted. The
//! receiver's decision gates the payload; not a single content byte is sent
//! before the accept token arrives.

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::constants::CHUNK_SIZE;
use super::error::{Result, TransferError};
use super::protocol::{self, Token};
use super::walker::{self, TransferUnit};

/// Outcome counters for one sender run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendStats {
    /// Files whose payload was transferred
    pub files_sent: u64,
    /// Files the receiver already had
    pub files_skipped: u64,
    /// Payload bytes put on the wire
    pub bytes_sent: u64,
}

/// Connect to a receiver and send every unit of every source path.
///
/// Missing source paths are logged and skipped. The socket is shut down
/// gracefully at the end; errors while closing are logged, not propagated.
pub async fn send_to(addr: SocketAddr, paths: &[PathBuf]) -> Result<SendStats> {
    info!(%addr, "connecting to receiver");
    let mut stream = TcpStream::connect(addr).await?;
    let result = send_batches(&mut stream, paths).await;
    if let Err(e) = stream.shutdown().await {
        warn!(error = %e, "error closing connection");
    }
    result
}

/// Drive the per-unit handshake over an established stream.
pub async fn send_batches<S>(stream: &mut S, paths: &[PathBuf]) -> Result<SendStats>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stats = SendStats::default();
    for batch in walker::scan_sources(paths) {
        for unit in &batch.units {
            send_unit(stream, unit, &mut stats).await?;
        }
    }
    info!(
        sent = stats.files_sent,
        skipped = stats.files_skipped,
        bytes = stats.bytes_sent,
        "all units processed"
    );
    Ok(stats)
}

async fn send_unit<S>(stream: &mut S, unit: &TransferUnit, stats: &mut SendStats) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    protocol::send_head(stream, &unit.head).await?;

    match protocol::recv_token(stream).await? {
        Token::Accept => {
            info!(file = %unit.head.display_name(), size = unit.head.size, "sending");
            let mut file = File::open(&unit.path).await?;
            let mut buffer = vec![0u8; CHUNK_SIZE];
            loop {
                let n = file.read(&mut buffer).await?;
                if n == 0 {
                    break;
                }
                stream.write_all(&buffer[..n]).await?;
                stats.bytes_sent += n as u64;
            }
            stream.flush().await?;

            // Synchronization point before the next head frame; the value is
            // only logged, never interpreted.
            let ack = protocol::recv_block(stream).await?;
            debug!(ack = %String::from_utf8_lossy(&ack), "receiver acknowledged");
            info!(file = %unit.head.display_name(), "done sending");
            stats.files_sent += 1;
        }
        Token::Skip => {
            info!(file = %unit.head.display_name(), "file already exists at destination");
            stats.files_skipped += 1;
        }
        other => {
            return Err(TransferError::Protocol(format!(
                "expected accept/skip decision, got {other:?}"
            )));
        }
    }
    Ok(())
}
