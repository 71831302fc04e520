//! Receiver session: one per accepted connection.
//!
//! The session is a loop over head frames. Each frame opens a batch whose
//! `dir_size` tells the session how many bytes to account for before the
//! next batch begins; files that already exist at the destination are
//! skipped but still counted against the batch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::constants::CHUNK_SIZE;
use super::error::{Result, TransferError};
use super::protocol::{self, FileHead, Token};

/// Bookkeeping for one session, across all of its batches.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionStats {
    /// Files written to disk
    pub files_written: u64,
    /// Files skipped because the destination already existed
    pub files_skipped: u64,
    /// Bytes accounted for (written or skipped)
    pub bytes_accounted: u64,
}

/// Run a receiver session until the peer closes the connection, the stop
/// signal fires, or an unrecoverable error ends it.
pub async fn handle_session<S>(
    stream: &mut S,
    save_root: &Path,
    shutdown: &CancellationToken,
) -> Result<SessionStats>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stats = SessionStats::default();
    loop {
        if shutdown.is_cancelled() {
            break;
        }
        let head = match protocol::recv_head_or_eof(stream).await? {
            Some(head) => head,
            None => break,
        };
        if !receive_batch(stream, save_root, head, shutdown, &mut stats).await? {
            break;
        }
    }
    Ok(stats)
}

/// Account for one batch; returns false if the stop signal interrupted it.
async fn receive_batch<S>(
    stream: &mut S,
    save_root: &Path,
    first: FileHead,
    shutdown: &CancellationToken,
    stats: &mut SessionStats,
) -> Result<bool>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let dir_size = first.dir_size;
    let mut progress: u64 = 0;
    let mut head = first;
    loop {
        if shutdown.is_cancelled() {
            return Ok(false);
        }
        match receive_unit(stream, save_root, &head, shutdown, stats).await? {
            Some(accounted) => progress += accounted,
            // Interrupted mid-stream; the partial file stays on disk.
            None => return Ok(false),
        }
        debug!(progress, dir_size, "batch progress");
        if progress >= dir_size {
            return Ok(true);
        }
        head = protocol::recv_head(stream).await?;
    }
}

/// Decide, then skip or stream one file. Returns the bytes accounted for,
/// or `None` if the stop signal fired during the payload.
async fn receive_unit<S>(
    stream: &mut S,
    save_root: &Path,
    head: &FileHead,
    shutdown: &CancellationToken,
    stats: &mut SessionStats,
) -> Result<Option<u64>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let dest = dest_path(save_root, head)?;

    if head.name.len() > 1 {
        if let Some(parent) = dest.parent() {
            // Another session may be creating the same folders right now;
            // "already exists" is success, not an error.
            if let Err(e) = fs::create_dir_all(parent).await {
                if e.kind() != ErrorKind::AlreadyExists {
                    return Err(e.into());
                }
            }
        }
    }

    if fs::try_exists(&dest).await? {
        protocol::send_token(stream, Token::Skip).await?;
        info!(file = %head.display_name(), "already present, skipping");
        stats.files_skipped += 1;
        stats.bytes_accounted += head.size;
        return Ok(Some(head.size));
    }

    protocol::send_token(stream, Token::Accept).await?;
    info!(file = %head.display_name(), size = head.size, "receiving");

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&dest)
        .await?;

    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut received: u64 = 0;
    while received < head.size {
        if shutdown.is_cancelled() {
            warn!(file = %head.display_name(), received, "stopped mid-transfer, partial file left");
            file.flush().await?;
            return Ok(None);
        }
        let to_read = CHUNK_SIZE.min((head.size - received) as usize);
        stream.read_exact(&mut buffer[..to_read]).await?;
        file.write_all(&buffer[..to_read]).await?;
        received += to_read as u64;
    }
    file.flush().await?;
    drop(file);

    protocol::send_token(stream, Token::Next).await?;
    info!(file = %head.display_name(), "received");
    stats.files_written += 1;
    stats.bytes_accounted += head.size;
    Ok(Some(head.size))
}

/// Destination path = save root plus the head's segments. Segments must be
/// plain names: no separators, no "..", nothing absolute.
fn dest_path(save_root: &Path, head: &FileHead) -> Result<PathBuf> {
    if head.name.is_empty() {
        return Err(TransferError::Protocol("head frame with empty name".into()));
    }
    let mut dest = save_root.to_path_buf();
    for segment in &head.name {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains('/')
            || segment.contains('\\')
        {
            return Err(TransferError::Protocol(format!(
                "unsafe path segment {segment:?}"
            )));
        }
        dest.push(segment);
    }
    Ok(dest)
}
