//! Wire protocol for the transfer handshake.
//!
//! Every control block is one `u32` big-endian length prefix followed by the
//! payload, capped at [`MAX_BLOCK_SIZE`]. The head frame carries JSON; the
//! decision and acknowledgement tokens carry short ASCII strings. File
//! payload bytes are sent raw between blocks, exactly `size` bytes per file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::constants::MAX_BLOCK_SIZE;
use super::error::{Result, TransferError};

/// Per-file metadata announced before the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHead {
    /// Path segments relative to the batch root; the last one is the file's
    /// base name, everything before it is a folder name.
    pub name: Vec<String>,
    /// Size of this file in bytes
    pub size: u64,
    /// Total bytes of every file in the enclosing batch
    #[serde(rename = "size_d")]
    pub dir_size: u64,
}

impl FileHead {
    /// Relative path under the save root, one component per segment.
    pub fn relative_path(&self) -> PathBuf {
        self.name.iter().collect()
    }

    /// Human-readable form for logs.
    pub fn display_name(&self) -> String {
        self.name.join("/")
    }
}

/// Receiver-to-sender signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Destination is free, payload bytes may follow
    Accept,
    /// Destination file already exists, skip the payload
    Skip,
    /// File fully written, send the next head frame
    Next,
}

impl Token {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Token::Accept => b"ok",
            Token::Skip => b"not",
            Token::Next => b"next",
        }
    }

    fn parse(bytes: &[u8]) -> Result<Self> {
        match bytes {
            b"ok" => Ok(Token::Accept),
            b"not" => Ok(Token::Skip),
            b"next" => Ok(Token::Next),
            other => Err(TransferError::Protocol(format!(
                "unrecognized token {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// Write one length-prefixed block.
pub async fn send_block<W: AsyncWrite + Unpin>(w: &mut W, payload: &[u8]) -> Result<()> {
    if payload.is_empty() || payload.len() > MAX_BLOCK_SIZE {
        return Err(TransferError::Protocol(format!(
            "block of {} bytes exceeds the {} byte limit",
            payload.len(),
            MAX_BLOCK_SIZE
        )));
    }
    w.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    w.write_all(payload).await?;
    w.flush().await?;
    Ok(())
}

/// Read one length-prefixed block.
pub async fn recv_block<R: AsyncRead + Unpin>(r: &mut R) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf).await?;
    read_block_body(r, u32::from_be_bytes(len_buf)).await
}

async fn read_block_body<R: AsyncRead + Unpin>(r: &mut R, len: u32) -> Result<Vec<u8>> {
    let len = len as usize;
    if len == 0 || len > MAX_BLOCK_SIZE {
        return Err(TransferError::Protocol(format!(
            "peer announced a {len} byte block, limit is {MAX_BLOCK_SIZE}"
        )));
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Send a head frame as one block.
pub async fn send_head<W: AsyncWrite + Unpin>(w: &mut W, head: &FileHead) -> Result<()> {
    let json = serde_json::to_vec(head)?;
    send_block(w, &json).await
}

/// Read a head frame; decode failure is fatal to the session.
pub async fn recv_head<R: AsyncRead + Unpin>(r: &mut R) -> Result<FileHead> {
    let block = recv_block(r).await?;
    Ok(serde_json::from_slice(&block)?)
}

/// Read a head frame, or `None` if the peer closed the connection instead of
/// sending another one (the normal end of a session).
pub async fn recv_head_or_eof<R: AsyncRead + Unpin>(r: &mut R) -> Result<Option<FileHead>> {
    let mut len_buf = [0u8; 4];
    match r.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let block = read_block_body(r, u32::from_be_bytes(len_buf)).await?;
    Ok(Some(serde_json::from_slice(&block)?))
}

/// Send a decision or acknowledgement token as one block.
pub async fn send_token<W: AsyncWrite + Unpin>(w: &mut W, token: Token) -> Result<()> {
    send_block(w, token.as_bytes()).await
}

/// Read one token block.
pub async fn recv_token<R: AsyncRead + Unpin>(r: &mut R) -> Result<Token> {
    let block = recv_block(r).await?;
    Token::parse(&block)
}
