//! File transfer over a plain TCP byte stream.
//!
//! This module provides:
//! - Length-prefixed JSON head frames and accept/skip tokens
//! - A path walker that turns files and folder trees into batches
//! - The sender side (connect, handshake, stream chunks)
//! - The receiver side (per-connection sessions under an accept loop)

pub mod constants;
pub mod error;
pub mod protocol;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod walker;

// Re-export public API
pub use constants::CHUNK_SIZE;
pub use error::TransferError;
pub use protocol::{FileHead, Token};
pub use receiver::{SessionStats, handle_session};
pub use sender::{SendStats, send_to};
pub use server::run_server;
pub use walker::{Batch, TransferUnit};
