//! Send and receive files and folder trees across the network.
//!
//! The wire protocol is a per-file handshake over a plain TCP stream: the
//! sender announces each file with a JSON head frame, the receiver answers
//! with an accept/skip token (files that already exist at the destination are
//! skipped), and accepted files are streamed in fixed-size chunks. Directory
//! structure is reconstructed under the receiver's save root.

pub mod config;
pub mod transfer;

pub use transfer::{run_server, send_to};
