//! Receiver-side configuration glue: save-root resolution and port probing.

use std::net::TcpListener;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::UserDirs;
use tracing::debug;

const SAVE_DIR_NAME: &str = "NetShare";

/// Candidate ports tried in order when the receiver is started without one.
pub const PORT_CANDIDATES: [u16; 16] = [
    8000, 8001, 1578, 1233, 2578, 31293, 4319, 42780, 1783, 3301, 1890, 1234, 1901, 6490, 61514,
    14312,
];

/// Default folder for received items: `~/NetShare`.
pub fn default_save_root() -> PathBuf {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SAVE_DIR_NAME)
}

/// First candidate port that can actually be bound, if any.
pub fn pick_available_port() -> Option<u16> {
    PORT_CANDIDATES.into_iter().find(|&port| {
        let free = TcpListener::bind(("127.0.0.1", port)).is_ok();
        if !free {
            debug!(port, "candidate port busy");
        }
        free
    })
}

/// Ensure the save root exists and is a directory.
pub fn prepare_save_root(save_root: &Path) -> Result<()> {
    if save_root.is_file() {
        bail!("{} should be a folder", save_root.display());
    }
    std::fs::create_dir_all(save_root)
        .with_context(|| format!("error creating folder {}", save_root.display()))?;
    Ok(())
}
