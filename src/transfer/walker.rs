//! Enumerates source paths into batches of transfer units.
//!
//! A batch is everything derived from one top-level source path: a single
//! file, or every non-empty file under a folder tree. Every unit in a batch
//! carries the same `dir_size` so the receiver knows when the batch is done.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use super::protocol::FileHead;

/// One file staged for sending: the wire head plus the local source path.
#[derive(Debug, Clone)]
pub struct TransferUnit {
    pub head: FileHead,
    pub path: PathBuf,
}

/// All units derived from one top-level source path.
#[derive(Debug, Default)]
pub struct Batch {
    pub units: Vec<TransferUnit>,
}

impl Batch {
    pub fn total_bytes(&self) -> u64 {
        self.units.iter().map(|u| u.head.size).sum()
    }
}

/// Enumerate one source path into a batch.
///
/// Zero-byte files are never emitted. A missing path is an error the caller
/// reports and skips; it must not abort the rest of the run.
pub fn scan_source(input: &Path) -> io::Result<Batch> {
    // Trailing separators are irrelevant for file_name(), but an explicit
    // component-wise rebuild keeps "dir/" and "dir" identical everywhere.
    let input: PathBuf = input.components().collect();

    let meta = std::fs::metadata(&input)?;
    let base = segment_of(&input)?;

    let mut batch = Batch::default();
    if meta.is_file() {
        if meta.len() == 0 {
            warn!(path = %input.display(), "skipping empty file");
            return Ok(batch);
        }
        batch.units.push(TransferUnit {
            head: FileHead {
                name: vec![base],
                size: meta.len(),
                dir_size: meta.len(),
            },
            path: input,
        });
        return Ok(batch);
    }

    // First pass: the batch size every head frame will carry.
    let dir_size: u64 = walk_files(&input).map(|(_, len)| len).sum();

    // Second pass: one unit per non-empty file, in traversal order.
    for (path, len) in walk_files(&input) {
        let mut name = vec![base.clone()];
        let rel = path
            .strip_prefix(&input)
            .expect("walkdir entries live under their root");
        for component in rel.components() {
            name.push(component.as_os_str().to_string_lossy().into_owned());
        }
        batch.units.push(TransferUnit {
            head: FileHead {
                name,
                size: len,
                dir_size,
            },
            path,
        });
    }
    Ok(batch)
}

/// Enumerate several source paths; missing or unreadable ones are logged and
/// skipped without aborting the rest.
pub fn scan_sources(inputs: &[PathBuf]) -> Vec<Batch> {
    let mut batches = Vec::new();
    for input in inputs {
        match scan_source(input) {
            Ok(batch) => batches.push(batch),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %input.display(), "file or directory not found");
            }
            Err(e) => {
                warn!(path = %input.display(), error = %e, "cannot read source, skipping");
            }
        }
    }
    batches
}

/// Non-empty regular files under `root`, with sizes, in walkdir order.
/// Unreadable entries are logged and skipped.
fn walk_files(root: &Path) -> impl Iterator<Item = (PathBuf, u64)> + '_ {
    WalkDir::new(root).into_iter().filter_map(|entry| {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                return None;
            }
        };
        if !entry.file_type().is_file() {
            return None;
        }
        let len = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping entry");
                return None;
            }
        };
        if len == 0 {
            return None;
        }
        Some((entry.into_path(), len))
    })
}

fn segment_of(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no base name", path.display()),
            )
        })
}
