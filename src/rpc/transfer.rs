//! File and script push to a peer over `fileData`.
//!
//! Every push, whether it completes, fails mid-stream, or finds no file,
//! ends with exactly one [`AppEvent::TransferFinished`].  A scope guard
//! emits it on every exit path, including early returns via `?`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::Result;

use super::capability::Capability;
use super::chunked::ChunkEncoder;

/// How a push ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// All data chunks and the terminal chunk were delivered.
    Sent { chunks: u64, bytes: u64 },
    /// The path does not exist; nothing was sent.
    Missing,
}

/// Name a file travels under: its final path component.
pub fn transfer_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Stream `path` to `target` in `chunk_size` pieces.
///
/// A failing `fileData` call or local read aborts the push without a
/// terminal chunk; the error is returned for logging.
pub fn send_file(
    target: Capability<'_>,
    path: &Path,
    is_script: bool,
    chunk_size: usize,
    sink: &dyn EventSink,
) -> Result<TransferOutcome> {
    let name = transfer_name(path);
    let _finished = scopeguard::guard(name.clone(), |name| {
        sink.emit(&AppEvent::TransferFinished { name });
    });

    if !path.exists() {
        warn!("Transfer: {} does not exist, skipping", path.display());
        return Ok(TransferOutcome::Missing);
    }

    let file = File::open(path)?;
    let len = file.metadata()?.len();
    info!(
        "Transfer: begin {} ({} bytes, script={}) to {}",
        name,
        len,
        is_script,
        target.device_type()
    );

    let mut chunks = 0u64;
    let mut bytes = 0u64;
    for chunk in ChunkEncoder::new(BufReader::new(file), name.as_str(), is_script, chunk_size) {
        let chunk = chunk?;
        target.file_data(&chunk.name, &chunk.bytes, chunk.is_script)?;
        if !chunk.is_terminal() {
            chunks += 1;
            bytes += chunk.bytes.len() as u64;
            debug!("Transfer: {} chunk {} ({} bytes)", name, chunks, chunk.bytes.len());
        }
    }

    info!("Transfer: {} complete ({} chunks, {} bytes)", name, chunks, bytes);
    Ok(TransferOutcome::Sent { chunks, bytes })
}
