//! Chunked file encoding for `fileData` pushes.
//!
//! A file of length `L` is streamed to a peer as `ceil(L / C)` data chunks
//! of at most `C` bytes, followed by one empty terminal chunk:
//!
//! ```text
//! Chunk 1:   name, bytes[0 .. C),        is_script
//! Chunk 2:   name, bytes[C .. 2C),       is_script
//! Chunk N:   name, bytes[(N-1)C .. L),   is_script
//! Terminal:  name, [],                   is_script   ← end of file
//! ```
//!
//! An empty file is just the terminal chunk.  A read error aborts the
//! stream: the error is yielded once and no terminal chunk follows.
//!
//! The receiving side concatenates data chunks per name until the terminal
//! chunk arrives ([`FileAssembler`]).

use std::collections::HashMap;
use std::io::{ErrorKind, Read};

/// Default upper bound on bytes per `fileData` call.
pub const DEFAULT_CHUNK_SIZE: usize = 114_500;

/// Number of non-terminal chunks a file of `len` bytes produces.
///
/// A `chunk_size` of zero is treated as one, as in [`ChunkEncoder::new`].
pub fn data_chunk_count(len: u64, chunk_size: usize) -> u64 {
    len.div_ceil(chunk_size.max(1) as u64)
}

/// One `fileData` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferChunk {
    pub name: String,
    pub bytes: Vec<u8>,
    pub is_script: bool,
}

impl TransferChunk {
    /// An empty chunk marks end of file.
    pub fn is_terminal(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Encoder
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
    Streaming,
    Done,
}

/// Streams a reader as [`TransferChunk`]s.
///
/// Chunks are produced lazily so a large file is never held in memory
/// as a whole.
pub struct ChunkEncoder<R> {
    reader: R,
    name: String,
    is_script: bool,
    chunk_size: usize,
    state: EncoderState,
}

impl<R: Read> ChunkEncoder<R> {
    /// `chunk_size` must be non-zero.
    pub fn new(reader: R, name: impl Into<String>, is_script: bool, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be non-zero");
        Self {
            reader,
            name: name.into(),
            is_script,
            chunk_size: chunk_size.max(1),
            state: EncoderState::Streaming,
        }
    }

    /// Fill up to `chunk_size` bytes.  Short only at end of input.
    fn fill(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn chunk(&self, bytes: Vec<u8>) -> TransferChunk {
        TransferChunk {
            name: self.name.clone(),
            bytes,
            is_script: self.is_script,
        }
    }
}

impl<R: Read> Iterator for ChunkEncoder<R> {
    type Item = std::io::Result<TransferChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == EncoderState::Done {
            return None;
        }
        match self.fill() {
            Ok(bytes) => {
                if bytes.is_empty() {
                    self.state = EncoderState::Done;
                }
                Some(Ok(self.chunk(bytes)))
            }
            Err(e) => {
                self.state = EncoderState::Done;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> core::iter::FusedIterator for ChunkEncoder<R> {}

// ───────────────────────────────────────────────────────────────
// Receiver-side reassembly
// ───────────────────────────────────────────────────────────────

/// Reassembly buffers for incoming `fileData` frames, keyed by file name.
pub struct FileAssembler {
    pending: HashMap<String, Vec<u8>>,
}

impl FileAssembler {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Feed one frame.
    ///
    /// Returns `Some(complete_file)` when the terminal frame for `name`
    /// arrives.  Returns `None` while more frames are expected.
    pub fn feed(&mut self, name: &str, bytes: &[u8]) -> Option<Vec<u8>> {
        if bytes.is_empty() {
            return Some(self.pending.remove(name).unwrap_or_default());
        }
        self.pending
            .entry(name.to_owned())
            .or_default()
            .extend_from_slice(bytes);
        None
    }

    /// Discard a partial file (e.g. the sender aborted).
    pub fn reset(&mut self, name: &str) {
        self.pending.remove(name);
    }

    /// Whether any file is mid-reassembly.
    pub fn is_active(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Default for FileAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
