//! Fuzz target: `ChunkEncoder` + `FileAssembler`
//!
//! The first byte picks a chunk size; the rest is the file.  Asserts that
//! encoding never yields an oversized chunk, ends with exactly one empty
//! terminal chunk, and reassembles to the original bytes.
//!
//! cargo fuzz run fuzz_chunk_encoder

#![no_main]

use std::io::Cursor;

use izconnect::rpc::chunked::{ChunkEncoder, FileAssembler};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&size, file)) = data.split_first() else {
        return;
    };
    let chunk_size = usize::from(size) + 1;

    let mut asm = FileAssembler::new();
    let mut complete = None;
    let mut terminals = 0;
    for chunk in ChunkEncoder::new(Cursor::new(file), "fuzz", false, chunk_size) {
        let chunk = chunk.expect("in-memory reads cannot fail");
        assert!(chunk.bytes.len() <= chunk_size);
        assert!(complete.is_none(), "no chunk may follow the terminal");
        if chunk.is_terminal() {
            terminals += 1;
        }
        complete = asm.feed(&chunk.name, &chunk.bytes);
    }

    assert_eq!(terminals, 1);
    assert_eq!(complete.as_deref(), Some(file));
});
