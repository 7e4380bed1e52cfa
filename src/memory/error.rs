// Mon Jan 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("read of {len} bytes at offset {offset} out of bounds (window size {size})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("seek to {0} outside of window")]
    BadSeek(i64),
    #[error("unterminated string at offset {0}")]
    UnterminatedString(usize),
    #[error("subbuffer end {end} exceeds window size {size}")]
    BadSubbuffer { end: usize, size: usize },
}
