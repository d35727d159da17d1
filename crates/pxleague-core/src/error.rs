use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Truncated header: file is {len} bytes, at least {required} required")]
    TruncatedHeader { len: usize, required: usize },

    #[error("Record {index} at offset {offset} (+{record_size}) exceeds file length {file_len}")]
    OutOfRange {
        index: usize,
        offset: usize,
        record_size: usize,
        file_len: usize,
    },

    #[error("Read of {len} bytes at offset {offset} exceeds buffer length {buffer_len}")]
    BufferOverrun {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    #[error("Unrecoverable I/O on {path:?}: {source}")]
    UnrecoverableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Options parse error: {0}")]
    OptionsParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn unrecoverable_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::UnrecoverableIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
