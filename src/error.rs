use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI format error: {0}")]
    Format(String),

    #[error("Unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Chunk '{tag}' declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        tag: String,
        declared: usize,
        available: usize,
    },

    #[error("G-code parse error at line {line}: {message}")]
    GcodeParse { line: usize, message: String },

    #[error("Unknown printer: {0}")]
    UnknownPrinter(String),

    #[error("Invalid motion configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
