//! Error types shared across the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid die: {sides} sides is outside the supported range {min}..={max}")]
    InvalidDie { sides: u32, min: u32, max: u32 },

    #[error("failed to parse roll {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
