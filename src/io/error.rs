//! Custom error types for the I/O module.

use thiserror::Error;

/// Failure to acquire a file's bytes.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("Failed to {action} {path}: {source}")]
    Acquire {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;
