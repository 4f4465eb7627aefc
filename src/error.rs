//! Error types for elfscope.
//!
//! Wraps the analyzer and acquisition errors in one crate-level type using
//! thiserror.

use crate::formats::elf::ElfError;
use crate::io::error::IoError;
use thiserror::Error;

/// Main error type for elfscope operations.
#[derive(Debug, Error)]
pub enum ElfscopeError {
    /// Malformed ELF content (bad identification or out-of-bounds tables)
    #[error(transparent)]
    Elf(#[from] ElfError),

    /// The input file could not be acquired
    #[error(transparent)]
    Acquisition(#[from] IoError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ElfscopeError {
    /// Wrong magic, class or encoding.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Elf(e) if e.is_format_error())
    }

    /// A table, entry or string pointed outside the file.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::Elf(e) if e.is_out_of_bounds())
    }
}

/// Result type alias for elfscope operations
pub type Result<T> = std::result::Result<T, ElfscopeError>;
