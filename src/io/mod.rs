//! Read-only file acquisition.
//!
//! `MappedFile` opens a path, checks its size against `IOLimits` and maps it
//! read-only. The map is released when the value is dropped.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Defines the resource limits for acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// An immutable view of a whole file.
pub struct MappedFile {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
}

impl MappedFile {
    /// Opens a file and memory-maps it read-only.
    ///
    /// Fails if the file cannot be opened, sized or mapped, or if its size
    /// exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let acquire = |action: &'static str| {
            move |source: std::io::Error| IoError::Acquire {
                action,
                path: path.display().to_string(),
                source,
            }
        };

        let file = File::open(path).map_err(acquire("open"))?;
        let file_size = file.metadata().map_err(acquire("stat"))?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening file"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the bytes are only ever
            // read through a shared slice.
            Some(unsafe { Mmap::map(&file) }.map_err(acquire("map"))?)
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// The mapped bytes, exactly the file length.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.bytes().len() as u64
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
