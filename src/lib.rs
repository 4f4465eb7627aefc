//! Read-only structural analyzer for 64-bit little-endian ELF files.
//!
//! Validates the header, then cross-references sections, segments, symbols
//! and relocations into an [`report::ElfReport`].

pub mod api;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod logging;
pub mod report;

pub use api::{analyze_bytes, analyze_path};
pub use config::AnalyzerConfig;
pub use error::{ElfscopeError, Result};
pub use formats::elf::ElfAnalyzer;
pub use report::{ElfReport, MissingTable, TableReport};
