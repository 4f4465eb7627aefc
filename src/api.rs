//! Entry points combining acquisition and analysis.

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::formats::elf::ElfAnalyzer;
use crate::io::MappedFile;
use crate::report::ElfReport;
use std::path::Path;
use tracing::info_span;

/// Analyze an in-memory buffer.
pub fn analyze_bytes(data: &[u8], config: &AnalyzerConfig) -> Result<ElfReport> {
    let analyzer = ElfAnalyzer::with_config(data, config.clone())?;
    Ok(analyzer.analyze()?)
}

/// Map `path` read-only, analyze it, and release the map.
pub fn analyze_path<P: AsRef<Path>>(path: P, config: &AnalyzerConfig) -> Result<ElfReport> {
    let path = path.as_ref();
    let span = info_span!("analyze_path", path = %path.display());
    let _guard = span.enter();

    let file = MappedFile::open(path, &config.io)?;
    analyze_bytes(file.bytes(), config)
}
