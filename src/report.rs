//! Structural report produced by the analyzer, with text and JSON renderings.

use crate::formats::elf::relocations::RelocationSection;
use crate::formats::elf::segments::SegmentSections;
use crate::formats::elf::symbols::SymbolEntry;
use crate::formats::elf::{ElfMachine, ElfType};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A table a report section depends on but the file does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum MissingTable {
    #[error("no symbol table present")]
    SymbolTable,
    #[error("no symbol string table present")]
    SymbolStringTable,
}

/// Entries of a report section, or the condition that prevented them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TableReport<T> {
    Present(Vec<T>),
    Missing(MissingTable),
}

impl<T> TableReport<T> {
    pub fn entries(&self) -> Option<&[T]> {
        match self {
            Self::Present(v) => Some(v),
            Self::Missing(_) => None,
        }
    }

    pub fn missing(&self) -> Option<MissingTable> {
        match self {
            Self::Present(_) => None,
            Self::Missing(m) => Some(*m),
        }
    }
}

/// Header fields worth surfacing next to the tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSummary {
    pub file_type: ElfType,
    pub machine: ElfMachine,
    pub entry: u64,
    pub section_count: usize,
    pub segment_count: usize,
}

/// One section-table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub index: usize,
    pub name: String,
    pub sh_type: u32,
    pub offset: u64,
    pub size: u64,
}

/// Cross-referenced structure of one ELF file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElfReport {
    pub header: HeaderSummary,
    pub sections: Vec<SectionEntry>,
    pub segments: Vec<SegmentSections>,
    pub symbols: TableReport<SymbolEntry>,
    pub relocations: TableReport<RelocationSection>,
}

impl ElfReport {
    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Name reported for a symbol index, if it appears in the symbol report.
    pub fn symbol_name(&self, index: u64) -> Option<&str> {
        self.symbols
            .entries()?
            .iter()
            .find(|s| s.index == index)
            .map(|s| s.name.as_str())
    }
}

impl fmt::Display for ElfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sections:")?;
        for s in &self.sections {
            writeln!(f, "\t[{}]\t{}", s.index, s.name)?;
        }

        writeln!(f, "Segments:")?;
        for seg in &self.segments {
            writeln!(f, "\t[{}]\t{}", seg.index, seg.sections.join(" "))?;
        }

        writeln!(f, "Symbols:")?;
        match &self.symbols {
            TableReport::Present(symbols) => {
                for s in symbols {
                    writeln!(f, "\t[{}]\t{}\t{}\t{}", s.index, s.sym_type, s.size, s.name)?;
                }
            }
            TableReport::Missing(m) => writeln!(f, "\t{m}")?,
        }

        writeln!(f, "Relocations:")?;
        match &self.relocations {
            TableReport::Present(tables) => {
                for r in tables.iter().flat_map(|t| &t.entries) {
                    writeln!(f, "\t[{}]\t{}\t{}", r.index, r.symbol_index, r.name)?;
                }
            }
            TableReport::Missing(m) => writeln!(f, "\t{m}")?,
        }

        Ok(())
    }
}
