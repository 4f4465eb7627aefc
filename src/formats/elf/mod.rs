//! ELF64 little-endian structural analyzer
//!
//! Walks the header, section, program header, symbol and relocation tables
//! of a borrowed buffer. Every read is bounds-checked.

pub mod headers;
pub mod relocations;
pub mod sections;
pub mod segments;
pub mod symbols;
pub mod types;
pub mod utils;

use crate::config::AnalyzerConfig;
use crate::report::{ElfReport, HeaderSummary, MissingTable, SectionEntry, TableReport};
use headers::parse_header;
use relocations::{RelocationResolver, RelocationSection};
use sections::SectionTable;
use segments::{SegmentSections, SegmentTable};
use symbols::{StringTable, SymbolEntry, SymbolTable};
use tracing::{debug, info_span, warn};
pub use types::*;

/// Analysis context: the borrowed buffer with its validated header and
/// section table.
pub struct ElfAnalyzer<'data> {
    data: &'data [u8],
    header: ElfHeader,
    sections: SectionTable<'data>,
    config: AnalyzerConfig,
}

impl<'data> ElfAnalyzer<'data> {
    /// Validate the header and read the section table
    pub fn new(data: &'data [u8]) -> Result<Self> {
        Self::with_config(data, AnalyzerConfig::default())
    }

    pub fn with_config(data: &'data [u8], config: AnalyzerConfig) -> Result<Self> {
        let header = parse_header(data)?;
        let sections = SectionTable::parse(data, &header)?;

        Ok(Self {
            data,
            header,
            sections,
            config,
        })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Get raw data
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Get sections
    pub fn sections(&self) -> &SectionTable<'data> {
        &self.sections
    }

    /// Get segments
    pub fn segments(&self) -> Result<SegmentTable> {
        SegmentTable::parse(self.data, &self.header)
    }

    /// Section index and name listing
    pub fn section_entries(&self) -> Vec<SectionEntry> {
        self.sections
            .sections()
            .map(|s| SectionEntry {
                index: s.index,
                name: s.name.into_owned(),
                sh_type: s.header.sh_type,
                offset: s.header.sh_offset,
                size: s.header.sh_size,
            })
            .collect()
    }

    /// Contained section names per segment
    pub fn segment_map(&self) -> Result<Vec<SegmentSections>> {
        Ok(self.segments()?.map_sections(&self.sections))
    }

    /// The first symbol table section, if any
    pub fn symbol_table(&self) -> Option<SymbolTable<'data>> {
        SymbolTable::locate(self.data, &self.sections)
    }

    /// Symbol table together with its string table, or what is missing.
    fn symbol_context(&self) -> Result<SymbolContext<'data>> {
        let Some(symtab) = self.symbol_table() else {
            warn!("No symbol table present");
            return Ok(Err(MissingTable::SymbolTable));
        };
        let strtab = symtab.resolve_strtab(
            &self.sections,
            self.config.strtab_policy,
            &self.config.strtab_name,
        )?;
        Ok(strtab
            .map(|strings| (symtab, strings))
            .ok_or(MissingTable::SymbolStringTable))
    }

    /// Named symbols of the symbol table
    pub fn symbols(&self) -> Result<TableReport<SymbolEntry>> {
        symbol_report(&self.symbol_context()?)
    }

    /// Relocations resolved against the symbol table
    pub fn relocations(&self) -> Result<TableReport<RelocationSection>> {
        self.relocation_report(&self.symbol_context()?)
    }

    fn relocation_report(
        &self,
        context: &SymbolContext<'data>,
    ) -> Result<TableReport<RelocationSection>> {
        Ok(match context {
            Ok((symtab, strings)) => {
                let resolver = RelocationResolver::new(self.data, symtab, strings);
                TableReport::Present(resolver.resolve(&self.sections)?)
            }
            Err(missing) => TableReport::Missing(*missing),
        })
    }

    /// Run every pass and collect the structural report
    pub fn analyze(&self) -> Result<ElfReport> {
        let span = info_span!("analyze", size = self.data.len());
        let _guard = span.enter();

        let segments = self.segment_map()?;
        // Both passes share one symbol table lookup
        let context = self.symbol_context()?;
        let symbols = symbol_report(&context)?;
        let relocations = self.relocation_report(&context)?;

        let report = ElfReport {
            header: HeaderSummary {
                file_type: self.header.file_type(),
                machine: self.header.machine(),
                entry: self.header.entry_point(),
                section_count: self.sections.count(),
                segment_count: segments.len(),
            },
            sections: self.section_entries(),
            segments,
            symbols,
            relocations,
        };

        debug!(
            sections = report.sections.len(),
            segments = report.segments.len(),
            "Analysis complete"
        );

        Ok(report)
    }
}

/// The located symbol and string tables, or the table that is missing.
type SymbolContext<'data> =
    std::result::Result<(SymbolTable<'data>, StringTable<'data>), MissingTable>;

fn symbol_report(context: &SymbolContext<'_>) -> Result<TableReport<SymbolEntry>> {
    Ok(match context {
        Ok((symtab, strings)) => TableReport::Present(symtab.named_symbols(strings)?),
        Err(missing) => TableReport::Missing(*missing),
    })
}
