//! Relocation processing

use crate::formats::elf::sections::SectionTable;
use crate::formats::elf::symbols::{StringTable, SymbolTable};
use crate::formats::elf::types::*;
use crate::formats::elf::utils::{entry_at, entry_count, LeRead};
use serde::Serialize;
use tracing::{debug, trace};

/// One resolved relocation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationEntry {
    /// Index within its own relocation table
    pub index: u64,
    pub symbol_index: u64,
    pub name: String,
    pub offset: u64,
    pub reloc_type: u32,
    pub addend: i64,
}

/// Resolved entries of one `SHT_REL`/`SHT_RELA` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationSection {
    pub section_index: usize,
    pub section_name: String,
    pub is_rela: bool,
    pub entries: Vec<RelocationEntry>,
}

/// Resolves relocation symbol indices against a located symbol table
pub struct RelocationResolver<'s, 'a> {
    data: &'a [u8],
    symbols: &'s SymbolTable<'a>,
    strings: &'s StringTable<'a>,
}

impl<'s, 'a> RelocationResolver<'s, 'a> {
    pub fn new(
        data: &'a [u8],
        symbols: &'s SymbolTable<'a>,
        strings: &'s StringTable<'a>,
    ) -> Self {
        Self {
            data,
            symbols,
            strings,
        }
    }

    /// Every relocation section in index order, with entries whose target
    /// symbol has a name.
    pub fn resolve(&self, sections: &SectionTable<'a>) -> Result<Vec<RelocationSection>> {
        let mut out = Vec::new();
        for section in sections.sections() {
            if !section.header.is_relocation() {
                continue;
            }
            let entries = self.resolve_section(&section.header)?;
            debug!(
                section = section.index,
                name = %section.name,
                resolved = entries.len(),
                "Resolved relocation section"
            );
            out.push(RelocationSection {
                section_index: section.index,
                section_name: section.name.into_owned(),
                is_rela: section.header.sh_type == SHT_RELA,
                entries,
            });
        }
        Ok(out)
    }

    fn resolve_section(&self, header: &SectionHeader) -> Result<Vec<RelocationEntry>> {
        let is_rela = header.sh_type == SHT_RELA;
        let record_size = if is_rela { RELA_SIZE } else { REL_SIZE };
        let (count, stride) = entry_count(header.sh_size, header.sh_entsize, record_size);

        let mut entries = Vec::new();
        for index in 0..count {
            let raw = entry_at(self.data, header.sh_offset, index, stride, record_size)?;
            let reloc = parse_relocation(raw, is_rela)?;
            let symbol_index = reloc.symbol_index();

            let symbol = self.symbols.by_index(symbol_index)?;
            if symbol.is_anonymous() {
                trace!(index, symbol_index, "Skipping relocation to anonymous symbol");
                continue;
            }

            let name = self.strings.name_at(symbol.st_name)?;
            trace!(index, symbol_index, name = %name, "Relocation");
            entries.push(RelocationEntry {
                index,
                symbol_index,
                name: name.into_owned(),
                offset: reloc.r_offset,
                reloc_type: reloc.reloc_type(),
                addend: reloc.r_addend,
            });
        }
        Ok(entries)
    }
}

/// Parse a single relocation entry
fn parse_relocation(entry: &[u8], is_rela: bool) -> Result<Relocation> {
    let r_offset = entry.read_u64(0)?;
    let r_info = entry.read_u64(8)?;
    let r_addend = if is_rela { entry.read_i64(16)? } else { 0 };
    Ok(Relocation {
        r_offset,
        r_info,
        r_addend,
    })
}
