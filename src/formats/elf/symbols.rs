//! Symbol table location and enumeration

use crate::formats::elf::sections::SectionTable;
use crate::formats::elf::types::*;
use crate::formats::elf::utils::{entry_at, entry_count, read_cstring, LeRead};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// How the string table holding symbol names is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrtabPolicy {
    /// The symbol table's `sh_link`, falling back to a name match.
    #[default]
    LinkThenName,
    /// Only the symbol table's `sh_link`.
    LinkOnly,
    /// Only a section with the configured name.
    NameOnly,
}

/// A string table section
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    pub section_index: usize,
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    pub fn new(section_index: usize, data: &'a [u8]) -> Self {
        Self {
            section_index,
            data,
        }
    }

    /// NUL-terminated name starting at `offset`
    pub fn name_at(&self, offset: u32) -> Result<Cow<'a, str>> {
        read_cstring(self.data, u64::from(offset))
    }
}

/// One named symbol as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub index: u64,
    pub sym_type: u8,
    pub binding: u8,
    pub size: u64,
    pub value: u64,
    pub name: String,
}

/// The located symbol table section
#[derive(Debug, Clone, Copy)]
pub struct SymbolTable<'a> {
    data: &'a [u8],
    pub section_index: usize,
    pub header: SectionHeader,
    count: u64,
    stride: u64,
}

impl<'a> SymbolTable<'a> {
    /// The first `SHT_SYMTAB` section in index order, if any.
    pub fn locate(data: &'a [u8], sections: &SectionTable<'a>) -> Option<Self> {
        let section = sections.first_of_type(SHT_SYMTAB)?;
        let (count, stride) =
            entry_count(section.header.sh_size, section.header.sh_entsize, SYM_SIZE);
        debug!(
            section = section.index,
            name = %section.name,
            count,
            "Located symbol table"
        );
        Some(Self {
            data,
            section_index: section.index,
            header: section.header,
            count,
            stride,
        })
    }

    /// Number of entries, including anonymous ones
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Symbol at `index`, read directly at `sh_offset + index * stride`.
    pub fn by_index(&self, index: u64) -> Result<Symbol> {
        if index >= self.count {
            return Err(ElfError::SymbolIndexOutOfRange {
                index,
                count: self.count,
            });
        }
        let entry = entry_at(self.data, self.header.sh_offset, index, self.stride, SYM_SIZE)?;
        parse_symbol(entry)
    }

    /// Find the string table holding this table's symbol names.
    pub fn resolve_strtab(
        &self,
        sections: &SectionTable<'a>,
        policy: StrtabPolicy,
        strtab_name: &str,
    ) -> Result<Option<StringTable<'a>>> {
        let by_link = || {
            let link = self.header.sh_link as usize;
            sections
                .by_index(link)
                .filter(|s| link != 0 && s.header.sh_type == SHT_STRTAB)
        };
        let by_name = || sections.by_name(strtab_name);

        let section = match policy {
            StrtabPolicy::LinkThenName => by_link().or_else(by_name),
            StrtabPolicy::LinkOnly => by_link(),
            StrtabPolicy::NameOnly => by_name(),
        };

        match section {
            Some(s) => {
                debug!(section = s.index, name = %s.name, ?policy, "Resolved symbol string table");
                let bytes = sections.section_data(&s.header)?;
                Ok(Some(StringTable::new(s.index, bytes)))
            }
            None => {
                warn!(?policy, "No symbol string table found");
                Ok(None)
            }
        }
    }

    /// All symbols with a name, in ascending index order.
    pub fn named_symbols(&self, strings: &StringTable<'a>) -> Result<Vec<SymbolEntry>> {
        let mut out = Vec::new();
        for index in 0..self.count {
            let sym = self.by_index(index)?;
            if sym.is_anonymous() {
                continue;
            }
            let name = strings.name_at(sym.st_name)?;
            trace!(index, name = %name, "Symbol");
            out.push(SymbolEntry {
                index,
                sym_type: sym.st_type(),
                binding: sym.st_bind(),
                size: sym.st_size,
                value: sym.st_value,
                name: name.into_owned(),
            });
        }
        debug!(named = out.len(), total = self.count, "Enumerated symbols");
        Ok(out)
    }
}

/// Parse a single 24-byte symbol entry
fn parse_symbol(entry: &[u8]) -> Result<Symbol> {
    Ok(Symbol {
        st_name: entry.read_u32(0)?,
        st_info: entry.read_u8(4)?,
        st_other: entry.read_u8(5)?,
        st_shndx: entry.read_u16(6)?,
        st_value: entry.read_u64(8)?,
        st_size: entry.read_u64(16)?,
    })
}
