//! Section table management

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{entry_at, read_cstring, LeRead};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Conventional name of the symbol string table.
pub const STRTAB_NAME: &str = ".strtab";

/// Section table with resolved names
pub struct SectionTable<'a> {
    headers: Vec<SectionHeader>,
    names: Vec<Cow<'a, str>>,
    data: &'a [u8],
    by_name: HashMap<String, usize>,
}

impl<'a> SectionTable<'a> {
    /// Parse section table from ELF data
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let sh_num = u64::from(header.e_shnum);
        let sh_entsize = u64::from(header.e_shentsize);

        let headers = (0..sh_num)
            .map(|i| {
                let entry = entry_at(data, header.e_shoff, i, sh_entsize, SHDR_SIZE)?;
                parse_section_header(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        // Section-name string table
        let shstrndx = header.e_shstrndx;
        let strings: &[u8] = if headers.is_empty() || shstrndx == SHN_UNDEF {
            &[]
        } else {
            let str_header = headers
                .get(usize::from(shstrndx))
                .ok_or(ElfError::InvalidSectionIndex(shstrndx))?;
            data.slice_at(str_header.sh_offset, str_header.sh_size)?
        };

        let mut names = Vec::with_capacity(headers.len());
        let mut by_name = HashMap::new();
        for (i, sh) in headers.iter().enumerate() {
            let name = if strings.is_empty() {
                Cow::Borrowed("")
            } else {
                read_cstring(strings, u64::from(sh.sh_name))?
            };
            trace!(index = i, name = %name, sh_type = sh.sh_type, "Section");
            by_name.insert(name.to_string(), i);
            names.push(name);
        }

        debug!(count = headers.len(), "Parsed section table");

        Ok(Self {
            headers,
            names,
            data,
            by_name,
        })
    }

    /// Get section by index
    pub fn by_index(&self, index: usize) -> Option<Section<'a>> {
        let header = self.headers.get(index)?;
        Some(Section {
            index,
            name: self.names[index].clone(),
            header: *header,
        })
    }

    /// Get section by name. With duplicate names the last one wins.
    pub fn by_name(&self, name: &str) -> Option<Section<'a>> {
        self.by_name.get(name).and_then(|&idx| self.by_index(idx))
    }

    /// Header at `index`
    pub fn header(&self, index: usize) -> Option<&SectionHeader> {
        self.headers.get(index)
    }

    /// Name at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_ref())
    }

    /// The symbol string table located by its conventional name.
    pub fn strtab_by_name(&self) -> Option<Section<'a>> {
        self.by_name(STRTAB_NAME)
    }

    /// Get all sections in index order
    pub fn sections(&self) -> impl Iterator<Item = Section<'a>> + '_ {
        (0..self.headers.len()).filter_map(move |i| self.by_index(i))
    }

    /// Headers in index order
    pub fn headers(&self) -> &[SectionHeader] {
        &self.headers
    }

    /// First section of the given type
    pub fn first_of_type(&self, sh_type: u32) -> Option<Section<'a>> {
        self.headers
            .iter()
            .position(|h| h.sh_type == sh_type)
            .and_then(|i| self.by_index(i))
    }

    /// File contents of a section. `SHT_NOBITS` sections are empty.
    pub fn section_data(&self, header: &SectionHeader) -> Result<&'a [u8]> {
        self.data.slice_at(header.sh_offset, header.file_size())
    }

    /// Count sections
    pub fn count(&self) -> usize {
        self.headers.len()
    }
}

/// Parse a single 64-byte section header
fn parse_section_header(entry: &[u8]) -> Result<SectionHeader> {
    Ok(SectionHeader {
        sh_name: entry.read_u32(0)?,
        sh_type: entry.read_u32(4)?,
        sh_flags: entry.read_u64(8)?,
        sh_addr: entry.read_u64(16)?,
        sh_offset: entry.read_u64(24)?,
        sh_size: entry.read_u64(32)?,
        sh_link: entry.read_u32(40)?,
        sh_info: entry.read_u32(44)?,
        sh_addralign: entry.read_u64(48)?,
        sh_entsize: entry.read_u64(56)?,
    })
}
