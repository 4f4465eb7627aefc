//! Program header table and segment-to-section mapping

use crate::formats::elf::sections::SectionTable;
use crate::formats::elf::types::*;
use crate::formats::elf::utils::{entry_at, LeRead};
use serde::Serialize;
use tracing::{debug, trace};

/// Segment table in program header order
pub struct SegmentTable {
    headers: Vec<ProgramHeader>,
}

/// Sections whose file extent lies inside one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentSections {
    pub index: usize,
    pub p_type: u32,
    pub type_name: Option<&'static str>,
    pub offset: u64,
    pub file_size: u64,
    pub sections: Vec<String>,
}

impl SegmentTable {
    /// Parse the program header table
    pub fn parse(data: &[u8], header: &ElfHeader) -> Result<Self> {
        let ph_num = u64::from(header.e_phnum);
        let ph_entsize = u64::from(header.e_phentsize);

        let headers = (0..ph_num)
            .map(|i| {
                let entry = entry_at(data, header.e_phoff, i, ph_entsize, PHDR_SIZE)?;
                parse_program_header(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = headers.len(), "Parsed program header table");

        Ok(Self { headers })
    }

    /// For every segment, the names of the sections it contains, in
    /// section index order.
    pub fn map_sections(&self, sections: &SectionTable<'_>) -> Vec<SegmentSections> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, ph)| {
                let contained: Vec<String> = sections
                    .sections()
                    .filter(|s| ph.contains_section(&s.header))
                    .map(|s| s.name.into_owned())
                    .collect();
                trace!(index, count = contained.len(), "Mapped segment");
                SegmentSections {
                    index,
                    p_type: ph.p_type,
                    type_name: segment_type_name(ph.p_type),
                    offset: ph.p_offset,
                    file_size: ph.p_filesz,
                    sections: contained,
                }
            })
            .collect()
    }
}

/// Parse a single 56-byte program header
fn parse_program_header(entry: &[u8]) -> Result<ProgramHeader> {
    Ok(ProgramHeader {
        p_type: entry.read_u32(0)?,
        p_flags: entry.read_u32(4)?,
        p_offset: entry.read_u64(8)?,
        p_vaddr: entry.read_u64(16)?,
        p_paddr: entry.read_u64(24)?,
        p_filesz: entry.read_u64(32)?,
        p_memsz: entry.read_u64(40)?,
        p_align: entry.read_u64(48)?,
    })
}
