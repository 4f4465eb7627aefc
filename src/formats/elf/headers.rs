//! ELF header validation and parsing

use crate::formats::elf::types::*;
use crate::formats::elf::utils::LeRead;
use tracing::debug;

/// Parse and validate ELF identification bytes
pub fn parse_ident(data: &[u8]) -> Result<ElfIdent> {
    // Check magic
    if data.len() < ELF_MAGIC.len() || &data[0..4] != ELF_MAGIC {
        return Err(ElfError::InvalidMagic);
    }

    let class = data.read_u8(EI_CLASS as u64)?;
    if class != ELFCLASS64 {
        return Err(ElfError::UnsupportedClass(class));
    }

    let encoding = data.read_u8(EI_DATA as u64)?;
    if encoding != ELFDATA2LSB {
        return Err(ElfError::UnsupportedData(encoding));
    }

    Ok(ElfIdent {
        version: data.read_u8(EI_VERSION as u64)?,
        osabi: data.read_u8(EI_OSABI as u64)?,
    })
}

/// Parse the ELF64 header. Table geometry is checked by the table readers.
pub fn parse_header(data: &[u8]) -> Result<ElfHeader> {
    let ident = parse_ident(data)?;

    // The whole fixed header must be present before any field is read.
    data.slice_at(0, EHDR_SIZE as u64)?;

    let header = ElfHeader {
        ident,
        e_type: data.read_u16(16)?,
        e_machine: data.read_u16(18)?,
        e_version: data.read_u32(20)?,
        e_entry: data.read_u64(24)?,
        e_phoff: data.read_u64(32)?,
        e_shoff: data.read_u64(40)?,
        e_flags: data.read_u32(48)?,
        e_ehsize: data.read_u16(52)?,
        e_phentsize: data.read_u16(54)?,
        e_phnum: data.read_u16(56)?,
        e_shentsize: data.read_u16(58)?,
        e_shnum: data.read_u16(60)?,
        e_shstrndx: data.read_u16(62)?,
    };

    debug!(
        machine = ?header.machine(),
        file_type = ?header.file_type(),
        shnum = header.e_shnum,
        phnum = header.e_phnum,
        "Validated ELF64 header"
    );

    Ok(header)
}
