//! Core ELF64 types and constants

use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// ELF parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElfError {
    #[error("This is not an ELF file (bad magic)")]
    InvalidMagic,
    #[error("Unknown class. ({0})")]
    UnsupportedClass(u8),
    #[error("Unknown endian. ({0})")]
    UnsupportedData(u8),
    #[error("Read of {len} bytes at offset {offset:#x} is outside the {size}-byte buffer")]
    OutOfBounds { offset: u64, len: u64, size: usize },
    #[error("Invalid section index: {0}")]
    InvalidSectionIndex(u16),
    #[error("Symbol index {index} is outside the symbol table ({count} entries)")]
    SymbolIndexOutOfRange { index: u64, count: u64 },
}

impl ElfError {
    /// Malformed identification: wrong magic, class or encoding.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic | Self::UnsupportedClass(_) | Self::UnsupportedData(_)
        )
    }

    /// A computed offset, index or stride pointed outside the data.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. }
                | Self::InvalidSectionIndex(_)
                | Self::SymbolIndexOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ElfError>;

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Identification indices
pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_VERSION: usize = 6;
pub const EI_OSABI: usize = 7;

pub const ELFCLASS64: u8 = 2;
pub const ELFDATA2LSB: u8 = 1;

/// On-disk record sizes
pub const EHDR_SIZE: usize = 64;
pub const SHDR_SIZE: usize = 64;
pub const PHDR_SIZE: usize = 56;
pub const SYM_SIZE: usize = 24;
pub const REL_SIZE: usize = 16;
pub const RELA_SIZE: usize = 24;

/// ELF file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
}

impl From<u16> for ElfType {
    fn from(val: u16) -> Self {
        match val {
            1 => ElfType::Relocatable,
            2 => ElfType::Executable,
            3 => ElfType::SharedObject,
            4 => ElfType::Core,
            _ => ElfType::None,
        }
    }
}

/// ELF machine architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfMachine {
    None,
    X86_64,
    AArch64,
    RiscV,
    PowerPC64,
    S390,
    Sparc64,
    Other(u16),
}

impl From<u16> for ElfMachine {
    fn from(val: u16) -> Self {
        match val {
            0 => ElfMachine::None,
            21 => ElfMachine::PowerPC64,
            22 => ElfMachine::S390,
            43 => ElfMachine::Sparc64,
            62 => ElfMachine::X86_64,
            183 => ElfMachine::AArch64,
            243 => ElfMachine::RiscV,
            other => ElfMachine::Other(other),
        }
    }
}

/// ELF identification bytes beyond magic, class and encoding, which are
/// fixed to ELF64 little-endian once validated.
#[derive(Debug, Clone, Copy)]
pub struct ElfIdent {
    pub version: u8,
    pub osabi: u8,
}

/// ELF header
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader {
    pub ident: ElfIdent,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl ElfHeader {
    pub fn file_type(&self) -> ElfType {
        ElfType::from(self.e_type)
    }

    pub fn machine(&self) -> ElfMachine {
        ElfMachine::from(self.e_machine)
    }

    pub fn entry_point(&self) -> u64 {
        self.e_entry
    }
}

/// Section header
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// Bytes the section occupies in the file. `SHT_NOBITS` occupies none.
    pub fn file_size(&self) -> u64 {
        if self.sh_type == SHT_NOBITS {
            0
        } else {
            self.sh_size
        }
    }

    pub fn is_relocation(&self) -> bool {
        matches!(self.sh_type, SHT_REL | SHT_RELA)
    }
}

/// Section types
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;

/// Special section indices
pub const SHN_UNDEF: u16 = 0;

/// Program header
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeader {
    /// Whether `section` lies entirely inside this segment's file extent.
    ///
    /// A section ending exactly at the segment end is contained.
    pub fn contains_section(&self, section: &SectionHeader) -> bool {
        let seg_start = u128::from(self.p_offset);
        let seg_end = seg_start + u128::from(self.p_filesz);
        let sec_start = u128::from(section.sh_offset);
        let sec_end = sec_start + u128::from(section.file_size());
        !(sec_start < seg_start || sec_end > seg_end)
    }
}

/// Program header types
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;
pub const PT_GNU_EH_FRAME: u32 = 0x6474e550;
pub const PT_GNU_STACK: u32 = 0x6474e551;
pub const PT_GNU_RELRO: u32 = 0x6474e552;
pub const PT_GNU_PROPERTY: u32 = 0x6474e553;

/// Human-readable program header type, `None` for unknown values.
pub fn segment_type_name(p_type: u32) -> Option<&'static str> {
    Some(match p_type {
        PT_NULL => "NULL",
        PT_LOAD => "LOAD",
        PT_DYNAMIC => "DYNAMIC",
        PT_INTERP => "INTERP",
        PT_NOTE => "NOTE",
        PT_SHLIB => "SHLIB",
        PT_PHDR => "PHDR",
        PT_TLS => "TLS",
        PT_GNU_EH_FRAME => "GNU_EH_FRAME",
        PT_GNU_STACK => "GNU_STACK",
        PT_GNU_RELRO => "GNU_RELRO",
        PT_GNU_PROPERTY => "GNU_PROPERTY",
        _ => return None,
    })
}

/// Symbol entry
#[derive(Debug, Clone, Copy, Default)]
pub struct Symbol {
    pub st_name: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl Symbol {
    pub fn st_bind(&self) -> u8 {
        self.st_info >> 4
    }

    pub fn st_type(&self) -> u8 {
        self.st_info & 0xf
    }

    /// Symbols without a name are never reported.
    pub fn is_anonymous(&self) -> bool {
        self.st_name == 0
    }
}

/// Symbol binding
pub const STB_GLOBAL: u8 = 1;

/// Symbol types
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;

/// Relocation entry
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocation {
    pub r_offset: u64,
    pub r_info: u64,
    pub r_addend: i64, // Only for RELA
}

impl Relocation {
    pub fn symbol_index(&self) -> u64 {
        self.r_info >> 32
    }

    pub fn reloc_type(&self) -> u32 {
        self.r_info as u32
    }
}

/// Section with its resolved name
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub index: usize,
    pub name: Cow<'a, str>,
    pub header: SectionHeader,
}

impl<'a> Section<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }
}
