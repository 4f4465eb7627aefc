//! Common test utilities and helpers.
//!
//! `ElfBuilder` assembles small ELF64 little-endian images in memory so
//! tests can describe exactly the tables they need.
#![allow(dead_code)]

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_REL: u32 = 9;
pub const SHT_DYNSYM: u32 = 11;

pub const PT_LOAD: u32 = 1;
pub const PT_NOTE: u32 = 4;

pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STB_GLOBAL: u8 = 1;

/// Offsets of the `e_*` header fields that tests like to corrupt.
pub mod ehdr {
    pub const E_PHOFF: usize = 32;
    pub const E_SHOFF: usize = 40;
    pub const E_PHNUM: usize = 56;
    pub const E_SHNUM: usize = 60;
    pub const E_SHSTRNDX: usize = 62;
}

pub fn put_u16(data: &mut [u8], at: usize, v: u16) {
    data[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

pub fn put_u32(data: &mut [u8], at: usize, v: u32) {
    data[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

pub fn put_u64(data: &mut [u8], at: usize, v: u64) {
    data[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

/// Build a string table; returns the bytes and each name's offset.
pub fn strtab(names: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut bytes = vec![0u8];
    let mut offsets = Vec::with_capacity(names.len());
    for name in names {
        offsets.push(bytes.len() as u32);
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
    }
    (bytes, offsets)
}

/// One `Elf64_Sym`
pub fn sym(name: u32, info: u8, shndx: u16, value: u64, size: u64) -> Vec<u8> {
    let mut out = vec![0u8; 24];
    put_u32(&mut out, 0, name);
    out[4] = info;
    put_u16(&mut out, 6, shndx);
    put_u64(&mut out, 8, value);
    put_u64(&mut out, 16, size);
    out
}

/// One `Elf64_Rela`
pub fn rela(offset: u64, sym: u32, r_type: u32, addend: i64) -> Vec<u8> {
    let mut out = rel(offset, sym, r_type);
    out.extend_from_slice(&addend.to_le_bytes());
    out
}

/// One `Elf64_Rel`
pub fn rel(offset: u64, sym: u32, r_type: u32) -> Vec<u8> {
    let mut out = vec![0u8; 16];
    put_u64(&mut out, 0, offset);
    put_u64(&mut out, 8, (u64::from(sym) << 32) | u64::from(r_type));
    out
}

#[derive(Clone)]
pub struct SectionSpec {
    pub name: String,
    pub sh_type: u32,
    pub data: Vec<u8>,
    /// Declared size for `SHT_NOBITS` sections, which carry no data.
    pub nobits_size: u64,
    pub link: u32,
    pub entsize: u64,
}

#[derive(Clone, Copy)]
pub enum SegmentSpec {
    /// From the start of section `first` to the end of section `last`
    /// (ELF indices, inclusive).
    Covering { p_type: u32, first: usize, last: usize },
    Raw { p_type: u32, offset: u64, filesz: u64 },
}

#[derive(Default)]
pub struct ElfBuilder {
    sections: Vec<SectionSpec>,
    segments: Vec<SegmentSpec>,
}

/// A built image plus the layout tests need to assert against.
pub struct BuiltElf {
    pub bytes: Vec<u8>,
    /// `(sh_offset, sh_size)` by ELF section index, including the null
    /// section and the trailing `.shstrtab`.
    pub layout: Vec<(u64, u64)>,
    pub shoff: u64,
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section; returns its ELF index.
    pub fn section(&mut self, name: &str, sh_type: u32, data: Vec<u8>) -> usize {
        self.section_with(name, sh_type, data, 0, 0)
    }

    pub fn section_with(
        &mut self,
        name: &str,
        sh_type: u32,
        data: Vec<u8>,
        link: u32,
        entsize: u64,
    ) -> usize {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            sh_type,
            data,
            nobits_size: 0,
            link,
            entsize,
        });
        self.sections.len()
    }

    pub fn nobits(&mut self, name: &str, size: u64) -> usize {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            sh_type: SHT_NOBITS,
            data: Vec::new(),
            nobits_size: size,
            link: 0,
            entsize: 0,
        });
        self.sections.len()
    }

    pub fn segment(&mut self, spec: SegmentSpec) -> &mut Self {
        self.segments.push(spec);
        self
    }

    pub fn build(&self) -> BuiltElf {
        let phnum = self.segments.len();
        let mut out = vec![0u8; 64 + 56 * phnum];

        let mut layout = vec![(0u64, 0u64)];
        for s in &self.sections {
            align8(&mut out);
            let size = if s.sh_type == SHT_NOBITS {
                s.nobits_size
            } else {
                s.data.len() as u64
            };
            layout.push((out.len() as u64, size));
            out.extend_from_slice(&s.data);
        }

        let mut names: Vec<&str> = self.sections.iter().map(|s| s.name.as_str()).collect();
        names.push(".shstrtab");
        let (shstr, name_offsets) = strtab(&names);
        align8(&mut out);
        layout.push((out.len() as u64, shstr.len() as u64));
        out.extend_from_slice(&shstr);

        align8(&mut out);
        let shoff = out.len() as u64;
        let shnum = self.sections.len() + 2;
        out.resize(out.len() + 64 * shnum, 0);

        // ELF header
        out[0..4].copy_from_slice(b"\x7fELF");
        out[4] = 2;
        out[5] = 1;
        out[6] = 1;
        put_u16(&mut out, 16, 1); // ET_REL
        put_u16(&mut out, 18, 62); // EM_X86_64
        put_u32(&mut out, 20, 1);
        put_u64(&mut out, ehdr::E_PHOFF, if phnum > 0 { 64 } else { 0 });
        put_u64(&mut out, ehdr::E_SHOFF, shoff);
        put_u16(&mut out, 52, 64);
        put_u16(&mut out, 54, 56);
        put_u16(&mut out, ehdr::E_PHNUM, phnum as u16);
        put_u16(&mut out, 58, 64);
        put_u16(&mut out, ehdr::E_SHNUM, shnum as u16);
        put_u16(&mut out, ehdr::E_SHSTRNDX, (shnum - 1) as u16);

        // Section headers; index 0 stays zeroed
        for (i, s) in self.sections.iter().enumerate() {
            let at = shoff as usize + 64 * (i + 1);
            let (offset, size) = layout[i + 1];
            put_u32(&mut out, at, name_offsets[i]);
            put_u32(&mut out, at + 4, s.sh_type);
            put_u64(&mut out, at + 24, offset);
            put_u64(&mut out, at + 32, size);
            put_u32(&mut out, at + 40, s.link);
            put_u64(&mut out, at + 56, s.entsize);
        }
        let at = shoff as usize + 64 * (shnum - 1);
        let (offset, size) = layout[shnum - 1];
        put_u32(&mut out, at, name_offsets[shnum - 2]);
        put_u32(&mut out, at + 4, SHT_STRTAB);
        put_u64(&mut out, at + 24, offset);
        put_u64(&mut out, at + 32, size);

        // Program headers
        for (i, seg) in self.segments.iter().enumerate() {
            let (p_type, offset, filesz) = match *seg {
                SegmentSpec::Covering { p_type, first, last } => {
                    let start = layout[first].0;
                    let end = layout[last].0 + layout[last].1;
                    (p_type, start, end - start)
                }
                SegmentSpec::Raw {
                    p_type,
                    offset,
                    filesz,
                } => (p_type, offset, filesz),
            };
            let at = 64 + 56 * i;
            put_u32(&mut out, at, p_type);
            put_u32(&mut out, at + 4, 4); // PF_R
            put_u64(&mut out, at + 8, offset);
            put_u64(&mut out, at + 32, filesz);
            put_u64(&mut out, at + 40, filesz);
        }

        BuiltElf {
            bytes: out,
            layout,
            shoff,
        }
    }
}

/// Rewrite the file extent of program header `index` in a built image.
pub fn set_segment_extent(bytes: &mut [u8], index: usize, offset: u64, filesz: u64) {
    let at = 64 + 56 * index;
    put_u64(bytes, at + 8, offset);
    put_u64(bytes, at + 32, filesz);
}

fn align8(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}

/// The minimal object file used by the end-to-end tests: `.text`,
/// `.strtab` with `foo`, `.symtab` with `[anonymous, foo]` and `.rela.text`
/// with one entry against symbol 1.
pub fn minimal_object() -> BuiltElf {
    let mut b = ElfBuilder::new();
    let text = b.section(".text", SHT_PROGBITS, vec![0x90; 16]);
    let (names, offs) = strtab(&["foo"]);
    let strtab_idx = b.section(".strtab", SHT_STRTAB, names);

    let mut symtab = sym(0, 0, 0, 0, 0);
    symtab.extend(sym(offs[0], (STB_GLOBAL << 4) | STT_FUNC, text as u16, 0, 16));
    let symtab_idx = b.section_with(".symtab", SHT_SYMTAB, symtab, strtab_idx as u32, 24);

    b.section_with(
        ".rela.text",
        SHT_RELA,
        rela(4, 1, 4, -4),
        symtab_idx as u32,
        24,
    );
    b.segment(SegmentSpec::Covering {
        p_type: PT_LOAD,
        first: text,
        last: text,
    });
    b.build()
}
