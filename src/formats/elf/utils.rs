//! Bounds-checked readers over untrusted ELF data

use crate::formats::elf::types::{ElfError, Result};
use std::borrow::Cow;

/// Little-endian reads that validate every offset against the buffer.
pub trait LeRead {
    fn slice_at(&self, offset: u64, len: u64) -> Result<&[u8]>;
    fn read_u8(&self, offset: u64) -> Result<u8>;
    fn read_u16(&self, offset: u64) -> Result<u16>;
    fn read_u32(&self, offset: u64) -> Result<u32>;
    fn read_u64(&self, offset: u64) -> Result<u64>;
    fn read_i64(&self, offset: u64) -> Result<i64>;
}

impl LeRead for [u8] {
    fn slice_at(&self, offset: u64, len: u64) -> Result<&[u8]> {
        let out_of_bounds = || ElfError::OutOfBounds {
            offset,
            len,
            size: self.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let len_usize = usize::try_from(len).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len_usize).ok_or_else(out_of_bounds)?;
        self.get(start..end).ok_or_else(out_of_bounds)
    }

    fn read_u8(&self, offset: u64) -> Result<u8> {
        Ok(self.slice_at(offset, 1)?[0])
    }

    fn read_u16(&self, offset: u64) -> Result<u16> {
        Ok(u16::from_le_bytes(fixed(self.slice_at(offset, 2)?)))
    }

    fn read_u32(&self, offset: u64) -> Result<u32> {
        Ok(u32::from_le_bytes(fixed(self.slice_at(offset, 4)?)))
    }

    fn read_u64(&self, offset: u64) -> Result<u64> {
        Ok(u64::from_le_bytes(fixed(self.slice_at(offset, 8)?)))
    }

    fn read_i64(&self, offset: u64) -> Result<i64> {
        Ok(i64::from_le_bytes(fixed(self.slice_at(offset, 8)?)))
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Bytes of entry `index` in a table at `base` with the given stride.
pub fn entry_at(data: &[u8], base: u64, index: u64, stride: u64, len: usize) -> Result<&[u8]> {
    let offset = index
        .checked_mul(stride)
        .and_then(|rel| base.checked_add(rel))
        .ok_or(ElfError::OutOfBounds {
            offset: base,
            len: len as u64,
            size: data.len(),
        })?;
    data.slice_at(offset, len as u64)
}

/// Number of whole entries in a table of `size` bytes.
///
/// A zero stride means the producer left `sh_entsize` unset; the canonical
/// record size is used instead.
pub fn entry_count(size: u64, stride: u64, canonical: usize) -> (u64, u64) {
    let stride = if stride == 0 { canonical as u64 } else { stride };
    (size / stride, stride)
}

/// Read a NUL-terminated string at `offset` inside a string table.
///
/// A missing terminator ends the string at the table end. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn read_cstring(table: &[u8], offset: u64) -> Result<Cow<'_, str>> {
    let start = usize::try_from(offset)
        .ok()
        .filter(|&start| start < table.len())
        .ok_or(ElfError::OutOfBounds {
            offset,
            len: 1,
            size: table.len(),
        })?;

    let slice = &table[start..];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());

    Ok(String::from_utf8_lossy(&slice[..end]))
}
