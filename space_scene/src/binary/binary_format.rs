/// BinaryFormat - sectioned binary container.
///
/// Layout (little endian):
///
/// ```text
/// [FORMAT_MAGIC: u32][num_sections: u32]
/// [SectionEntry; num_sections]        magic, version, offset, length
/// section payloads at their absolute offsets
/// ```
///
/// A section payload is a sequence of values and arrays. An array is a
/// `u64` record count followed by the records. Records are copied out of
/// the buffer, so nothing read from a section borrows it.

use std::fmt;
use bytemuck::{Pod, Zeroable};
use crate::space::{Error, Result};

/// Four ASCII bytes packed into a `u32` tag.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct FourCC(u32);

impl FourCC {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(u32::from_le_bytes(*bytes))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes() {
            let c = if byte.is_ascii_graphic() || byte == b' ' { byte as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self)
    }
}

/// Tag at the start of every container.
pub const FORMAT_MAGIC: FourCC = FourCC::new(b"BWSS");

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct FormatHeader {
    magic: FourCC,
    num_sections: u32,
}

/// One row of the section table.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SectionEntry {
    pub magic: FourCC,
    pub version: u32,
    pub offset: u64,
    pub length: u64,
}

// ============================================================================
// READER
// ============================================================================

pub struct BinaryFormat {
    data: Vec<u8>,
    sections: Vec<SectionEntry>,
}

impl BinaryFormat {
    /// Parse the header and section table. Every section must lie inside
    /// the buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let header: FormatHeader = read_pod(&data, 0)
            .ok_or_else(|| crate::engine_err!("space::BinaryFormat", "buffer too small for header ({} bytes)", data.len()))?;
        if header.magic != FORMAT_MAGIC {
            crate::engine_bail!("space::BinaryFormat", "bad container magic {}", header.magic);
        }

        let header_size = std::mem::size_of::<FormatHeader>();
        let entry_size = std::mem::size_of::<SectionEntry>();
        let mut sections = Vec::with_capacity(header.num_sections as usize);
        for index in 0..header.num_sections as usize {
            let entry: SectionEntry = read_pod(&data, header_size + index * entry_size)
                .ok_or_else(|| crate::engine_err!("space::BinaryFormat", "section table truncated at entry {}", index))?;

            let end = entry.offset.saturating_add(entry.length);
            if end > data.len() as u64 {
                crate::engine_bail!(
                    "space::BinaryFormat",
                    "section {} out of bounds: offset {}, length {}, buffer size {}",
                    entry.magic, entry.offset, entry.length, data.len()
                );
            }
            sections.push(entry);
        }

        Ok(Self { data, sections })
    }

    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[SectionEntry] {
        &self.sections
    }

    /// Index of the first section tagged `magic`.
    pub fn find_section(&self, magic: FourCC) -> Option<usize> {
        self.sections.iter().position(|entry| entry.magic == magic)
    }

    pub fn section_version(&self, index: usize) -> Option<u32> {
        self.sections.get(index).map(|entry| entry.version)
    }

    pub fn open_section(&self, index: usize) -> Option<BinaryStream<'_>> {
        let entry = self.sections.get(index)?;
        let start = entry.offset as usize;
        let end = start + entry.length as usize;
        Some(BinaryStream {
            magic: entry.magic,
            data: &self.data[start..end],
            cursor: 0,
        })
    }

    /// Open the section tagged `magic`, checking its version.
    ///
    /// Both failures are load errors: they are logged at WARN with
    /// `debug_name` and returned.
    pub fn find_and_open_section(
        &self,
        magic: FourCC,
        version: u32,
        debug_name: &str,
    ) -> Result<BinaryStream<'_>> {
        let Some(index) = self.find_section(magic) else {
            crate::engine_warn!("space::BinaryFormat", "{}: section {} not found", debug_name, magic);
            return Err(Error::SectionNotFound { magic, version });
        };

        let found = self.sections[index].version;
        if found != version {
            crate::engine_warn!(
                "space::BinaryFormat",
                "{}: section {} has version {}, expected {}", debug_name, magic, found, version
            );
            return Err(Error::SectionVersionMismatch { magic, expected: version, found });
        }

        self.open_section(index).ok_or(Error::SectionNotFound { magic, version })
    }

    /// Finish reading a section.
    pub fn close_section(&self, stream: BinaryStream<'_>) {
        if stream.remaining() > 0 {
            crate::engine_trace!(
                "space::BinaryFormat",
                "section {} closed with {} unread bytes", stream.magic, stream.remaining()
            );
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Cursor over one section's payload.
pub struct BinaryStream<'a> {
    magic: FourCC,
    data: &'a [u8],
    cursor: usize,
}

impl<'a> BinaryStream<'a> {
    pub fn magic(&self) -> FourCC {
        self.magic
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Read one fixed-layout value.
    pub fn read_value<T: Pod>(&mut self) -> Result<T> {
        let value = read_pod(self.data, self.cursor).ok_or_else(|| {
            crate::engine_err!(
                "space::BinaryStream",
                "section {} truncated reading {}", self.magic, std::any::type_name::<T>()
            )
        })?;
        self.cursor += std::mem::size_of::<T>();
        Ok(value)
    }

    /// Read a `u64`-counted array of records.
    pub fn read<T: Pod>(&mut self) -> Result<Vec<T>> {
        let count: u64 = self.read_value()?;
        let record_size = std::mem::size_of::<T>() as u64;
        let byte_len = count.saturating_mul(record_size);
        if byte_len > self.remaining() as u64 {
            return Err(crate::engine_err!(
                "space::BinaryStream",
                "section {} truncated: {} x {} needs {} bytes, {} left",
                self.magic, count, std::any::type_name::<T>(), byte_len, self.remaining()
            ));
        }

        let start = self.cursor;
        let end = start + byte_len as usize;
        let records = if record_size == 0 {
            vec![T::zeroed(); count as usize]
        } else {
            self.data[start..end]
                .chunks_exact(record_size as usize)
                .map(bytemuck::pod_read_unaligned)
                .collect()
        };
        self.cursor = end;
        Ok(records)
    }
}

/// Copy a `T` out of `data` at `offset`, `None` past the end.
fn read_pod<T: Pod>(data: &[u8], offset: usize) -> Option<T> {
    let end = offset.checked_add(std::mem::size_of::<T>())?;
    data.get(offset..end).map(bytemuck::pod_read_unaligned)
}

// ============================================================================
// WRITER
// ============================================================================

/// Payload builder for one section.
#[derive(Debug, Clone, Default)]
pub struct SectionWriter {
    bytes: Vec<u8>,
}

impl SectionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_value<T: Pod>(&mut self, value: &T) -> &mut Self {
        self.bytes.extend_from_slice(bytemuck::bytes_of(value));
        self
    }

    /// Append a `u64`-counted array.
    pub fn write<T: Pod>(&mut self, records: &[T]) -> &mut Self {
        self.write_value(&(records.len() as u64));
        self.bytes.extend_from_slice(bytemuck::cast_slice(records));
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds a whole container from sections.
#[derive(Debug, Clone, Default)]
pub struct BinaryFormatWriter {
    sections: Vec<(FourCC, u32, SectionWriter)>,
}

impl BinaryFormatWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_section(&mut self, magic: FourCC, version: u32, section: SectionWriter) -> &mut Self {
        self.sections.push((magic, version, section));
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let header_size = std::mem::size_of::<FormatHeader>();
        let table_size = self.sections.len() * std::mem::size_of::<SectionEntry>();
        let payload_size: usize = self.sections.iter().map(|(_, _, s)| s.len()).sum();

        let mut data = Vec::with_capacity(header_size + table_size + payload_size);
        let header = FormatHeader { magic: FORMAT_MAGIC, num_sections: self.sections.len() as u32 };
        data.extend_from_slice(bytemuck::bytes_of(&header));

        let mut offset = (header_size + table_size) as u64;
        for (magic, version, section) in &self.sections {
            let entry = SectionEntry {
                magic: *magic,
                version: *version,
                offset,
                length: section.len() as u64,
            };
            data.extend_from_slice(bytemuck::bytes_of(&entry));
            offset += section.len() as u64;
        }
        for (_, _, section) in &self.sections {
            data.extend_from_slice(&section.bytes);
        }
        data
    }

    /// Finish and parse back into a reader.
    pub fn build(&self) -> Result<BinaryFormat> {
        BinaryFormat::from_bytes(self.finish())
    }
}

#[cfg(test)]
#[path = "binary_format_tests.rs"]
mod tests;
