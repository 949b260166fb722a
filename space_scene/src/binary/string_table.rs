/// StringTable - resource names shared by the type loaders of one space.
///
/// Stored in section `STRS` as two arrays: `[offset, length]` pairs and
/// the concatenated UTF-8 bytes.

use crate::space::Result;
use super::{BinaryFormat, FourCC, SectionWriter};

pub const STRING_TABLE_MAGIC: FourCC = FourCC::new(b"STRS");
pub const STRING_TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { strings: strings.into_iter().map(Into::into).collect() }
    }

    /// Read the table from its section.
    pub fn read(format: &BinaryFormat) -> Result<Self> {
        let mut stream = format.find_and_open_section(STRING_TABLE_MAGIC, STRING_TABLE_VERSION, "StringTable")?;
        let spans = stream.read::<[u32; 2]>()?;
        let bytes = stream.read::<u8>()?;
        format.close_section(stream);

        let mut strings = Vec::with_capacity(spans.len());
        for (index, &[offset, length]) in spans.iter().enumerate() {
            let start = offset as usize;
            let end = start.saturating_add(length as usize);
            let Some(slice) = bytes.get(start..end) else {
                crate::engine_bail!("space::StringTable", "string {} out of bounds ({}..{})", index, start, end);
            };
            match std::str::from_utf8(slice) {
                Ok(s) => strings.push(s.to_owned()),
                Err(e) => crate::engine_bail!("space::StringTable", "string {} is not UTF-8: {}", index, e),
            }
        }

        Ok(Self { strings })
    }

    /// Add a string, returning its index.
    pub fn push(&mut self, s: impl Into<String>) -> u32 {
        self.strings.push(s.into());
        (self.strings.len() - 1) as u32
    }

    pub fn string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn write(&self) -> SectionWriter {
        let mut spans = Vec::with_capacity(self.strings.len());
        let mut bytes = Vec::new();
        for s in &self.strings {
            spans.push([bytes.len() as u32, s.len() as u32]);
            bytes.extend_from_slice(s.as_bytes());
        }

        let mut section = SectionWriter::new();
        section.write(&spans).write(&bytes);
        section
    }
}
