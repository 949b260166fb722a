//! In-memory binary sections: the reader the static scene loads from and
//! the writer that bakes it.

mod binary_format;
mod string_table;

pub use binary_format::{
    FourCC, BinaryFormat, BinaryStream, BinaryFormatWriter, SectionWriter,
    SectionEntry, FORMAT_MAGIC,
};
pub use string_table::{StringTable, STRING_TABLE_MAGIC, STRING_TABLE_VERSION};
