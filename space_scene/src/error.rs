//! Error types for the space scene runtime
//!
//! Load paths (binary sections, static scene data) report failures through
//! these errors. Queries never fail; an empty result is their only failure
//! signal.

use std::fmt;
use crate::binary::FourCC;

/// Result type for scene runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scene runtime errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A binary section with the requested magic does not exist
    SectionNotFound {
        magic: FourCC,
        version: u32,
    },

    /// A binary section exists but carries another format version
    SectionVersionMismatch {
        magic: FourCC,
        expected: u32,
        found: u32,
    },

    /// Binary data is truncated or inconsistent
    MalformedData(String),

    /// A type id context ran out of local ids
    TypeCapacityExceeded {
        capacity: usize,
    },

    /// A convex hull could not be built (degenerate planes or matrix)
    DegenerateHull(String),

    /// A handle or id does not refer to live storage
    InvalidHandle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SectionNotFound { magic, version } => {
                write!(f, "Section not found: {} (version {})", magic, version)
            }
            Error::SectionVersionMismatch { magic, expected, found } => {
                write!(f, "Section version mismatch: {} expected {}, found {}", magic, expected, found)
            }
            Error::MalformedData(msg) => write!(f, "Malformed data: {}", msg),
            Error::TypeCapacityExceeded { capacity } => {
                write!(f, "Type capacity exceeded: more than {} types", capacity)
            }
            Error::DegenerateHull(msg) => write!(f, "Degenerate hull: {}", msg),
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log a WARN message and build an `Error::MalformedData` from it.
///
/// Bad baked data fails the load that read it, not the process.
///
/// ```ignore
/// let spans = stream.read::<DataSpan>()
///     .map_err(|_| engine_err!("space::StaticSceneProvider", "missing node spans"))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_warn!($source, "{}", message);
        $crate::space::Error::MalformedData(message)
    }};
}

/// Log a WARN message and return `Err(Error::MalformedData)` from the
/// enclosing function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
