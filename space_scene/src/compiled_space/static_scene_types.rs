//! Records of the baked static scene section.
//!
//! Section `SSCN` version 1 holds, in order: one `OctreeHeaderRecord`, the
//! `OctreeNodeRecord`s, one `DataSpan` per node into the content indices,
//! the `u32` content indices, the object `AABB`s, the object `Sphere`s and
//! the `TypeHeader`s. Objects are grouped by type in header order.

use std::ops::Range;
use bytemuck::{Pod, Zeroable};
use crate::binary::FourCC;

pub const STATIC_SCENE_MAGIC: FourCC = FourCC::new(b"SSCN");
pub const STATIC_SCENE_VERSION: u32 = 1;

/// Run of `num_objects` objects of data format type `type_id`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct TypeHeader {
    pub type_id: u32,
    pub num_objects: u32,
}

/// `count` entries starting at `first`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DataSpan {
    pub first: u32,
    pub count: u32,
}

impl DataSpan {
    pub fn new(first: u32, count: u32) -> Self {
        Self { first, count }
    }

    pub fn range(&self) -> Range<usize> {
        let first = self.first as usize;
        first..first + self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Which section a static provider reads and how it names itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSceneConfig {
    pub format_magic: FourCC,
    pub debug_name: &'static str,
}

impl Default for StaticSceneConfig {
    fn default() -> Self {
        Self {
            format_magic: STATIC_SCENE_MAGIC,
            debug_name: "StaticSceneProvider",
        }
    }
}
