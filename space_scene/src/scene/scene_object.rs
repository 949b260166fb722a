/// SceneObject - the type-erased reference passed between providers,
/// views and operations.
///
/// `handle` is opaque: only the handlers registered for `type_id` know how
/// to resolve it in their own storage. A SceneObject never owns what it
/// refers to, and a copy obtained from a query is only meaningful until
/// the owning provider removes or relocates the record.

use std::hash::{Hash, Hasher};
use bitflags::bitflags;
use rdst::RadixKey;
use crate::type_system::{RuntimeTypeId, TypeIdContext};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SceneObjectFlags: u8 {
        const IS_DYNAMIC = 1 << 0;
        const CASTS_STATIC_SHADOW = 1 << 1;
        const CASTS_DYNAMIC_SHADOW = 1 << 2;
        const IS_TERRAIN = 1 << 3;
    }
}

impl Default for SceneObjectFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SceneObject {
    handle: usize,
    type_id: RuntimeTypeId,
    flags: SceneObjectFlags,
}

impl SceneObject {
    pub const INVALID: SceneObject = SceneObject {
        handle: 0,
        type_id: RuntimeTypeId::UNKNOWN,
        flags: SceneObjectFlags::empty(),
    };

    pub fn new(handle: usize, type_id: RuntimeTypeId, flags: SceneObjectFlags) -> Self {
        Self { handle, type_id, flags }
    }

    /// Build an object whose type is `T` in the given object context.
    pub fn of_type<T: 'static>(
        object_types: &TypeIdContext,
        handle: usize,
        flags: SceneObjectFlags,
    ) -> Self {
        Self::new(handle, object_types.type_id_of::<T>(), flags)
    }

    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn type_id(&self) -> RuntimeTypeId {
        self.type_id
    }

    pub fn flags(&self) -> SceneObjectFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: SceneObjectFlags) {
        self.flags = flags;
    }

    pub fn is_valid(&self) -> bool {
        self.handle != 0
    }

    pub fn is_type(&self, type_id: RuntimeTypeId) -> bool {
        self.type_id == type_id
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(SceneObjectFlags::IS_DYNAMIC)
    }

    pub fn is_terrain(&self) -> bool {
        self.flags.contains(SceneObjectFlags::IS_TERRAIN)
    }

    pub fn casts_shadow(&self) -> bool {
        self.flags.intersects(
            SceneObjectFlags::CASTS_STATIC_SHADOW | SceneObjectFlags::CASTS_DYNAMIC_SHADOW,
        )
    }
}

// Identity is (handle, type); flags are attributes.
impl PartialEq for SceneObject {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && self.type_id == other.type_id
    }
}

impl Eq for SceneObject {}

impl Hash for SceneObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
        self.type_id.hash(state);
    }
}

/// Mixed batches are radix-sorted on the type byte so each type's handler
/// sees one contiguous run.
impl RadixKey for SceneObject {
    const LEVELS: usize = 1;

    #[inline]
    fn get_level(&self, _level: usize) -> u8 {
        self.type_id.value()
    }
}
