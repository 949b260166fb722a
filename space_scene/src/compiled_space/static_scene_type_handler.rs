use crate::binary::{BinaryFormat, StringTable};
use crate::math::AABB;
use crate::scene::SceneObject;
use crate::type_system::RuntimeTypeId;

/// What a type loader gets to see while its objects load.
pub struct StaticSceneLoadContext<'a> {
    /// The container the scene section came from; loaders read their own
    /// sections from it.
    pub format: &'a BinaryFormat,
    pub strings: &'a StringTable,
    /// Bounds of the objects being loaded, parallel to the object slice.
    pub bounds: &'a [AABB],
}

/// Loader for one kind of baked object (models, flares, water...).
pub trait StaticSceneTypeHandler {
    /// Data format tag matched against `TypeHeader::type_id`.
    fn type_id(&self) -> u32;

    /// Object type the loaded `SceneObject`s carry.
    fn runtime_type_id(&self) -> RuntimeTypeId;

    /// Fill `objects` (this type's sub-range) with handles. Returning
    /// false is logged; whatever was filled stays.
    fn load(&mut self, context: &StaticSceneLoadContext<'_>, objects: &mut [SceneObject]) -> bool;

    /// Main-thread step after a successful load.
    fn bind(&mut self) -> bool {
        true
    }

    fn unload(&mut self) {}

    fn load_percent(&self) -> f32 {
        1.0
    }
}
