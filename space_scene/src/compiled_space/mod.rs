//! Precompiled static geometry: the baked scene section, its writer and
//! the provider that serves it to the scene.

mod static_scene_types;
mod static_scene_type_handler;
mod static_scene_writer;
mod static_scene_provider;

pub use static_scene_types::{
    TypeHeader, DataSpan, StaticSceneConfig, STATIC_SCENE_MAGIC, STATIC_SCENE_VERSION,
};
pub use static_scene_type_handler::{StaticSceneTypeHandler, StaticSceneLoadContext};
pub use static_scene_writer::StaticSceneWriter;
pub use static_scene_provider::StaticSceneProvider;
