//! Runtime-mutable objects (entities, particle systems) indexed by two
//! loose octrees with a deferred end-of-tick rebuild.

mod dynamic_scene_config;
mod dynamic_scene_provider;

pub use dynamic_scene_config::{DynamicSceneConfig, DEFAULT_PARTITION_SIZE};
pub use dynamic_scene_provider::{DynamicSceneProvider, DynamicObjectHandle};
