/*!
# Space Scene

Spatial index and object dispatch runtime for large 3D worlds.

A `Scene` owns three independent registries of small runtime type ids
(object types, views, operations). Providers supply objects; views
aggregate the providers that implement a query interface; operations
dispatch per-object work to the handler registered for the object's type.

## Architecture

- **SceneObject**: type-erased object reference (handle, type id, flags)
- **ObjectOperation**: per-type handler table (tick, draw, collide, query)
- **SceneView**: fan-out of one query interface over every provider
- **StaticSceneProvider**: immutable objects loaded from a baked binary section
- **DynamicSceneProvider**: moving objects in two rebuildable loose octrees

Logging goes through a process-wide logger (`space::Engine`) that the host
application may replace.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod type_system;
pub mod utils;
pub mod octree;
pub mod binary;
pub mod scene;
pub mod compiled_space;
pub mod dynamic_scene;

// Main space namespace module
pub mod space {
    // Error types
    pub use crate::error::{Error, Result};

    // Log sink
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
