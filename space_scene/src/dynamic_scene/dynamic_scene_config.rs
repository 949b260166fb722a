use glam::Vec3;

/// Cell size the trees aim for when no hint was given.
pub const DEFAULT_PARTITION_SIZE: f32 = 20.0;

/// Dynamic scene configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicSceneConfig {
    /// Centre of the trees until the first `resize_scene`
    pub initial_centre: Vec3,
    /// Edge length of the trees until the first `resize_scene`
    pub initial_size: f32,
    /// Levels below the root until the first `resize_scene`
    pub initial_depth: u32,
    /// Target cell size used by `resize_scene` (values <= 0 use the default)
    pub partition_size_hint: f32,
    /// Cap on the depth chosen by `resize_scene`
    pub max_depth: u32,
}

impl Default for DynamicSceneConfig {
    fn default() -> Self {
        Self {
            initial_centre: Vec3::ZERO,
            initial_size: 2000.0,
            initial_depth: 1,
            partition_size_hint: DEFAULT_PARTITION_SIZE,
            max_depth: 8,
        }
    }
}

impl DynamicSceneConfig {
    /// The partition size actually used, falling back to the default for
    /// non-positive hints.
    pub fn effective_partition_size(&self) -> f32 {
        if self.partition_size_hint > 0.0 {
            self.partition_size_hint
        } else {
            DEFAULT_PARTITION_SIZE
        }
    }
}
