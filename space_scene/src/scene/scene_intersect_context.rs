use super::SceneObject;

/// Filters applied by providers while answering an intersect query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneIntersectContext {
    include_static_objects: bool,
    include_dynamic_objects: bool,
    only_shadow_casters: bool,
}

impl SceneIntersectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static_objects(mut self, include: bool) -> Self {
        self.include_static_objects = include;
        self
    }

    pub fn with_dynamic_objects(mut self, include: bool) -> Self {
        self.include_dynamic_objects = include;
        self
    }

    pub fn with_only_shadow_casters(mut self, only: bool) -> Self {
        self.only_shadow_casters = only;
        self
    }

    pub fn include_static_objects(&self) -> bool {
        self.include_static_objects
    }

    pub fn include_dynamic_objects(&self) -> bool {
        self.include_dynamic_objects
    }

    pub fn only_shadow_casters(&self) -> bool {
        self.only_shadow_casters
    }

    /// Per-object filter (shadow casting). Population gating is done by
    /// the providers themselves.
    pub fn accepts(&self, object: &SceneObject) -> bool {
        object.is_valid() && (!self.only_shadow_casters || object.casts_shadow())
    }
}

impl Default for SceneIntersectContext {
    fn default() -> Self {
        Self {
            include_static_objects: true,
            include_dynamic_objects: true,
            only_shadow_casters: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObjectFlags;
    use crate::type_system::RuntimeTypeId;

    #[test]
    fn test_default_includes_both_populations() {
        let ctx = SceneIntersectContext::default();
        assert!(ctx.include_static_objects());
        assert!(ctx.include_dynamic_objects());
        assert!(!ctx.only_shadow_casters());
    }

    #[test]
    fn test_shadow_caster_filter() {
        let ctx = SceneIntersectContext::new().with_only_shadow_casters(true);
        let caster = SceneObject::new(1, RuntimeTypeId::new(1), SceneObjectFlags::CASTS_DYNAMIC_SHADOW);
        let plain = SceneObject::new(2, RuntimeTypeId::new(1), SceneObjectFlags::empty());
        assert!(ctx.accepts(&caster));
        assert!(!ctx.accepts(&plain));
        assert!(!ctx.accepts(&SceneObject::INVALID));
    }
}
