use std::rc::Rc;
use glam::Vec3;
use crate::math::{CollisionState, SweepParams, WorldTriangle};
use super::{
    CollisionSceneProvider, ProviderId, Scene, SceneProvider, SceneView, SceneViewBase,
    SceneViewType,
};

/// Sweep-vs-scene collision across every collision provider.
///
/// Providers are asked in registration order; the first one reporting a
/// stop ends the query. Without a stop, `state` ends up holding the
/// nearest hit of all providers.
pub struct CollisionSceneView {
    providers: SceneView<dyn CollisionSceneProvider>,
}

impl CollisionSceneView {
    pub fn new() -> Self {
        Self { providers: SceneView::new() }
    }

    pub fn collide_ray(
        &self,
        source: Vec3,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        self.providers
            .for_each_until(|provider| provider.collide_ray(source, extent, sweep, state))
    }

    pub fn collide_prism(
        &self,
        source: &WorldTriangle,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        self.providers
            .for_each_until(|provider| provider.collide_prism(source, extent, sweep, state))
    }

    /// Point sweep from `start` to `end`.
    pub fn collide_segment(&self, start: Vec3, end: Vec3, state: &mut CollisionState) -> bool {
        let sweep = SweepParams::ray(start, end);
        self.collide_ray(start, end, &sweep, state)
    }

    /// Prism sweep moving `triangle.v0` to `extent`.
    pub fn collide_triangle(
        &self,
        triangle: &WorldTriangle,
        extent: Vec3,
        state: &mut CollisionState,
    ) -> bool {
        let sweep = SweepParams::prism(triangle, extent);
        self.collide_prism(triangle, extent, &sweep, state)
    }

    pub fn num_providers(&self) -> usize {
        self.providers.num_providers()
    }
}

impl Default for CollisionSceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneViewBase for CollisionSceneView {
    fn add_provider(&self, id: ProviderId, provider: &Rc<dyn SceneProvider>) -> bool {
        self.providers.add_provider(id, provider)
    }

    fn remove_provider(&self, id: ProviderId) -> bool {
        self.providers.remove_provider(id)
    }
}

impl SceneViewType for CollisionSceneView {
    fn create(_scene: &Scene) -> Self {
        Self::new()
    }
}
