use std::rc::Rc;
use glam::Mat4;
use crate::math::ConvexHull;
use super::{
    IntersectionSet, IntersectSceneProvider, ProviderId, Scene, SceneIntersectContext,
    SceneProvider, SceneView, SceneViewBase, SceneViewType,
};

/// Hull-vs-scene visibility queries across every intersect provider.
pub struct IntersectSceneView {
    providers: SceneView<dyn IntersectSceneProvider>,
}

impl IntersectSceneView {
    pub fn new() -> Self {
        Self { providers: SceneView::new() }
    }

    /// Collect objects overlapping `hull` from every provider. Returns the
    /// number of objects added to `out`.
    pub fn intersect(
        &self,
        context: &SceneIntersectContext,
        hull: &ConvexHull,
        out: &mut IntersectionSet,
    ) -> usize {
        let mut total = 0;
        self.providers.for_each(|provider| {
            total += provider.intersect(context, hull, out);
        });
        total
    }

    /// Frustum query from a view-projection matrix.
    ///
    /// A singular matrix has no view volume: it is rejected with a warning,
    /// `out` is left untouched and 0 is returned.
    pub fn cull(
        &self,
        context: &SceneIntersectContext,
        view_projection: &Mat4,
        out: &mut IntersectionSet,
    ) -> usize {
        match ConvexHull::from_view_projection(view_projection) {
            Ok(hull) => self.intersect(context, &hull, out),
            Err(err) => {
                crate::engine_warn!("space::IntersectSceneView", "cull skipped: {}", err);
                0
            }
        }
    }

    pub fn num_providers(&self) -> usize {
        self.providers.num_providers()
    }
}

impl Default for IntersectSceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneViewBase for IntersectSceneView {
    fn add_provider(&self, id: ProviderId, provider: &Rc<dyn SceneProvider>) -> bool {
        self.providers.add_provider(id, provider)
    }

    fn remove_provider(&self, id: ProviderId) -> bool {
        self.providers.remove_provider(id)
    }
}

impl SceneViewType for IntersectSceneView {
    fn create(_scene: &Scene) -> Self {
        Self::new()
    }
}
