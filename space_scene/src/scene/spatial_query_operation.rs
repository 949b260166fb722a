use std::rc::Rc;
use glam::Mat4;
use crate::math::AABB;
use super::object_operation::{IntoHandler, ObjectOperation};
use super::{IntersectionSet, SceneObject};

pub trait SpatialQueryHandler {
    fn world_transform(&self, object: &SceneObject) -> Mat4;

    fn world_visibility_bounding_box(&self, object: &SceneObject) -> AABB;

    /// Grow `bounds` by every object of the run.
    fn accumulate_world_visibility_bounding_boxes(&self, objects: &[SceneObject], bounds: &mut AABB) {
        for object in objects {
            bounds.add_bounds(&self.world_visibility_bounding_box(object));
        }
    }
}

impl<T: SpatialQueryHandler + 'static> IntoHandler<dyn SpatialQueryHandler> for T {
    fn into_handler(self: Rc<Self>) -> Rc<dyn SpatialQueryHandler> {
        self
    }
}

pub type SpatialQueryOperation = ObjectOperation<dyn SpatialQueryHandler>;

impl ObjectOperation<dyn SpatialQueryHandler> {
    pub fn world_transform(&self, object: &SceneObject) -> Option<Mat4> {
        self.handler(object.type_id()).map(|handler| handler.world_transform(object))
    }

    pub fn world_visibility_bounding_box(&self, object: &SceneObject) -> Option<AABB> {
        self.handler(object.type_id())
            .map(|handler| handler.world_visibility_bounding_box(object))
    }

    /// Union of the visibility bounds of everything in `set`, one handler
    /// call per type bucket. Inside out when nothing contributes.
    pub fn accumulate_world_visibility_bounding_boxes(&self, set: &IntersectionSet) -> AABB {
        let mut bounds = AABB::inside_out();
        for (type_id, objects) in set.types() {
            if let Some(handler) = self.handler(type_id) {
                handler.accumulate_world_visibility_bounding_boxes(objects, &mut bounds);
            }
        }
        bounds
    }
}
