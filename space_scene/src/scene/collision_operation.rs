use std::rc::Rc;
use glam::Vec3;
use crate::math::{AABB, CollisionState, SweepParams, WorldTriangle};
use crate::octree::{NodeDataReference, Octree};
use super::object_operation::{IntoHandler, ObjectOperation};
use super::SceneObject;

/// Narrow-phase collision for one object type.
///
/// Handlers report hits through `CollisionState::record_hit` and return its
/// result: `true` stops the whole query.
pub trait CollisionHandler {
    fn collide_ray(
        &self,
        object: &SceneObject,
        source: Vec3,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool;

    fn collide_prism(
        &self,
        object: &SceneObject,
        source: &WorldTriangle,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool;
}

impl<T: CollisionHandler + 'static> IntoHandler<dyn CollisionHandler> for T {
    fn into_handler(self: Rc<Self>) -> Rc<dyn CollisionHandler> {
        self
    }
}

pub type CollisionOperation = ObjectOperation<dyn CollisionHandler>;

impl ObjectOperation<dyn CollisionHandler> {
    /// Objects whose type has no collision handler never collide.
    pub fn collide_ray(
        &self,
        object: &SceneObject,
        source: Vec3,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        match self.handler(object.type_id()) {
            Some(handler) => handler.collide_ray(object, source, extent, sweep, state),
            None => false,
        }
    }

    pub fn collide_prism(
        &self,
        object: &SceneObject,
        source: &WorldTriangle,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        match self.handler(object.type_id()) {
            Some(handler) => handler.collide_prism(object, source, extent, sweep, state),
            None => false,
        }
    }
}

/// Source shape of a sweep. Lets both providers share one octree walk for
/// ray and prism queries.
pub trait SweepShape {
    /// Collect octree nodes the sweep may touch.
    fn gather_nodes(&self, octree: &Octree, sweep: &SweepParams, out: &mut Vec<NodeDataReference>);

    /// Cheap rejection of one object's bounds.
    fn may_hit(&self, bounds: &AABB, sweep: &SweepParams) -> bool;

    fn collide(
        &self,
        operation: &CollisionOperation,
        object: &SceneObject,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool;
}

impl SweepShape for Vec3 {
    fn gather_nodes(&self, octree: &Octree, sweep: &SweepParams, out: &mut Vec<NodeDataReference>) {
        octree.intersect_segment(sweep.start(), sweep.end(), out);
    }

    fn may_hit(&self, bounds: &AABB, sweep: &SweepParams) -> bool {
        bounds.intersects_segment(sweep.start(), sweep.end())
    }

    fn collide(
        &self,
        operation: &CollisionOperation,
        object: &SceneObject,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        operation.collide_ray(object, *self, extent, sweep, state)
    }
}

impl SweepShape for WorldTriangle {
    fn gather_nodes(&self, octree: &Octree, sweep: &SweepParams, out: &mut Vec<NodeDataReference>) {
        octree.intersect_aabb(sweep.shape_box(), out);
    }

    fn may_hit(&self, bounds: &AABB, sweep: &SweepParams) -> bool {
        bounds.intersects(sweep.shape_box())
    }

    fn collide(
        &self,
        operation: &CollisionOperation,
        object: &SceneObject,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        operation.collide_prism(object, self, extent, sweep, state)
    }
}
