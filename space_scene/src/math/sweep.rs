/// Sweep description and collision bookkeeping.
///
/// A sweep moves a shape (a point or a triangle) from its source to an
/// extent. `SweepParams` carries the swept volume used to reject octree
/// nodes and objects; `CollisionState` accumulates hits reported by the
/// per-type collision handlers.

use glam::Vec3;
use crate::scene::SceneObject;
use super::{AABB, WorldTriangle};

#[derive(Debug, Clone, Copy)]
pub struct SweepParams {
    start: Vec3,
    end: Vec3,
    direction: Vec3,
    length: f32,
    shape_box: AABB,
}

impl SweepParams {
    /// Point sweep along the segment `start..end`.
    pub fn ray(start: Vec3, end: Vec3) -> Self {
        let mut shape_box = AABB::inside_out();
        shape_box.add_point(start);
        shape_box.add_point(end);
        Self::build(start, end, shape_box)
    }

    /// Triangle sweep: `source` translated so that its first vertex moves
    /// to `extent`.
    pub fn prism(source: &WorldTriangle, extent: Vec3) -> Self {
        let offset = extent - source.v0;
        let mut shape_box = source.bounds();
        shape_box.add_bounds(&source.translated(offset).bounds());
        Self::build(source.v0, extent, shape_box)
    }

    fn build(start: Vec3, end: Vec3, shape_box: AABB) -> Self {
        let delta = end - start;
        Self {
            start,
            end,
            direction: delta.normalize_or_zero(),
            length: delta.length(),
            shape_box,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// World bounds of the whole swept volume.
    pub fn shape_box(&self) -> &AABB {
        &self.shape_box
    }
}

/// How a collision query reacts to a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMode {
    /// Keep searching, tracking the nearest hit
    #[default]
    Nearest,
    /// Stop at the first hit
    StopOnFirst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    pub object: SceneObject,
    /// Distance along the sweep from its start
    pub distance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionState {
    mode: CollisionMode,
    nearest: Option<CollisionHit>,
    num_hits: u32,
}

impl CollisionState {
    pub fn new(mode: CollisionMode) -> Self {
        Self { mode, nearest: None, num_hits: 0 }
    }

    pub fn mode(&self) -> CollisionMode {
        self.mode
    }

    /// Record a hit. Returns `true` when the query should stop.
    pub fn record_hit(&mut self, object: SceneObject, distance: f32) -> bool {
        self.num_hits += 1;
        let closer = self.nearest.map_or(true, |hit| distance < hit.distance);
        if closer {
            self.nearest = Some(CollisionHit { object, distance });
        }
        self.mode == CollisionMode::StopOnFirst
    }

    pub fn nearest(&self) -> Option<&CollisionHit> {
        self.nearest.as_ref()
    }

    /// Distance beyond which hits cannot improve the result.
    pub fn nearest_distance(&self) -> f32 {
        self.nearest.map_or(f32::MAX, |hit| hit.distance)
    }

    pub fn num_hits(&self) -> u32 {
        self.num_hits
    }

    pub fn has_hit(&self) -> bool {
        self.nearest.is_some()
    }
}
