/// StaticSceneWriter - bakes a static scene section from object bounds.
///
/// Objects are grouped by data format type in order of first appearance,
/// placed in a loose octree sized to their union and flattened into the
/// section layout the `StaticSceneProvider` reads.

use glam::Vec3;
use crate::binary::SectionWriter;
use crate::math::{Sphere, AABB};
use crate::octree::{depth_for_partition, Octree, OctreeContents, INVALID_NODE};
use super::{DataSpan, TypeHeader};

const DEFAULT_PARTITION_SIZE: f32 = 20.0;
const DEFAULT_MAX_DEPTH: u32 = 8;

pub struct StaticSceneWriter {
    /// Per type, in first-appearance order
    types: Vec<(u32, Vec<AABB>)>,
    partition_size: f32,
    max_depth: u32,
}

impl StaticSceneWriter {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            partition_size: DEFAULT_PARTITION_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_partition_size(mut self, partition_size: f32) -> Self {
        self.partition_size = partition_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn add_object(&mut self, type_id: u32, bounds: AABB) -> &mut Self {
        match self.types.iter_mut().find(|(id, _)| *id == type_id) {
            Some((_, objects)) => objects.push(bounds),
            None => self.types.push((type_id, vec![bounds])),
        }
        self
    }

    /// Declare a type with no objects (yields an empty header).
    pub fn add_type(&mut self, type_id: u32) -> &mut Self {
        if !self.types.iter().any(|(id, _)| *id == type_id) {
            self.types.push((type_id, Vec::new()));
        }
        self
    }

    pub fn num_objects(&self) -> usize {
        self.types.iter().map(|(_, objects)| objects.len()).sum()
    }

    pub fn write(&self) -> SectionWriter {
        let headers: Vec<TypeHeader> = self.types.iter()
            .map(|(type_id, objects)| TypeHeader { type_id: *type_id, num_objects: objects.len() as u32 })
            .collect();
        let bounds: Vec<AABB> = self.types.iter()
            .flat_map(|(_, objects)| objects.iter().copied())
            .collect();
        let spheres: Vec<Sphere> = bounds.iter().map(Sphere::from_aabb).collect();

        let mut world = AABB::INSIDE_OUT;
        for bb in &bounds {
            world.add_bounds(bb);
        }
        let (centre, size) = if world.is_inside_out() {
            (Vec3::ZERO, self.partition_size)
        } else {
            (world.centre(), world.max_dimension())
        };

        let mut octree = Octree::new();
        octree.initialise(centre, size, depth_for_partition(size, self.partition_size, self.max_depth));

        let mut contents = OctreeContents::new();
        for (index, bb) in bounds.iter().enumerate() {
            let node = octree.insert(bb);
            if node != INVALID_NODE {
                contents.push(octree.data_on_leaf(node), index as u32);
            }
        }
        octree.update_hierarchy();

        let mut spans = Vec::with_capacity(octree.num_nodes());
        let mut indices = Vec::with_capacity(bounds.len());
        for node in 0..octree.num_nodes() as u32 {
            let entries = contents.contents(octree.data_on_leaf(node));
            spans.push(DataSpan::new(indices.len() as u32, entries.len() as u32));
            indices.extend_from_slice(entries);
        }

        let (header, nodes) = octree.to_records();
        let mut section = SectionWriter::new();
        section
            .write(&[header])
            .write(&nodes)
            .write(&spans)
            .write(&indices)
            .write(&bounds)
            .write(&spheres)
            .write(&headers);
        section
    }
}

impl Default for StaticSceneWriter {
    fn default() -> Self {
        Self::new()
    }
}
