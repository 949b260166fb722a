/// Octree - loose octree with lazily created children.
///
/// Each object is placed in exactly one node: the deepest cell whose child
/// size still covers the object's largest extent, following the octant of
/// the object's centre. Objects whose centre lies outside the root cell
/// stay at the root.
///
/// Node bounds are loose. A node keeps the union of the objects placed in
/// it (`content_bounds`) and the union over its whole subtree (`bounds`),
/// so queries test stored bounds and never the nominal cells.
///
/// Nodes live in a flat array. Children are always appended after their
/// parent, which lets `update_hierarchy` run as one reverse sweep.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use crate::math::{ConvexHull, HullTest, AABB};
use crate::space::Result;

/// Index of a node in the flat node array.
pub type NodeIndex = u32;

/// Key under which a node's contents are stored by the owning provider.
pub type NodeDataReference = u32;

pub const INVALID_NODE: NodeIndex = u32::MAX;

/// Index of the root node in the flat node array.
const ROOT: NodeIndex = 0;

/// Deepest level a tree may be initialised with.
const MAX_TREE_DEPTH: u32 = 16;

#[derive(Debug, Clone, Copy)]
struct OctreeNode {
    /// Nominal cell of the node
    cell: AABB,
    /// Union of every object placed in this node's subtree
    bounds: AABB,
    /// Union of the objects placed in this node
    content_bounds: AABB,
    children: [NodeIndex; 8],
    parent: NodeIndex,
    depth: u32,
}

impl OctreeNode {
    fn new(cell: AABB, parent: NodeIndex, depth: u32) -> Self {
        Self {
            cell,
            bounds: AABB::INSIDE_OUT,
            content_bounds: AABB::INSIDE_OUT,
            children: [INVALID_NODE; 8],
            parent,
            depth,
        }
    }
}

// ===== BAKED RECORDS =====

/// Tree parameters, stored once at the start of a baked octree.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OctreeHeaderRecord {
    pub centre: Vec3,
    pub size: f32,
    pub max_depth: u32,
}

/// One node of a baked octree.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OctreeNodeRecord {
    pub cell: AABB,
    pub bounds: AABB,
    pub content_bounds: AABB,
    pub children: [u32; 8],
    pub parent: u32,
    pub depth: u32,
}

// ===== OCTREE =====

#[derive(Debug, Clone, Default)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    centre: Vec3,
    size: f32,
    max_depth: u32,
}

impl Octree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root cell, a cube of edge `size` around `centre`.
    /// `depth` is the number of levels allowed below the root.
    pub fn initialise(&mut self, centre: Vec3, size: f32, depth: u32) {
        self.centre = centre;
        self.size = size.max(0.0);
        self.max_depth = depth.min(MAX_TREE_DEPTH);
        self.reinitialise();
    }

    /// Drop every node but an empty root, keeping the tree parameters.
    pub fn reinitialise(&mut self) {
        let cell = AABB::from_centre_extent(self.centre, Vec3::splat(self.size * 0.5));
        self.nodes.clear();
        self.nodes.push(OctreeNode::new(cell, INVALID_NODE, 0));
    }

    /// Drop every node, leaving an uninitialised tree.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.centre = Vec3::ZERO;
        self.size = 0.0;
        self.max_depth = 0;
    }

    pub fn is_initialised(&self) -> bool {
        !self.nodes.is_empty()
    }

    // ===== INSERTION =====

    /// Place `bounds` in the tree and grow the bounds of the target node
    /// and its ancestors. Returns `INVALID_NODE` for inside-out boxes or
    /// an uninitialised tree.
    pub fn insert(&mut self, bounds: &AABB) -> NodeIndex {
        if bounds.is_inside_out() || !self.is_initialised() {
            return INVALID_NODE;
        }

        let node = self.find_or_create_node(bounds);
        self.update_node_bound(node, bounds);
        node
    }

    /// Walk down from the root creating missing cells on the way.
    fn find_or_create_node(&mut self, bounds: &AABB) -> NodeIndex {
        let object_size = bounds.max_dimension();
        let object_centre = bounds.centre();
        let mut node = ROOT;

        if !self.nodes[ROOT as usize].cell.contains_point(object_centre) {
            return ROOT;
        }

        loop {
            let current = self.nodes[node as usize];
            if current.depth >= self.max_depth {
                return node;
            }

            let child_size = current.cell.max_dimension() * 0.5;
            if child_size < object_size {
                return node;
            }

            let cell_centre = current.cell.centre();
            let octant = point_octant(cell_centre, object_centre);
            let child = current.children[octant as usize];
            node = if child != INVALID_NODE {
                child
            } else {
                self.create_child(node, octant)
            };
        }
    }

    fn create_child(&mut self, parent: NodeIndex, octant: u8) -> NodeIndex {
        let parent_node = &self.nodes[parent as usize];
        let cell = octant_aabb(&parent_node.cell, parent_node.cell.centre(), octant);
        let depth = parent_node.depth + 1;

        let index = self.nodes.len() as NodeIndex;
        self.nodes.push(OctreeNode::new(cell, parent, depth));
        self.nodes[parent as usize].children[octant as usize] = index;
        index
    }

    /// Key under which the contents of `node` are stored.
    pub fn data_on_leaf(&self, node: NodeIndex) -> NodeDataReference {
        node
    }

    /// Grow the content bounds of `node` and the subtree bounds of every
    /// ancestor by `bounds`.
    pub fn update_node_bound(&mut self, node: NodeIndex, bounds: &AABB) {
        if node as usize >= self.nodes.len() {
            return;
        }

        self.nodes[node as usize].content_bounds.add_bounds(bounds);
        let mut current = node;
        while current != INVALID_NODE {
            let entry = &mut self.nodes[current as usize];
            entry.bounds.add_bounds(bounds);
            current = entry.parent;
        }
    }

    /// Recompute every subtree bound from the content bounds, bottom-up.
    pub fn update_hierarchy(&mut self) {
        for node in self.nodes.iter_mut() {
            node.bounds = node.content_bounds;
        }
        for index in (1..self.nodes.len()).rev() {
            let child_bounds = self.nodes[index].bounds;
            let parent = self.nodes[index].parent;
            if parent != INVALID_NODE {
                self.nodes[parent as usize].bounds.add_bounds(&child_bounds);
            }
        }
    }

    // ===== QUERIES =====

    /// Append the data references of every node whose contents may
    /// overlap `hull`.
    pub fn intersect_hull(&self, hull: &ConvexHull, out: &mut Vec<NodeDataReference>) {
        if self.is_initialised() {
            self.intersect_hull_recursive(ROOT, hull, out);
        }
    }

    /// 3-way classification at each node:
    /// - `Outside` skips the subtree
    /// - `Inside` collects the subtree without further testing
    /// - `Partial` tests the node's own contents and recurses
    fn intersect_hull_recursive(&self, node: NodeIndex, hull: &ConvexHull, out: &mut Vec<NodeDataReference>) {
        let entry = &self.nodes[node as usize];
        if entry.bounds.is_inside_out() {
            return;
        }

        match hull.classify_aabb(&entry.bounds) {
            HullTest::Outside => {}
            HullTest::Inside => self.collect_subtree(node, out),
            HullTest::Partial => {
                if !entry.content_bounds.is_inside_out() && hull.intersects_aabb(&entry.content_bounds) {
                    out.push(self.data_on_leaf(node));
                }
                for &child in entry.children.iter().filter(|&&c| c != INVALID_NODE) {
                    self.intersect_hull_recursive(child, hull, out);
                }
            }
        }
    }

    fn collect_subtree(&self, node: NodeIndex, out: &mut Vec<NodeDataReference>) {
        let entry = &self.nodes[node as usize];
        if !entry.content_bounds.is_inside_out() {
            out.push(self.data_on_leaf(node));
        }
        for &child in entry.children.iter().filter(|&&c| c != INVALID_NODE) {
            self.collect_subtree(child, out);
        }
    }

    /// Append the data references of every node whose contents may be
    /// crossed by the segment `start..end`.
    pub fn intersect_segment(&self, start: Vec3, end: Vec3, out: &mut Vec<NodeDataReference>) {
        self.walk(out, &|bounds| bounds.intersects_segment(start, end));
    }

    /// Append the data references of every node whose contents may
    /// overlap `query`.
    pub fn intersect_aabb(&self, query: &AABB, out: &mut Vec<NodeDataReference>) {
        self.walk(out, &|bounds| bounds.intersects(query));
    }

    /// Iterative descent pruned by `overlaps` on subtree bounds.
    fn walk(&self, out: &mut Vec<NodeDataReference>, overlaps: &dyn Fn(&AABB) -> bool) {
        if !self.is_initialised() {
            return;
        }

        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            let entry = &self.nodes[node as usize];
            if entry.bounds.is_inside_out() || !overlaps(&entry.bounds) {
                continue;
            }
            if !entry.content_bounds.is_inside_out() && overlaps(&entry.content_bounds) {
                out.push(self.data_on_leaf(node));
            }
            stack.extend(entry.children.iter().rev().copied().filter(|&c| c != INVALID_NODE));
        }
    }

    // ===== INSPECTION =====

    /// Subtree bounds of `node`.
    pub fn node_bounds(&self, node: NodeIndex) -> Option<&AABB> {
        self.nodes.get(node as usize).map(|entry| &entry.bounds)
    }

    pub fn node_content_bounds(&self, node: NodeIndex) -> Option<&AABB> {
        self.nodes.get(node as usize).map(|entry| &entry.content_bounds)
    }

    pub fn node_cell(&self, node: NodeIndex) -> Option<&AABB> {
        self.nodes.get(node as usize).map(|entry| &entry.cell)
    }

    pub fn node_depth(&self, node: NodeIndex) -> Option<u32> {
        self.nodes.get(node as usize).map(|entry| entry.depth)
    }

    /// Union of everything in the tree, inside out when empty.
    pub fn root_bounds(&self) -> AABB {
        self.nodes.first().map_or(AABB::INSIDE_OUT, |root| root.bounds)
    }

    /// Nominal root cell.
    pub fn root_cell(&self) -> AABB {
        self.nodes.first().map_or(AABB::INSIDE_OUT, |root| root.cell)
    }

    pub fn centre(&self) -> Vec3 {
        self.centre
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of levels allowed below the root.
    pub fn depth(&self) -> u32 {
        self.max_depth
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    // ===== BAKED FORM =====

    pub fn to_records(&self) -> (OctreeHeaderRecord, Vec<OctreeNodeRecord>) {
        let header = OctreeHeaderRecord {
            centre: self.centre,
            size: self.size,
            max_depth: self.max_depth,
        };
        let nodes = self.nodes.iter().map(|node| OctreeNodeRecord {
            cell: node.cell,
            bounds: node.bounds,
            content_bounds: node.content_bounds,
            children: node.children,
            parent: node.parent,
            depth: node.depth,
        }).collect();
        (header, nodes)
    }

    /// Rebuild a tree from baked records, checking every link.
    pub fn from_records(header: &OctreeHeaderRecord, records: &[OctreeNodeRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(crate::engine_err!("space::Octree", "baked octree has no root node"));
        }
        if records[0].parent != INVALID_NODE || records[0].depth != 0 {
            return Err(crate::engine_err!("space::Octree", "baked octree root has a parent or a depth"));
        }

        let max_depth = header.max_depth.min(MAX_TREE_DEPTH);
        let num_nodes = records.len() as u64;
        for (index, record) in records.iter().enumerate() {
            if record.depth > max_depth {
                return Err(crate::engine_err!(
                    "space::Octree",
                    "baked octree node {} at depth {} exceeds max depth {}", index, record.depth, max_depth
                ));
            }
            for &child in record.children.iter().filter(|&&c| c != INVALID_NODE) {
                // Children follow their parent in the flat array
                if child as u64 >= num_nodes || child as usize <= index {
                    return Err(crate::engine_err!(
                        "space::Octree",
                        "baked octree node {} has invalid child {}", index, child
                    ));
                }
                let child_record = &records[child as usize];
                if child_record.parent as usize != index {
                    return Err(crate::engine_err!(
                        "space::Octree",
                        "baked octree node {} does not own child {}", index, child
                    ));
                }
                if child_record.depth != record.depth + 1 {
                    return Err(crate::engine_err!(
                        "space::Octree",
                        "baked octree child {} of node {} has depth {}, expected {}",
                        child, index, child_record.depth, record.depth + 1
                    ));
                }
            }
        }

        let nodes = records.iter().map(|record| OctreeNode {
            cell: record.cell,
            bounds: record.bounds,
            content_bounds: record.content_bounds,
            children: record.children,
            parent: record.parent,
            depth: record.depth,
        }).collect();

        Ok(Self {
            nodes,
            centre: header.centre,
            size: header.size,
            max_depth,
        })
    }
}

/// Tree depth for a world `max_dimension` wide, aiming at cells about
/// `partition_size` wide: `clamp(log2ceil(floor(max_dimension / partition_size)), 1, max_depth)`.
pub fn depth_for_partition(max_dimension: f32, partition_size: f32, max_depth: u32) -> u32 {
    let max_depth = max_depth.max(1);
    if partition_size.is_nan() || partition_size <= 0.0 || !max_dimension.is_finite() {
        return 1;
    }

    let nodes_per_edge = (max_dimension / partition_size).floor().clamp(0.0, u32::MAX as f32) as u32;
    let log2_ceil = match nodes_per_edge {
        0 | 1 => 0,
        n => 32 - (n - 1).leading_zeros(),
    };
    log2_ceil.clamp(1, max_depth)
}

/// Compute the AABB of a specific octant (0-7).
///
/// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
fn octant_aabb(parent: &AABB, centre: Vec3, octant: u8) -> AABB {
    AABB {
        min: Vec3::new(
            if octant & 1 == 0 { parent.min.x } else { centre.x },
            if octant & 2 == 0 { parent.min.y } else { centre.y },
            if octant & 4 == 0 { parent.min.z } else { centre.z },
        ),
        max: Vec3::new(
            if octant & 1 == 0 { centre.x } else { parent.max.x },
            if octant & 2 == 0 { centre.y } else { parent.max.y },
            if octant & 4 == 0 { centre.z } else { parent.max.z },
        ),
    }
}

/// Which octant of a cell centred at `centre` contains `point`.
fn point_octant(centre: Vec3, point: Vec3) -> u8 {
    ((point.x >= centre.x) as u8)
        | (((point.y >= centre.y) as u8) << 1)
        | (((point.z >= centre.z) as u8) << 2)
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;
