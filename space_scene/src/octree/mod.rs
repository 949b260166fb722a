//! Loose octree shared by the static and dynamic scene providers.

mod octree;
mod octree_contents;

pub use octree::{
    Octree, NodeIndex, depth_for_partition, NodeDataReference, INVALID_NODE,
    OctreeHeaderRecord, OctreeNodeRecord,
};
pub use octree_contents::OctreeContents;
