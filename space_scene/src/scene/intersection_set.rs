/// IntersectionSet - query results bucketed by object type.
///
/// Draw and spatial-query dispatch walk the buckets, so each handler is
/// invoked once per type with a contiguous slice. An object appears at
/// most once however many queries fill the set.

use rustc_hash::FxHashSet;
use crate::type_system::RuntimeTypeId;
use super::SceneObject;

#[derive(Debug, Clone, Default)]
pub struct IntersectionSet {
    buckets: Vec<Vec<SceneObject>>,
    members: Vec<FxHashSet<SceneObject>>,
    num_objects: usize,
}

impl IntersectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the object was already in the set.
    pub fn insert(&mut self, object: SceneObject) -> bool {
        let index = object.type_id().index();
        if index >= self.buckets.len() {
            self.buckets.resize_with(index + 1, Vec::new);
            self.members.resize_with(index + 1, FxHashSet::default);
        }
        if !self.members[index].insert(object) {
            return false;
        }
        self.buckets[index].push(object);
        self.num_objects += 1;
        true
    }

    pub fn extend<I: IntoIterator<Item = SceneObject>>(&mut self, objects: I) {
        for object in objects {
            self.insert(object);
        }
    }

    pub fn objects_of_type(&self, type_id: RuntimeTypeId) -> &[SceneObject] {
        self.buckets.get(type_id.index()).map_or(&[], |bucket| bucket.as_slice())
    }

    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    pub fn is_empty(&self) -> bool {
        self.num_objects == 0
    }

    /// Highest type id with a bucket (UNKNOWN when nothing was inserted).
    pub fn max_type(&self) -> RuntimeTypeId {
        RuntimeTypeId::new(self.buckets.len().saturating_sub(1) as u8)
    }

    pub fn contains(&self, object: &SceneObject) -> bool {
        self.members
            .get(object.type_id().index())
            .is_some_and(|members| members.contains(object))
    }

    /// Non-empty buckets in ascending type order.
    pub fn types(&self) -> impl Iterator<Item = (RuntimeTypeId, &[SceneObject])> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(index, bucket)| (RuntimeTypeId::new(index as u8), bucket.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> + '_ {
        self.buckets.iter().flatten()
    }

    /// Empty every bucket, keeping allocations for the next frame.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for members in &mut self.members {
            members.clear();
        }
        self.num_objects = 0;
    }
}
