/// DynamicSceneProvider - index for objects that move every frame.
///
/// Objects live in a generational handle table and in two loose octrees,
/// one over collision bounds and one over visibility bounds.
///
/// - `add_object` and `remove_object` touch the trees immediately, so the
///   very next query sees the change.
/// - `update_object` only records the latest state and marks the handle
///   dirty. Dirty handles keep their committed place in the trees but are
///   skipped by queries.
/// - `on_post_tick` commits every dirty handle by rebuilding both trees
///   from scratch, once per tick.

use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec3};
use slotmap::{new_key_type, SlotMap};
use crate::math::{CollisionState, ConvexHull, SweepParams, WorldTriangle, AABB};
use crate::octree::{
    depth_for_partition, NodeIndex, Octree, OctreeContents, INVALID_NODE,
};
use crate::scene::{
    CollisionOperation, CollisionSceneProvider, IntersectSceneProvider, IntersectionSet,
    ObjectChangeSceneView, ProviderId, Scene, SceneIntersectContext, SceneObject, SceneProvider,
    SweepShape, TickOperation, TickSceneListener, TickSceneProvider,
};
use crate::space::{Error, Result};
use super::DynamicSceneConfig;

const LOG_SOURCE: &str = "space::DynamicSceneProvider";

new_key_type! {
    /// Stable reference to a dynamic object. Survives the swap-removal of
    /// other objects; goes stale when its own object is removed.
    pub struct DynamicObjectHandle;
}

#[derive(Debug, Clone, Copy)]
struct ObjectState {
    world_transform: Mat4,
    collision_bb: AABB,
    visibility_bb: AABB,
}

struct ObjectSlot {
    /// Position in the flat object list
    object_index: usize,
    committed: ObjectState,
    /// Set by `update_object`, committed by the next rebuild
    latest: Option<ObjectState>,
    collision_node: NodeIndex,
    visibility_node: NodeIndex,
}

impl ObjectSlot {
    fn is_dirty(&self) -> bool {
        self.latest.is_some()
    }
}

/// One octree plus the handles stored in its nodes.
#[derive(Default)]
struct HandleTree {
    octree: Octree,
    contents: OctreeContents<DynamicObjectHandle>,
}

impl HandleTree {
    fn insert(&mut self, handle: DynamicObjectHandle, bounds: &AABB) -> NodeIndex {
        let node = self.octree.insert(bounds);
        if node != INVALID_NODE {
            self.contents.push(self.octree.data_on_leaf(node), handle);
        }
        node
    }

    fn remove(&mut self, handle: DynamicObjectHandle, node: NodeIndex) {
        if node != INVALID_NODE {
            let removed = self.contents.remove(self.octree.data_on_leaf(node), &handle);
            debug_assert!(removed, "dynamic object missing from its octree node");
        }
    }

    fn clear(&mut self) {
        self.octree.reinitialise();
        self.contents.clear_all();
    }
}

struct DynamicSceneState {
    slots: SlotMap<DynamicObjectHandle, ObjectSlot>,
    objects: Vec<SceneObject>,
    /// Parallel to `objects`
    object_handles: Vec<DynamicObjectHandle>,
    collision: HandleTree,
    visibility: HandleTree,
    num_dirty_objects: usize,
    partition_size_hint: f32,
}

impl DynamicSceneState {
    /// Reinsert every live object at its committed bounds.
    fn reinsert_all(&mut self) {
        for &handle in &self.object_handles {
            let Some(slot) = self.slots.get_mut(handle) else {
                continue;
            };
            slot.collision_node = self.collision.insert(handle, &slot.committed.collision_bb);
            slot.visibility_node = self.visibility.insert(handle, &slot.committed.visibility_bb);
        }
        self.collision.octree.update_hierarchy();
        self.visibility.octree.update_hierarchy();
    }
}

#[derive(Clone)]
struct Binding {
    id: ProviderId,
    tick: Rc<TickOperation>,
    collision: Rc<CollisionOperation>,
    object_changes: Rc<ObjectChangeSceneView>,
}

pub struct DynamicSceneProvider {
    config: DynamicSceneConfig,
    state: RefCell<DynamicSceneState>,
    binding: RefCell<Option<Binding>>,
}

impl DynamicSceneProvider {
    pub fn new() -> Self {
        Self::with_config(DynamicSceneConfig::default())
    }

    pub fn with_config(config: DynamicSceneConfig) -> Self {
        let mut collision = HandleTree::default();
        let mut visibility = HandleTree::default();
        collision.octree.initialise(config.initial_centre, config.initial_size, config.initial_depth);
        visibility.octree.initialise(config.initial_centre, config.initial_size, config.initial_depth);

        Self {
            state: RefCell::new(DynamicSceneState {
                slots: SlotMap::with_key(),
                objects: Vec::new(),
                object_handles: Vec::new(),
                collision,
                visibility,
                num_dirty_objects: 0,
                partition_size_hint: config.partition_size_hint,
            }),
            config,
            binding: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &DynamicSceneConfig {
        &self.config
    }

    // ===== OBJECTS =====

    /// Add an object. It is queryable as soon as this returns.
    pub fn add_object(
        &self,
        object: SceneObject,
        world_transform: Mat4,
        collision_bb: AABB,
        visibility_bb: AABB,
    ) -> DynamicObjectHandle {
        let handle = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let object_index = state.objects.len();
            let handle = state.slots.insert(ObjectSlot {
                object_index,
                committed: ObjectState { world_transform, collision_bb, visibility_bb },
                latest: None,
                collision_node: INVALID_NODE,
                visibility_node: INVALID_NODE,
            });
            state.objects.push(object);
            state.object_handles.push(handle);

            let collision_node = state.collision.insert(handle, &collision_bb);
            let visibility_node = state.visibility.insert(handle, &visibility_bb);
            if let Some(slot) = state.slots.get_mut(handle) {
                slot.collision_node = collision_node;
                slot.visibility_node = visibility_node;
            }
            handle
        };

        if let Some(binding) = self.binding() {
            binding.object_changes.notify_objects_added(binding.id, &[object]);
        }
        handle
    }

    /// Record the latest state of an object. Queries keep seeing the
    /// committed state until the next `on_post_tick`; the last update of
    /// a tick wins.
    pub fn update_object(
        &self,
        handle: DynamicObjectHandle,
        world_transform: Mat4,
        collision_bb: AABB,
        visibility_bb: AABB,
    ) -> Result<()> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(slot) = state.slots.get_mut(handle) else {
            crate::engine_warn!(LOG_SOURCE, "update of stale handle {:?}", handle);
            return Err(Error::InvalidHandle(format!("{:?}", handle)));
        };

        if !slot.is_dirty() {
            state.num_dirty_objects += 1;
        }
        slot.latest = Some(ObjectState { world_transform, collision_bb, visibility_bb });
        Ok(())
    }

    /// Remove an object from both trees and the object list. No query
    /// returns it afterwards, even before the next `on_post_tick`.
    pub fn remove_object(&self, handle: DynamicObjectHandle) -> Result<()> {
        let object = {
            let state = self.state.borrow();
            match state.slots.get(handle) {
                Some(slot) => state.objects[slot.object_index],
                None => {
                    crate::engine_warn!(LOG_SOURCE, "removal of stale handle {:?}", handle);
                    return Err(Error::InvalidHandle(format!("{:?}", handle)));
                }
            }
        };

        if let Some(binding) = self.binding() {
            binding.object_changes.notify_objects_removed(binding.id, &[object]);
        }

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        // A listener may have removed it already
        let Some(slot) = state.slots.remove(handle) else {
            return Ok(());
        };
        state.collision.remove(handle, slot.collision_node);
        state.visibility.remove(handle, slot.visibility_node);
        if slot.is_dirty() {
            state.num_dirty_objects -= 1;
        }

        // Swap with the last object; only the moved object's index changes
        let index = slot.object_index;
        state.objects.swap_remove(index);
        state.object_handles.swap_remove(index);
        if let Some(&moved) = state.object_handles.get(index) {
            if let Some(moved_slot) = state.slots.get_mut(moved) {
                moved_slot.object_index = index;
            }
        }
        Ok(())
    }

    pub fn is_valid_handle(&self, handle: DynamicObjectHandle) -> bool {
        self.state.borrow().slots.contains_key(handle)
    }

    pub fn object(&self, handle: DynamicObjectHandle) -> Option<SceneObject> {
        let state = self.state.borrow();
        state.slots.get(handle).map(|slot| state.objects[slot.object_index])
    }

    /// Committed world transform.
    pub fn object_world_transform(&self, handle: DynamicObjectHandle) -> Option<Mat4> {
        self.state.borrow().slots.get(handle).map(|slot| slot.committed.world_transform)
    }

    /// Committed collision bounds.
    pub fn object_collision_bb(&self, handle: DynamicObjectHandle) -> Option<AABB> {
        self.state.borrow().slots.get(handle).map(|slot| slot.committed.collision_bb)
    }

    /// Committed visibility bounds.
    pub fn object_visibility_bb(&self, handle: DynamicObjectHandle) -> Option<AABB> {
        self.state.borrow().slots.get(handle).map(|slot| slot.committed.visibility_bb)
    }

    pub fn num_objects(&self) -> usize {
        self.state.borrow().objects.len()
    }

    /// Distinct handles updated since the last commit.
    pub fn num_dirty_objects(&self) -> usize {
        self.state.borrow().num_dirty_objects
    }

    pub fn objects(&self) -> Vec<SceneObject> {
        self.state.borrow().objects.clone()
    }

    // ===== TREES =====

    pub fn set_partition_size_hint(&self, partition_size_hint: f32) {
        self.state.borrow_mut().partition_size_hint = partition_size_hint;
    }

    pub fn partition_size_hint(&self) -> f32 {
        self.state.borrow().partition_size_hint
    }

    /// Fit both trees to `scene_bounds` and reinsert every object at its
    /// committed bounds. Pending updates stay pending.
    pub fn resize_scene(&self, scene_bounds: &AABB) {
        if scene_bounds.is_inside_out() {
            crate::engine_warn!(LOG_SOURCE, "ignoring resize to empty bounds");
            return;
        }

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let partition_size = DynamicSceneConfig {
            partition_size_hint: state.partition_size_hint,
            ..self.config
        }
        .effective_partition_size();
        let size = scene_bounds.max_dimension();
        let depth = depth_for_partition(size, partition_size, self.config.max_depth);

        for tree in [&mut state.collision, &mut state.visibility] {
            tree.octree.reset();
            tree.octree.initialise(scene_bounds.centre(), size, depth);
            tree.contents.clear_all();
        }
        state.reinsert_all();

        crate::engine_debug!(
            LOG_SOURCE,
            "resized to {:?}..{:?} (depth {}, {} objects)",
            scene_bounds.min, scene_bounds.max, depth, state.objects.len()
        );
    }

    /// Levels below the root of both trees.
    pub fn tree_depth(&self) -> u32 {
        self.state.borrow().collision.octree.depth()
    }

    /// Nominal root cell of both trees.
    pub fn tree_cell(&self) -> AABB {
        self.state.borrow().collision.octree.root_cell()
    }

    /// Commit every pending update: rebuild both trees and report the
    /// changed objects. No-op when nothing is dirty.
    fn commit(&self) {
        let changed = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            if state.num_dirty_objects == 0 {
                return;
            }

            state.collision.clear();
            state.visibility.clear();

            let mut changed = Vec::with_capacity(state.num_dirty_objects);
            for &handle in &state.object_handles {
                let Some(slot) = state.slots.get_mut(handle) else {
                    continue;
                };
                if let Some(latest) = slot.latest.take() {
                    slot.committed = latest;
                    changed.push(state.objects[slot.object_index]);
                }
            }
            state.reinsert_all();
            state.num_dirty_objects = 0;
            changed
        };

        crate::engine_trace!(LOG_SOURCE, "committed {} changed objects", changed.len());
        if let Some(binding) = self.binding() {
            binding.object_changes.notify_objects_changed(binding.id, &changed);
        }
    }

    // ===== QUERIES =====

    fn binding(&self) -> Option<Binding> {
        self.binding.borrow().clone()
    }

    fn collide<S: SweepShape>(
        &self,
        source: &S,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        let Some(binding) = self.binding() else {
            return false;
        };
        let data = self.state.borrow();

        let mut nodes = Vec::new();
        source.gather_nodes(&data.collision.octree, sweep, &mut nodes);
        for node in nodes {
            for &handle in data.collision.contents.contents(node) {
                let Some(slot) = data.slots.get(handle) else {
                    continue;
                };
                if slot.is_dirty() {
                    continue;
                }
                let object = &data.objects[slot.object_index];
                if object.is_valid()
                    && source.may_hit(&slot.committed.collision_bb, sweep)
                    && source.collide(&*binding.collision, object, extent, sweep, state)
                {
                    return true;
                }
            }
        }
        false
    }
}

impl Default for DynamicSceneProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectSceneProvider for DynamicSceneProvider {
    fn intersect(
        &self,
        context: &SceneIntersectContext,
        hull: &ConvexHull,
        out: &mut IntersectionSet,
    ) -> usize {
        if !context.include_dynamic_objects() {
            return 0;
        }

        let state = self.state.borrow();
        let mut nodes = Vec::new();
        state.visibility.octree.intersect_hull(hull, &mut nodes);

        let mut count = 0;
        for node in nodes {
            for &handle in state.visibility.contents.contents(node) {
                let Some(slot) = state.slots.get(handle) else {
                    continue;
                };
                let bounds = &slot.committed.visibility_bb;
                if slot.is_dirty() || bounds.is_inside_out() || !hull.intersects_aabb(bounds) {
                    continue;
                }
                let object = state.objects[slot.object_index];
                if context.accepts(&object) && out.insert(object) {
                    count += 1;
                }
            }
        }

        debug_assert!(count <= state.objects.len());
        count
    }
}

impl CollisionSceneProvider for DynamicSceneProvider {
    fn collide_ray(&self, source: Vec3, extent: Vec3, sweep: &SweepParams, state: &mut CollisionState) -> bool {
        self.collide(&source, extent, sweep, state)
    }

    fn collide_prism(
        &self,
        source: &WorldTriangle,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        self.collide(source, extent, sweep, state)
    }
}

impl TickSceneListener for DynamicSceneProvider {
    fn on_pre_tick(&self) {}

    fn on_post_tick(&self) {
        self.commit();
    }
}

impl TickSceneProvider for DynamicSceneProvider {
    /// Handlers may add or remove objects while ticking, so they run over
    /// a snapshot.
    fn tick(&self, dt: f32) {
        let Some(binding) = self.binding() else {
            return;
        };
        let objects = self.objects();
        if !objects.is_empty() {
            binding.tick.tick(dt, &objects);
        }
    }

    fn update_animations(&self, dt: f32) {
        let Some(binding) = self.binding() else {
            return;
        };
        let objects = self.objects();
        if !objects.is_empty() {
            binding.tick.update_animations(dt, &objects);
        }
    }
}

impl SceneProvider for DynamicSceneProvider {
    fn intersect_provider(&self) -> Option<&(dyn IntersectSceneProvider + 'static)> {
        Some(self)
    }

    fn collision_provider(&self) -> Option<&(dyn CollisionSceneProvider + 'static)> {
        Some(self)
    }

    fn tick_provider(&self) -> Option<&(dyn TickSceneProvider + 'static)> {
        Some(self)
    }

    fn on_added_to_scene(&self, scene: &Scene, id: ProviderId) {
        self.binding.replace(Some(Binding {
            id,
            tick: scene.object_operation::<TickOperation>(),
            collision: scene.object_operation::<CollisionOperation>(),
            object_changes: scene.view::<ObjectChangeSceneView>(),
        }));
    }

    fn on_removed_from_scene(&self, _scene: &Scene) {
        self.binding.replace(None);
    }

    fn debug_name(&self) -> &str {
        "DynamicSceneProvider"
    }
}

#[cfg(test)]
#[path = "dynamic_scene_provider_tests.rs"]
mod tests;
