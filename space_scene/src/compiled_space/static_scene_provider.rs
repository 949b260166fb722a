/// StaticSceneProvider - serves a baked, immutable set of objects.
///
/// Lifecycle:
/// 1. `add_type_handler` for every object kind the space may contain
/// 2. `load` reads the scene section and lets each handler fill its
///    sub-range of objects (may run before the provider is shared)
/// 3. `bind` publishes the provider to a `Scene`
/// 4. `unload` notifies the views, leaves the scene and releases storage
///
/// Objects are stored grouped by type in header order. Sub-ranges whose
/// type has no handler keep invalid objects and are ignored by queries.

use std::cell::RefCell;
use std::rc::Rc;
use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::binary::{BinaryFormat, StringTable};
use crate::math::{CollisionState, ConvexHull, Sphere, SweepParams, WorldTriangle, AABB};
use crate::octree::{NodeDataReference, Octree, OctreeHeaderRecord, OctreeNodeRecord};
use crate::scene::{
    ChangeSceneView, CollisionOperation, CollisionSceneProvider, IntersectSceneProvider,
    IntersectionSet, ObjectChangeSceneView, ProviderId, Scene, SceneIntersectContext,
    SceneObject, SceneProvider, SweepShape, TickOperation, TickSceneListener, TickSceneProvider,
};
use crate::space::Result;
use super::{
    DataSpan, StaticSceneConfig, StaticSceneLoadContext, StaticSceneTypeHandler, TypeHeader,
    STATIC_SCENE_VERSION,
};

const LOG_SOURCE: &str = "space::StaticSceneProvider";

#[derive(Default)]
struct StaticSceneData {
    loaded: bool,
    type_headers: Vec<TypeHeader>,
    objects: Vec<SceneObject>,
    octree: Octree,
    node_contents: Vec<DataSpan>,
    contents: Vec<u32>,
    object_bounds: Vec<AABB>,
    sphere_bounds: Vec<Sphere>,
}

impl StaticSceneData {
    /// Object indices stored under `node`.
    fn node_objects(&self, node: NodeDataReference) -> &[u32] {
        self.node_contents
            .get(node as usize)
            .and_then(|span| self.contents.get(span.range()))
            .unwrap_or(&[])
    }
}

/// Scene resources cached while the provider is bound.
#[derive(Clone)]
struct Binding {
    id: ProviderId,
    tick: Rc<TickOperation>,
    collision: Rc<CollisionOperation>,
    object_changes: Rc<ObjectChangeSceneView>,
    area_changes: Rc<ChangeSceneView>,
}

pub struct StaticSceneProvider {
    config: StaticSceneConfig,
    handlers: RefCell<FxHashMap<u32, Box<dyn StaticSceneTypeHandler>>>,
    data: RefCell<StaticSceneData>,
    binding: RefCell<Option<Binding>>,
}

impl StaticSceneProvider {
    pub fn new() -> Self {
        Self::with_config(StaticSceneConfig::default())
    }

    pub fn with_config(config: StaticSceneConfig) -> Self {
        Self {
            config,
            handlers: RefCell::new(FxHashMap::default()),
            data: RefCell::new(StaticSceneData::default()),
            binding: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &StaticSceneConfig {
        &self.config
    }

    // ===== TYPE HANDLERS =====

    /// Register the loader for `handler.type_id()`, returning the loader
    /// it replaces.
    pub fn add_type_handler(
        &mut self,
        handler: Box<dyn StaticSceneTypeHandler>,
    ) -> Option<Box<dyn StaticSceneTypeHandler>> {
        self.handlers.get_mut().insert(handler.type_id(), handler)
    }

    pub fn remove_type_handler(&mut self, type_id: u32) -> Option<Box<dyn StaticSceneTypeHandler>> {
        self.handlers.get_mut().remove(&type_id)
    }

    pub fn has_type_handler(&self, type_id: u32) -> bool {
        self.handlers.borrow().contains_key(&type_id)
    }

    // ===== LOAD =====

    /// Read the scene section and load every type with a handler.
    ///
    /// A missing or malformed section fails the whole load and leaves the
    /// provider empty. Unknown types only invalidate their own sub-range.
    ///
    /// # Panics
    ///
    /// Loading an already loaded provider is a lifecycle bug and panics.
    pub fn load(&mut self, format: &BinaryFormat, strings: &StringTable) -> Result<()> {
        assert!(!self.data.get_mut().loaded, "{} loaded twice", self.config.debug_name);

        let mut data = self.read_section(format)?;

        let mut offset = 0usize;
        let handlers = self.handlers.get_mut();
        for header in &data.type_headers {
            let range = offset..offset + header.num_objects as usize;
            offset = range.end;

            let Some(handler) = handlers.get_mut(&header.type_id) else {
                crate::engine_warn!(
                    LOG_SOURCE,
                    "{}: unknown object type id {}, skipping {} objects",
                    self.config.debug_name, header.type_id, header.num_objects
                );
                continue;
            };

            let context = StaticSceneLoadContext {
                format,
                strings,
                bounds: &data.object_bounds[range.clone()],
            };
            let objects = &mut data.objects[range];
            if !handler.load(&context, objects) {
                crate::engine_warn!(
                    LOG_SOURCE,
                    "{}: failed to load objects with type id {}",
                    self.config.debug_name, header.type_id
                );
            }

            let runtime_type = handler.runtime_type_id();
            debug_assert!(
                objects.iter().filter(|o| o.is_valid()).all(|o| o.is_type(runtime_type)),
                "type {} loader produced objects of another type",
                header.type_id
            );
        }

        data.loaded = true;
        crate::engine_debug!(
            LOG_SOURCE,
            "{}: loaded {} objects in {} types",
            self.config.debug_name, data.objects.len(), data.type_headers.len()
        );
        *self.data.get_mut() = data;
        Ok(())
    }

    /// Read and cross-check every array of the scene section.
    fn read_section(&self, format: &BinaryFormat) -> Result<StaticSceneData> {
        let name = self.config.debug_name;
        let mut stream = format.find_and_open_section(self.config.format_magic, STATIC_SCENE_VERSION, name)?;

        let octree_header = stream.read::<OctreeHeaderRecord>()?;
        let octree_nodes = stream.read::<OctreeNodeRecord>()?;
        let node_contents = stream.read::<DataSpan>()?;
        let contents = stream.read::<u32>()?;
        let object_bounds = stream.read::<AABB>()?;
        let sphere_bounds = stream.read::<Sphere>()?;
        let type_headers = stream.read::<TypeHeader>()?;
        format.close_section(stream);

        let [octree_header] = octree_header.as_slice() else {
            return Err(crate::engine_err!(LOG_SOURCE, "{}: expected one octree header, found {}", name, octree_header.len()));
        };
        let octree = Octree::from_records(octree_header, &octree_nodes)?;

        let num_objects: usize = type_headers.iter().map(|h| h.num_objects as usize).sum();
        if object_bounds.len() != num_objects || sphere_bounds.len() != num_objects {
            crate::engine_bail!(
                LOG_SOURCE,
                "{}: {} objects declared but {} bounds and {} spheres stored",
                name, num_objects, object_bounds.len(), sphere_bounds.len()
            );
        }
        if node_contents.len() != octree.num_nodes() {
            crate::engine_bail!(
                LOG_SOURCE,
                "{}: {} node spans for {} octree nodes",
                name, node_contents.len(), octree.num_nodes()
            );
        }
        if let Some(span) = node_contents.iter().find(|span| span.range().end > contents.len()) {
            crate::engine_bail!(LOG_SOURCE, "{}: node span {:?} exceeds {} contents", name, span, contents.len());
        }
        if let Some(index) = contents.iter().find(|&&index| index as usize >= num_objects) {
            crate::engine_bail!(LOG_SOURCE, "{}: content index {} exceeds {} objects", name, index, num_objects);
        }

        Ok(StaticSceneData {
            loaded: false,
            objects: vec![SceneObject::INVALID; num_objects],
            type_headers,
            octree,
            node_contents,
            contents,
            object_bounds,
            sphere_bounds,
        })
    }

    // ===== BIND / UNLOAD =====

    /// Publish the provider to `scene`: bind every present type handler,
    /// join the scene's views and announce the objects and the area.
    pub fn bind(self: &Rc<Self>, scene: &Scene) -> bool {
        if self.binding.borrow().is_some() {
            crate::engine_warn!(LOG_SOURCE, "{}: already bound", self.config.debug_name);
            return false;
        }

        if self.is_valid() {
            scene.add_provider(Rc::clone(self) as Rc<dyn SceneProvider>);
        }

        let mut result = true;
        {
            let data = self.data.borrow();
            let mut handlers = self.handlers.borrow_mut();
            let mut bound: Vec<u32> = Vec::with_capacity(data.type_headers.len());
            for header in &data.type_headers {
                if bound.contains(&header.type_id) {
                    continue;
                }
                if let Some(handler) = handlers.get_mut(&header.type_id) {
                    result &= handler.bind();
                    bound.push(header.type_id);
                }
            }
        }

        let binding = self.binding.borrow().clone();
        if let Some(binding) = binding {
            let data = self.data.borrow();
            binding.object_changes.notify_objects_added(binding.id, &data.objects);
            binding.area_changes.notify_area_loaded(&data.octree.root_bounds());
            crate::engine_debug!(
                LOG_SOURCE,
                "{}: bound as {} with {} objects",
                self.config.debug_name, binding.id, data.objects.len()
            );
        }

        result
    }

    /// Leave `scene` and release everything `load` created.
    pub fn unload(&self, scene: &Scene) {
        let binding = self.binding.borrow().clone();
        if let Some(binding) = binding {
            {
                let data = self.data.borrow();
                binding.object_changes.notify_objects_removed(binding.id, &data.objects);
                binding.area_changes.notify_area_unloaded(&data.octree.root_bounds());
            }
            scene.remove_provider(binding.id);
            self.binding.replace(None);
        }

        let type_ids: Vec<u32> = self.data.borrow().type_headers.iter().map(|h| h.type_id).collect();
        {
            let mut handlers = self.handlers.borrow_mut();
            let mut unloaded: Vec<u32> = Vec::with_capacity(type_ids.len());
            for type_id in type_ids.into_iter().rev() {
                if unloaded.contains(&type_id) {
                    continue;
                }
                if let Some(handler) = handlers.get_mut(&type_id) {
                    handler.unload();
                    unloaded.push(type_id);
                }
            }
        }

        *self.data.borrow_mut() = StaticSceneData::default();
        crate::engine_debug!(LOG_SOURCE, "{}: unloaded", self.config.debug_name);
    }

    // ===== ACCESSORS =====

    /// True once `load` succeeded and until `unload`.
    pub fn is_valid(&self) -> bool {
        self.data.borrow().loaded
    }

    pub fn is_bound(&self) -> bool {
        self.binding.borrow().is_some()
    }

    pub fn provider_id(&self) -> Option<ProviderId> {
        self.binding.borrow().as_ref().map(|binding| binding.id)
    }

    /// Mean load progress of the registered type handlers.
    pub fn percent_loaded(&self) -> f32 {
        let handlers = self.handlers.borrow();
        if handlers.is_empty() {
            return 1.0;
        }
        handlers.values().map(|handler| handler.load_percent()).sum::<f32>() / handlers.len() as f32
    }

    pub fn num_objects(&self) -> usize {
        self.data.borrow().objects.len()
    }

    pub fn object(&self, index: usize) -> Option<SceneObject> {
        self.data.borrow().objects.get(index).copied()
    }

    pub fn object_bounds(&self, index: usize) -> Option<AABB> {
        self.data.borrow().object_bounds.get(index).copied()
    }

    pub fn type_headers(&self) -> Vec<TypeHeader> {
        self.data.borrow().type_headers.clone()
    }

    /// Union of every indexed object, inside out before loading.
    pub fn bounds(&self) -> AABB {
        self.data.borrow().octree.root_bounds()
    }

    // ===== QUERIES =====

    fn collide<S: SweepShape>(
        &self,
        source: &S,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        let Some(operation) = self.binding.borrow().as_ref().map(|b| Rc::clone(&b.collision)) else {
            return false;
        };
        let data = self.data.borrow();
        if data.objects.is_empty() {
            return false;
        }

        let mut nodes = Vec::new();
        source.gather_nodes(&data.octree, sweep, &mut nodes);
        for node in nodes {
            for &index in data.node_objects(node) {
                let index = index as usize;
                let object = &data.objects[index];
                if object.is_valid()
                    && source.may_hit(&data.object_bounds[index], sweep)
                    && source.collide(&*operation, object, extent, sweep, state)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Dispatch one call per non-empty type header run.
    fn for_each_type_run(&self, mut f: impl FnMut(&TickOperation, &[SceneObject])) {
        let Some(operation) = self.binding.borrow().as_ref().map(|b| Rc::clone(&b.tick)) else {
            return;
        };
        let data = self.data.borrow();
        let mut offset = 0usize;
        for header in &data.type_headers {
            let range = offset..offset + header.num_objects as usize;
            offset = range.end;
            if !range.is_empty() {
                f(&*operation, &data.objects[range]);
            }
        }
    }
}

impl Default for StaticSceneProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectSceneProvider for StaticSceneProvider {
    fn intersect(
        &self,
        context: &SceneIntersectContext,
        hull: &ConvexHull,
        out: &mut IntersectionSet,
    ) -> usize {
        if !context.include_static_objects() {
            return 0;
        }

        let data = self.data.borrow();
        let mut nodes = Vec::new();
        data.octree.intersect_hull(hull, &mut nodes);

        let mut count = 0;
        for node in nodes {
            let indices = data.node_objects(node);
            // A lone object was already tested through its node bounds
            let narrow = indices.len() > 1;
            for &index in indices {
                let index = index as usize;
                if narrow && !hull.intersects_sphere(&data.sphere_bounds[index]) {
                    continue;
                }
                let object = data.objects[index];
                if context.accepts(&object) && out.insert(object) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl CollisionSceneProvider for StaticSceneProvider {
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

impl TickSceneListener for StaticSceneProvider {}

impl TickSceneProvider for StaticSceneProvider {
    fn tick(&self, dt: f32) {
        self.for_each_type_run(|operation, run| operation.tick_type(dt, run[0].type_id(), run));
    }

    fn update_animations(&self, dt: f32) {
        self.for_each_type_run(|operation, run| operation.update_animations_type(dt, run[0].type_id(), run));
    }
}

impl SceneProvider for StaticSceneProvider {
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
            area_changes: scene.view::<ChangeSceneView>(),
        }));
    }

    fn on_removed_from_scene(&self, _scene: &Scene) {
        self.binding.replace(None);
    }

    fn debug_name(&self) -> &str {
        self.config.debug_name
    }
}

#[cfg(test)]
#[path = "static_scene_provider_tests.rs"]
mod tests;
