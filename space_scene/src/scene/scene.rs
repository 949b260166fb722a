/// Scene - the composition root of the runtime.
///
/// Owns the provider list, the three type id contexts (views, objects,
/// operations) and the lazily created views and object operations. Views
/// and operations are stored in dense tables indexed by their local type
/// id.
///
/// The runtime is single-threaded: every method takes `&self` and relies
/// on interior mutability. No table is borrowed while user code (a view
/// factory, a provider callback) runs.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use crate::type_system::{RuntimeTypeId, TypeIdContext};
use crate::utils::SlotAllocator;
use super::object_operation::ObjectOperationType;
use super::{ProviderId, SceneProvider, SceneViewBase, SceneViewType};

struct ProviderEntry {
    id: ProviderId,
    provider: Rc<dyn SceneProvider>,
}

/// One created view, kept both for downcasting and for provider fan-out.
#[derive(Clone)]
struct ViewSlot {
    any: Rc<dyn Any>,
    base: Rc<dyn SceneViewBase>,
}

pub struct Scene {
    view_types: TypeIdContext,
    object_types: Rc<TypeIdContext>,
    operation_types: TypeIdContext,
    providers: RefCell<Vec<ProviderEntry>>,
    provider_ids: RefCell<SlotAllocator>,
    views: RefCell<Vec<Option<ViewSlot>>>,
    operations: RefCell<Vec<Option<Rc<dyn Any>>>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            view_types: TypeIdContext::new("views"),
            object_types: Rc::new(TypeIdContext::new("objects")),
            operation_types: TypeIdContext::new("operations"),
            providers: RefCell::new(Vec::new()),
            provider_ids: RefCell::new(SlotAllocator::new()),
            views: RefCell::new(Vec::new()),
            operations: RefCell::new(Vec::new()),
        }
    }

    // ===== TYPE IDS =====

    pub fn object_types(&self) -> &Rc<TypeIdContext> {
        &self.object_types
    }

    /// Local object type id of `T`, assigned on first request.
    pub fn object_type_id<T: 'static>(&self) -> RuntimeTypeId {
        self.object_types.type_id_of::<T>()
    }

    pub fn view_types(&self) -> &TypeIdContext {
        &self.view_types
    }

    pub fn operation_types(&self) -> &TypeIdContext {
        &self.operation_types
    }

    // ===== VIEWS =====

    /// The scene's instance of view `V`, created on first request and
    /// back-filled with every provider already present.
    pub fn view<V: SceneViewType>(&self) -> Rc<V> {
        let type_id = self.view_types.type_id_of::<V>();
        assert!(type_id.is_valid(), "view type table is full");

        let existing = self.views.borrow().get(type_id.index()).cloned().flatten();
        if let Some(slot) = existing {
            return downcast_slot(slot.any);
        }

        let view = Rc::new(V::create(self));
        for (id, provider) in self.provider_snapshot() {
            view.add_provider(id, &provider);
        }

        let mut views = self.views.borrow_mut();
        let index = type_id.index();
        if index >= views.len() {
            views.resize_with(index + 1, || None);
        }
        // A factory that requested its own view already filled the slot
        if let Some(slot) = &views[index] {
            return downcast_slot(Rc::clone(&slot.any));
        }
        let any: Rc<dyn Any> = view.clone();
        let base: Rc<dyn SceneViewBase> = view.clone();
        views[index] = Some(ViewSlot { any, base });
        crate::engine_debug!("space::Scene", "created view {}", std::any::type_name::<V>());
        view
    }

    /// The view if it was already created.
    pub fn existing_view<V: SceneViewType>(&self) -> Option<Rc<V>> {
        let type_id = self.view_types.find_local_id(crate::type_system::global_type_id::<V>())?;
        let slot = self.views.borrow().get(type_id.index()).cloned().flatten()?;
        Some(downcast_slot(slot.any))
    }

    pub fn num_views(&self) -> usize {
        self.views.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    // ===== OBJECT OPERATIONS =====

    /// The scene's instance of operation `O`, created on first request.
    pub fn object_operation<O: ObjectOperationType>(&self) -> Rc<O> {
        let type_id = self.operation_types.type_id_of::<O>();
        assert!(type_id.is_valid(), "operation type table is full");

        let existing = self.operations.borrow().get(type_id.index()).cloned().flatten();
        if let Some(operation) = existing {
            return downcast_slot(operation);
        }

        let operation = Rc::new(O::create(self));
        let mut operations = self.operations.borrow_mut();
        let index = type_id.index();
        if index >= operations.len() {
            operations.resize_with(index + 1, || None);
        }
        if let Some(existing) = &operations[index] {
            return downcast_slot(Rc::clone(existing));
        }
        operations[index] = Some(operation.clone());
        crate::engine_debug!("space::Scene", "created operation {}", std::any::type_name::<O>());
        operation
    }

    // ===== PROVIDERS =====

    /// Register a provider with the scene and every created view.
    ///
    /// # Panics
    ///
    /// Adding the same provider twice is a registration bug and panics.
    /// Must not be called while a view is iterating its providers.
    pub fn add_provider(&self, provider: Rc<dyn SceneProvider>) -> ProviderId {
        assert!(
            self.find_provider(&provider).is_none(),
            "provider '{}' added to the scene twice",
            provider.debug_name()
        );

        let id = ProviderId::new(self.provider_ids.borrow_mut().alloc());
        self.providers.borrow_mut().push(ProviderEntry { id, provider: Rc::clone(&provider) });

        for view in self.view_snapshot() {
            view.add_provider(id, &provider);
        }

        crate::engine_debug!("space::Scene", "added {} '{}'", id, provider.debug_name());
        provider.on_added_to_scene(self, id);
        id
    }

    /// Detach a provider from every view and from the scene. Returns the
    /// provider, or `None` for an unknown id.
    pub fn remove_provider(&self, id: ProviderId) -> Option<Rc<dyn SceneProvider>> {
        let entry = {
            let mut providers = self.providers.borrow_mut();
            let index = providers.iter().position(|entry| entry.id == id)?;
            providers.remove(index)
        };

        for view in self.view_snapshot() {
            view.remove_provider(id);
        }
        self.provider_ids.borrow_mut().free(id.index());

        crate::engine_debug!("space::Scene", "removed {} '{}'", id, entry.provider.debug_name());
        entry.provider.on_removed_from_scene(self);
        Some(entry.provider)
    }

    pub fn find_provider(&self, provider: &Rc<dyn SceneProvider>) -> Option<ProviderId> {
        self.providers
            .borrow()
            .iter()
            .find(|entry| Rc::ptr_eq(&entry.provider, provider))
            .map(|entry| entry.id)
    }

    pub fn provider(&self, id: ProviderId) -> Option<Rc<dyn SceneProvider>> {
        self.providers
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Rc::clone(&entry.provider))
    }

    pub fn num_providers(&self) -> usize {
        self.providers.borrow().len()
    }

    fn provider_snapshot(&self) -> Vec<(ProviderId, Rc<dyn SceneProvider>)> {
        self.providers
            .borrow()
            .iter()
            .map(|entry| (entry.id, Rc::clone(&entry.provider)))
            .collect()
    }

    fn view_snapshot(&self) -> Vec<Rc<dyn SceneViewBase>> {
        self.views
            .borrow()
            .iter()
            .flatten()
            .map(|slot| Rc::clone(&slot.base))
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Table slots are keyed by the type's own id, so a failed downcast means
/// the tables were corrupted.
fn downcast_slot<T: Any>(slot: Rc<dyn Any>) -> Rc<T> {
    match slot.downcast::<T>() {
        Ok(value) => value,
        Err(_) => unreachable!("scene table slot holds another type than {}", std::any::type_name::<T>()),
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
