/// Change notification views.
///
/// Neither view aggregates providers; providers push notifications into
/// them and dependent subsystems (shadow caches, streaming) listen.

use std::cell::RefCell;
use std::rc::Rc;
use crate::math::AABB;
use super::{ProviderId, Scene, SceneObject, SceneProvider, SceneViewBase, SceneViewType};

pub trait ObjectChangeListener {
    fn on_objects_added(&self, _provider: ProviderId, _objects: &[SceneObject]) {}

    fn on_objects_removed(&self, _provider: ProviderId, _objects: &[SceneObject]) {}

    fn on_objects_changed(&self, _provider: ProviderId, _objects: &[SceneObject]) {}
}

pub trait SceneChangeListener {
    fn on_area_loaded(&self, _bounds: &AABB) {}

    fn on_area_unloaded(&self, _bounds: &AABB) {}
}

/// Listener list shared by both views.
struct Listeners<L: ?Sized> {
    entries: RefCell<Vec<Rc<L>>>,
}

impl<L: ?Sized> Listeners<L> {
    fn new() -> Self {
        Self { entries: RefCell::new(Vec::new()) }
    }

    fn add(&self, listener: Rc<L>) {
        self.entries.borrow_mut().push(listener);
    }

    fn remove(&self, listener: &Rc<L>) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Listeners may (un)register while being notified.
    fn snapshot(&self) -> Vec<Rc<L>> {
        self.entries.borrow().clone()
    }
}

pub struct ObjectChangeSceneView {
    listeners: Listeners<dyn ObjectChangeListener>,
}

impl ObjectChangeSceneView {
    pub fn new() -> Self {
        Self { listeners: Listeners::new() }
    }

    pub fn add_listener(&self, listener: Rc<dyn ObjectChangeListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn ObjectChangeListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn num_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify_objects_added(&self, provider: ProviderId, objects: &[SceneObject]) {
        if objects.is_empty() {
            return;
        }
        for listener in self.listeners.snapshot() {
            listener.on_objects_added(provider, objects);
        }
    }

    pub fn notify_objects_removed(&self, provider: ProviderId, objects: &[SceneObject]) {
        if objects.is_empty() {
            return;
        }
        for listener in self.listeners.snapshot() {
            listener.on_objects_removed(provider, objects);
        }
    }

    pub fn notify_objects_changed(&self, provider: ProviderId, objects: &[SceneObject]) {
        if objects.is_empty() {
            return;
        }
        for listener in self.listeners.snapshot() {
            listener.on_objects_changed(provider, objects);
        }
    }
}

impl Default for ObjectChangeSceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneViewBase for ObjectChangeSceneView {
    fn add_provider(&self, _id: ProviderId, _provider: &Rc<dyn SceneProvider>) -> bool {
        false
    }

    fn remove_provider(&self, _id: ProviderId) -> bool {
        false
    }
}

impl SceneViewType for ObjectChangeSceneView {
    fn create(_scene: &Scene) -> Self {
        Self::new()
    }
}

pub struct ChangeSceneView {
    listeners: Listeners<dyn SceneChangeListener>,
}

impl ChangeSceneView {
    pub fn new() -> Self {
        Self { listeners: Listeners::new() }
    }

    pub fn add_listener(&self, listener: Rc<dyn SceneChangeListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn SceneChangeListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn num_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify_area_loaded(&self, bounds: &AABB) {
        for listener in self.listeners.snapshot() {
            listener.on_area_loaded(bounds);
        }
    }

    pub fn notify_area_unloaded(&self, bounds: &AABB) {
        for listener in self.listeners.snapshot() {
            listener.on_area_unloaded(bounds);
        }
    }
}

impl Default for ChangeSceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneViewBase for ChangeSceneView {
    fn add_provider(&self, _id: ProviderId, _provider: &Rc<dyn SceneProvider>) -> bool {
        false
    }

    fn remove_provider(&self, _id: ProviderId) -> bool {
        false
    }
}

impl SceneViewType for ChangeSceneView {
    fn create(_scene: &Scene) -> Self {
        Self::new()
    }
}
