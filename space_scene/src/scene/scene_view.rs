/// SceneView - the providers supporting one query interface.
///
/// Concrete views wrap a `SceneView<dyn Interface>` and aggregate results
/// across its providers. The `Scene` keeps every created view in sync with
/// its provider list.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use super::{ProviderId, ProviderInterface, Scene, SceneProvider};

/// Provider bookkeeping every view exposes to the `Scene`.
pub trait SceneViewBase {
    /// Returns `true` when the view kept the provider.
    fn add_provider(&self, id: ProviderId, provider: &Rc<dyn SceneProvider>) -> bool;

    fn remove_provider(&self, id: ProviderId) -> bool;
}

/// Views the `Scene` can create on first request.
pub trait SceneViewType: SceneViewBase + 'static + Sized {
    fn create(scene: &Scene) -> Self;
}

pub struct SceneView<P: ?Sized> {
    providers: RefCell<Vec<(ProviderId, Rc<dyn SceneProvider>)>>,
    marker: PhantomData<fn(&P)>,
}

impl<P: ProviderInterface + ?Sized> SceneView<P> {
    pub fn new() -> Self {
        Self { providers: RefCell::new(Vec::new()), marker: PhantomData }
    }

    /// Keep `provider` if it implements `P`.
    pub fn add_provider(&self, id: ProviderId, provider: &Rc<dyn SceneProvider>) -> bool {
        if P::query(provider.as_ref()).is_none() {
            return false;
        }

        let mut providers = self.providers.borrow_mut();
        if providers.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        providers.push((id, Rc::clone(provider)));
        true
    }

    pub fn remove_provider(&self, id: ProviderId) -> bool {
        let mut providers = self.providers.borrow_mut();
        match providers.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                providers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn num_providers(&self) -> usize {
        self.providers.borrow().len()
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.borrow().iter().any(|(existing, _)| *existing == id)
    }

    /// Visit providers in registration order until `f` returns `true`.
    /// Returns whether a visit stopped the walk.
    ///
    /// Walks a snapshot, so the provider list is not borrowed while a
    /// provider runs.
    pub fn for_each_until<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&P) -> bool,
    {
        let snapshot: Vec<Rc<dyn SceneProvider>> =
            self.providers.borrow().iter().map(|(_, p)| Rc::clone(p)).collect();

        for provider in &snapshot {
            if let Some(interface) = P::query(provider.as_ref()) {
                if f(interface) {
                    return true;
                }
            }
        }
        false
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&P),
    {
        self.for_each_until(|interface| {
            f(interface);
            false
        });
    }
}

impl<P: ProviderInterface + ?Sized> Default for SceneView<P> {
    fn default() -> Self {
        Self::new()
    }
}
