use std::cell::RefCell;
use std::rc::Rc;
use super::{
    ProviderId, Scene, SceneProvider, SceneView, SceneViewBase, SceneViewType,
    TickSceneListener, TickSceneProvider,
};

/// Per-frame fan-out.
///
/// Frame order: `tick` (provider ticks, then `on_pre_tick`), application
/// work, then `post_tick` (`on_post_tick`, where dynamic providers commit
/// their pending updates). Tick providers are notified before external
/// listeners.
pub struct TickSceneView {
    providers: SceneView<dyn TickSceneProvider>,
    listeners: RefCell<Vec<Rc<dyn TickSceneListener>>>,
}

impl TickSceneView {
    pub fn new() -> Self {
        Self { providers: SceneView::new(), listeners: RefCell::new(Vec::new()) }
    }

    pub fn tick(&self, dt: f32) {
        self.providers.for_each(|provider| provider.tick(dt));
        self.providers.for_each(|provider| provider.on_pre_tick());
        for listener in self.listeners_snapshot() {
            listener.on_pre_tick();
        }
    }

    pub fn update_animations(&self, dt: f32) {
        self.providers.for_each(|provider| provider.update_animations(dt));
    }

    pub fn post_tick(&self) {
        self.providers.for_each(|provider| provider.on_post_tick());
        for listener in self.listeners_snapshot() {
            listener.on_post_tick();
        }
    }

    pub fn add_listener(&self, listener: Rc<dyn TickSceneListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn remove_listener(&self, listener: &Rc<dyn TickSceneListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn num_providers(&self) -> usize {
        self.providers.num_providers()
    }

    fn listeners_snapshot(&self) -> Vec<Rc<dyn TickSceneListener>> {
        self.listeners.borrow().clone()
    }
}

impl Default for TickSceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneViewBase for TickSceneView {
    fn add_provider(&self, id: ProviderId, provider: &Rc<dyn SceneProvider>) -> bool {
        self.providers.add_provider(id, provider)
    }

    fn remove_provider(&self, id: ProviderId) -> bool {
        self.providers.remove_provider(id)
    }
}

impl SceneViewType for TickSceneView {
    fn create(_scene: &Scene) -> Self {
        Self::new()
    }
}
