use std::rc::Rc;
use crate::type_system::RuntimeTypeId;
use super::object_operation::{for_each_type_run, IntoHandler, ObjectOperation};
use super::SceneObject;

/// Per-type tick behaviour. Always called with a contiguous run of objects
/// of the type the handler was registered for.
pub trait TickHandler {
    fn tick(&self, dt: f32, objects: &[SceneObject]);

    fn update_animations(&self, _dt: f32, _objects: &[SceneObject]) {}
}

impl<T: TickHandler + 'static> IntoHandler<dyn TickHandler> for T {
    fn into_handler(self: Rc<Self>) -> Rc<dyn TickHandler> {
        self
    }
}

pub type TickOperation = ObjectOperation<dyn TickHandler>;

impl ObjectOperation<dyn TickHandler> {
    /// Tick a run of objects that all have `type_id`. Types without a
    /// handler did not opt into ticking and are skipped.
    pub fn tick_type(&self, dt: f32, type_id: RuntimeTypeId, objects: &[SceneObject]) {
        if let Some(handler) = self.handler(type_id) {
            handler.tick(dt, objects);
        }
    }

    pub fn update_animations_type(&self, dt: f32, type_id: RuntimeTypeId, objects: &[SceneObject]) {
        if let Some(handler) = self.handler(type_id) {
            handler.update_animations(dt, objects);
        }
    }

    /// Tick a mixed batch: one handler call per type present.
    pub fn tick(&self, dt: f32, objects: &[SceneObject]) {
        for_each_type_run(objects, |type_id, run| self.tick_type(dt, type_id, run));
    }

    pub fn update_animations(&self, dt: f32, objects: &[SceneObject]) {
        for_each_type_run(objects, |type_id, run| self.update_animations_type(dt, type_id, run));
    }
}
