use std::rc::Rc;
use glam::{Mat4, Vec3};
use crate::type_system::RuntimeTypeId;
use super::object_operation::{for_each_type_run, IntoHandler, ObjectOperation};
use super::{IntersectionSet, SceneObject};

/// State handed to draw handlers for one pass.
///
/// Draw submission itself belongs to the renderer; handlers only read the
/// camera and report how many draw calls they issued.
#[derive(Debug, Clone)]
pub struct DrawContext {
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub shadow_pass: bool,
    pub draw_calls: u32,
}

impl DrawContext {
    pub fn new(view_projection: Mat4, camera_position: Vec3) -> Self {
        Self { view_projection, camera_position, shadow_pass: false, draw_calls: 0 }
    }
}

pub trait DrawHandler {
    fn draw(&self, context: &mut DrawContext, objects: &[SceneObject]);
}

impl<T: DrawHandler + 'static> IntoHandler<dyn DrawHandler> for T {
    fn into_handler(self: Rc<Self>) -> Rc<dyn DrawHandler> {
        self
    }
}

pub type DrawOperation = ObjectOperation<dyn DrawHandler>;

impl ObjectOperation<dyn DrawHandler> {
    pub fn draw_type(&self, context: &mut DrawContext, type_id: RuntimeTypeId, objects: &[SceneObject]) {
        if let Some(handler) = self.handler(type_id) {
            handler.draw(context, objects);
        }
    }

    pub fn draw(&self, context: &mut DrawContext, objects: &[SceneObject]) {
        for_each_type_run(objects, |type_id, run| self.draw_type(context, type_id, run));
    }

    /// Draw every bucket of a visibility query.
    pub fn draw_set(&self, context: &mut DrawContext, set: &IntersectionSet) {
        for (type_id, objects) in set.types() {
            self.draw_type(context, type_id, objects);
        }
    }
}
