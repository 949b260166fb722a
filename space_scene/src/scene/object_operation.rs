/// ObjectOperation - per-type handler table for one capability.
///
/// An operation maps an object `RuntimeTypeId` to at most one handler. A
/// type opts into each capability (tick, draw, collide, spatial query)
/// separately by registering with that operation. Lookup is a dense
/// vector index, done once per same-typed batch.
///
/// Handlers are shared (`Rc`) so a lookup can release the table before the
/// handler runs; a handler may therefore register other handlers while it
/// is being dispatched.

use std::cell::RefCell;
use std::rc::Rc;
use rdst::RadixSort;
use crate::type_system::{RuntimeTypeId, TypeIdContext};
use super::{Scene, SceneObject};

/// Converts a concrete handler into the operation's trait object.
///
/// Each operation provides one blanket impl (e.g. every `T: TickHandler`
/// converts into `Rc<dyn TickHandler>`).
pub trait IntoHandler<H: ?Sized> {
    fn into_handler(self: Rc<Self>) -> Rc<H>;
}

/// Operations the `Scene` can create on first request.
pub trait ObjectOperationType: 'static + Sized {
    fn create(scene: &Scene) -> Self;
}

pub struct ObjectOperation<H: ?Sized> {
    object_types: Rc<TypeIdContext>,
    handlers: RefCell<Vec<Option<Rc<H>>>>,
}

impl<H: ?Sized + 'static> ObjectOperation<H> {
    pub fn new(object_types: Rc<TypeIdContext>) -> Self {
        Self { object_types, handlers: RefCell::new(Vec::new()) }
    }

    /// Register `handler` for object type `T`, replacing (and dropping our
    /// reference to) any previous handler. Returns the handler so callers
    /// can keep configuring it.
    pub fn add_handler<T: 'static, I: IntoHandler<H>>(&self, handler: I) -> Rc<I> {
        let handler = Rc::new(handler);
        let type_id = self.object_types.type_id_of::<T>();
        self.set_handler(type_id, Rc::clone(&handler).into_handler());
        handler
    }

    /// Register a handler under an explicit object type id.
    pub fn set_handler(&self, type_id: RuntimeTypeId, handler: Rc<H>) {
        if !type_id.is_valid() {
            crate::engine_error!("space::ObjectOperation",
                "cannot register a handler for the unknown type");
            return;
        }

        let mut handlers = self.handlers.borrow_mut();
        let index = type_id.index();
        if index >= handlers.len() {
            handlers.resize_with(index + 1, || None);
        }
        handlers[index] = Some(handler);
    }

    pub fn remove_handler(&self, type_id: RuntimeTypeId) -> Option<Rc<H>> {
        self.handlers
            .borrow_mut()
            .get_mut(type_id.index())
            .and_then(Option::take)
    }

    pub fn handler(&self, type_id: RuntimeTypeId) -> Option<Rc<H>> {
        self.handlers
            .borrow()
            .get(type_id.index())
            .and_then(|slot| slot.clone())
    }

    pub fn has_handler(&self, type_id: RuntimeTypeId) -> bool {
        matches!(self.handlers.borrow().get(type_id.index()), Some(Some(_)))
    }

    pub fn num_handlers(&self) -> usize {
        self.handlers.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    pub fn object_types(&self) -> &Rc<TypeIdContext> {
        &self.object_types
    }
}

impl<H: ?Sized + 'static> ObjectOperationType for ObjectOperation<H> {
    fn create(scene: &Scene) -> Self {
        Self::new(Rc::clone(scene.object_types()))
    }
}

/// Call `f` once per run of same-typed objects.
///
/// Batches that are already grouped by type are walked in place; mixed
/// batches are copied and radix-sorted on the type byte first.
pub(crate) fn for_each_type_run<F>(objects: &[SceneObject], mut f: F)
where
    F: FnMut(RuntimeTypeId, &[SceneObject]),
{
    if objects.is_empty() {
        return;
    }

    let grouped = objects.windows(2).all(|pair| pair[0].type_id() <= pair[1].type_id());
    if grouped {
        for run in objects.chunk_by(|a, b| a.type_id() == b.type_id()) {
            f(run[0].type_id(), run);
        }
        return;
    }

    let mut sorted = objects.to_vec();
    sorted.radix_sort_unstable();
    for run in sorted.chunk_by(|a, b| a.type_id() == b.type_id()) {
        f(run[0].type_id(), run);
    }
}

#[cfg(test)]
#[path = "object_operation_tests.rs"]
mod tests;
