use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec3};
use crate::math::{AABB, CollisionMode, CollisionState, SweepParams, WorldTriangle};
use crate::scene::{
    CollisionHandler, CollisionOperation, DrawContext, DrawHandler, DrawOperation,
    IntersectionSet, SceneObject, SceneObjectFlags, SpatialQueryHandler,
    SpatialQueryOperation, TickHandler, TickOperation,
};
use crate::type_system::{RuntimeTypeId, TypeIdContext};

struct Model;
struct Flare;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Records each tick batch as (handler label, handles)
#[derive(Clone)]
struct RecordingTick {
    label: &'static str,
    calls: Rc<RefCell<Vec<(&'static str, Vec<usize>)>>>,
}

impl TickHandler for RecordingTick {
    fn tick(&self, _dt: f32, objects: &[SceneObject]) {
        self.calls
            .borrow_mut()
            .push((self.label, objects.iter().map(|o| o.handle()).collect()));
    }

    fn update_animations(&self, _dt: f32, objects: &[SceneObject]) {
        self.calls
            .borrow_mut()
            .push(("anim", objects.iter().map(|o| o.handle()).collect()));
    }
}

fn context() -> Rc<TypeIdContext> {
    Rc::new(TypeIdContext::new("objects"))
}

fn object(ctx: &TypeIdContext, handle: usize, is_model: bool) -> SceneObject {
    if is_model {
        SceneObject::of_type::<Model>(ctx, handle, SceneObjectFlags::empty())
    } else {
        SceneObject::of_type::<Flare>(ctx, handle, SceneObjectFlags::empty())
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_add_handler_registers_under_object_type() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls });

    assert!(op.has_handler(ctx.type_id_of::<Model>()));
    assert!(!op.has_handler(ctx.type_id_of::<Flare>()));
    assert_eq!(op.num_handlers(), 1);
}

#[test]
fn test_add_handler_twice_replaces() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    let first = op.add_handler::<Model, _>(RecordingTick { label: "first", calls: calls.clone() });
    op.add_handler::<Model, _>(RecordingTick { label: "second", calls: calls.clone() });

    // Only the caller still holds the first handler
    assert_eq!(Rc::strong_count(&first), 1);
    op.tick_type(0.1, ctx.type_id_of::<Model>(), &[object(&ctx, 1, true)]);
    assert_eq!(calls.borrow()[0].0, "second");
    assert_eq!(op.num_handlers(), 1);
}

#[test]
fn test_remove_handler() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    op.add_handler::<Model, _>(RecordingTick { label: "m", calls: Rc::default() });
    assert!(op.remove_handler(ctx.type_id_of::<Model>()).is_some());
    assert!(op.remove_handler(ctx.type_id_of::<Model>()).is_none());
    assert!(op.handler(ctx.type_id_of::<Model>()).is_none());
}

#[test]
fn test_unknown_type_is_not_registered() {
    let op = TickOperation::new(context());
    let handler: Rc<dyn TickHandler> = Rc::new(RecordingTick { label: "x", calls: Rc::default() });
    op.set_handler(RuntimeTypeId::UNKNOWN, handler);
    assert_eq!(op.num_handlers(), 0);
}

#[test]
fn test_operations_are_independent() {
    let ctx = context();
    let tick = TickOperation::new(Rc::clone(&ctx));
    let draw = DrawOperation::new(Rc::clone(&ctx));
    tick.add_handler::<Model, _>(RecordingTick { label: "m", calls: Rc::default() });
    assert!(tick.has_handler(ctx.type_id_of::<Model>()));
    assert!(!draw.has_handler(ctx.type_id_of::<Model>()));
}

// ============================================================================
// Batch dispatch
// ============================================================================

#[test]
fn test_same_type_batch_is_one_call() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls: calls.clone() });

    let batch: Vec<SceneObject> = (1..=5).map(|h| object(&ctx, h, true)).collect();
    op.tick(0.016, &batch);

    assert_eq!(*calls.borrow(), vec![("model", vec![1, 2, 3, 4, 5])]);
}

#[test]
fn test_mixed_batch_is_one_call_per_type() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls: calls.clone() });
    op.add_handler::<Flare, _>(RecordingTick { label: "flare", calls: calls.clone() });

    let batch = vec![
        object(&ctx, 1, true),
        object(&ctx, 2, false),
        object(&ctx, 3, true),
        object(&ctx, 4, false),
    ];
    op.tick(0.016, &batch);

    let calls = calls.borrow();
    assert_eq!(calls.len(), 2);
    let mut model = calls.iter().find(|c| c.0 == "model").unwrap().1.clone();
    model.sort();
    assert_eq!(model, vec![1, 3]);
    let mut flare = calls.iter().find(|c| c.0 == "flare").unwrap().1.clone();
    flare.sort();
    assert_eq!(flare, vec![2, 4]);
}

#[test]
fn test_types_without_handler_are_skipped() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls: calls.clone() });

    op.tick(0.016, &[object(&ctx, 1, false), object(&ctx, 2, true)]);
    assert_eq!(*calls.borrow(), vec![("model", vec![2])]);
}

#[test]
fn test_update_animations_dispatch() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls: calls.clone() });

    op.update_animations(0.016, &[object(&ctx, 8, true)]);
    assert_eq!(*calls.borrow(), vec![("anim", vec![8])]);
}

#[test]
fn test_empty_batch_calls_nothing() {
    let ctx = context();
    let op = TickOperation::new(Rc::clone(&ctx));
    let calls = Rc::new(RefCell::new(Vec::new()));
    op.add_handler::<Model, _>(RecordingTick { label: "model", calls: calls.clone() });
    op.tick(0.016, &[]);
    assert!(calls.borrow().is_empty());
}

// ============================================================================
// Draw
// ============================================================================

struct CountingDraw;

impl DrawHandler for CountingDraw {
    fn draw(&self, context: &mut DrawContext, objects: &[SceneObject]) {
        context.draw_calls += objects.len() as u32;
    }
}

#[test]
fn test_draw_set_calls_each_bucket() {
    let ctx = context();
    let op = DrawOperation::new(Rc::clone(&ctx));
    op.add_handler::<Model, _>(CountingDraw);

    let mut set = IntersectionSet::new();
    set.extend([object(&ctx, 1, true), object(&ctx, 2, true), object(&ctx, 3, false)]);

    let mut draw = DrawContext::new(Mat4::IDENTITY, Vec3::ZERO);
    op.draw_set(&mut draw, &set);
    assert_eq!(draw.draw_calls, 2);
}

// ============================================================================
// Collision
// ============================================================================

struct HitAt(f32);

impl CollisionHandler for HitAt {
    fn collide_ray(
        &self,
        object: &SceneObject,
        _source: Vec3,
        _extent: Vec3,
        _sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        state.record_hit(*object, self.0)
    }

    fn collide_prism(
        &self,
        object: &SceneObject,
        _source: &WorldTriangle,
        _extent: Vec3,
        _sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool {
        state.record_hit(*object, self.0 * 2.0)
    }
}

#[test]
fn test_collision_dispatch_and_missing_handler() {
    let ctx = context();
    let op = CollisionOperation::new(Rc::clone(&ctx));
    op.add_handler::<Model, _>(HitAt(4.0));

    let sweep = SweepParams::ray(Vec3::ZERO, Vec3::X * 10.0);
    let mut state = CollisionState::new(CollisionMode::StopOnFirst);

    assert!(!op.collide_ray(&object(&ctx, 1, false), Vec3::ZERO, Vec3::X * 10.0, &sweep, &mut state));
    assert!(!state.has_hit());

    assert!(op.collide_ray(&object(&ctx, 2, true), Vec3::ZERO, Vec3::X * 10.0, &sweep, &mut state));
    assert_eq!(state.nearest_distance(), 4.0);

    let tri = WorldTriangle::new(Vec3::ZERO, Vec3::Y, Vec3::Z);
    let prism = SweepParams::prism(&tri, Vec3::X);
    let mut state = CollisionState::new(CollisionMode::Nearest);
    assert!(!op.collide_prism(&object(&ctx, 2, true), &tri, Vec3::X, &prism, &mut state));
    assert_eq!(state.nearest_distance(), 8.0);
}

// ============================================================================
// Spatial query
// ============================================================================

/// Handle h sits in a unit box at (h, 0, 0)
struct GridPlacement;

impl SpatialQueryHandler for GridPlacement {
    fn world_transform(&self, object: &SceneObject) -> Mat4 {
        Mat4::from_translation(Vec3::new(object.handle() as f32, 0.0, 0.0))
    }

    fn world_visibility_bounding_box(&self, object: &SceneObject) -> AABB {
        AABB::from_centre_extent(Vec3::new(object.handle() as f32, 0.0, 0.0), Vec3::splat(0.5))
    }
}

#[test]
fn test_spatial_query_accumulates_per_type() {
    let ctx = context();
    let op = SpatialQueryOperation::new(Rc::clone(&ctx));
    op.add_handler::<Model, _>(GridPlacement);

    let mut set = IntersectionSet::new();
    set.extend([object(&ctx, 2, true), object(&ctx, 6, true), object(&ctx, 50, false)]);

    let bounds = op.accumulate_world_visibility_bounding_boxes(&set);
    assert_eq!(bounds.min, Vec3::new(1.5, -0.5, -0.5));
    assert_eq!(bounds.max, Vec3::new(6.5, 0.5, 0.5));

    assert_eq!(
        op.world_transform(&object(&ctx, 3, true)),
        Some(Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)))
    );
    assert!(op.world_visibility_bounding_box(&object(&ctx, 3, false)).is_none());
}

#[test]
fn test_spatial_query_on_empty_set_is_inside_out() {
    let op = SpatialQueryOperation::new(context());
    assert!(op.accumulate_world_visibility_bounding_boxes(&IntersectionSet::new()).is_inside_out());
}
