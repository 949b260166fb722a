//! Integration tests for the dynamic scene
//!
//! Objects are added, moved and removed across simulated frames while the
//! scene keeps answering queries.
//!
//! Run with: cargo test --test dynamic_scene_integration_tests


use std::cell::RefCell;
use std::rc::Rc;
use space_scene::dynamic_scene::{DynamicObjectHandle, DynamicSceneConfig, DynamicSceneProvider};
use space_scene::glam::{Mat4, Vec3};
use space_scene::math::{ConvexHull, AABB};
use space_scene::scene::*;
use scene_test_utils::*;

fn box_hull(min: Vec3, max: Vec3) -> ConvexHull {
    ConvexHull::from_aabb(&AABB::new(min, max))
}

fn query(scene: &Scene, hull: &ConvexHull) -> Vec<usize> {
    let mut out = IntersectionSet::new();
    scene.view::<IntersectSceneView>().intersect(&SceneIntersectContext::default(), hull, &mut out);
    let mut handles: Vec<usize> = out.iter().map(|o| o.handle()).collect();
    handles.sort_unstable();
    handles
}

fn vehicle(scene: &Scene, handle: usize) -> SceneObject {
    SceneObject::of_type::<Vehicle>(scene.object_types(), handle, SceneObjectFlags::IS_DYNAMIC)
}

fn spawn(scene: &Scene, provider: &DynamicSceneProvider, handle: usize, centre: Vec3) -> DynamicObjectHandle {
    let bounds = unit_box(centre);
    provider.add_object(vehicle(scene, handle), Mat4::from_translation(centre), bounds, bounds)
}

fn scene_with_provider(config: DynamicSceneConfig) -> (Scene, Rc<DynamicSceneProvider>) {
    let scene = Scene::new();
    let provider = Rc::new(DynamicSceneProvider::with_config(config));
    scene.add_provider(provider.clone());
    (scene, provider)
}

// ============================================================================
// PARTITIONING
// ============================================================================

#[test]
fn test_integration_row_of_boxes() {
    let (scene, provider) = scene_with_provider(DynamicSceneConfig::default());
    provider.set_partition_size_hint(20.0);
    provider.resize_scene(&AABB::new(Vec3::splat(-100.0), Vec3::splat(100.0)));

    for i in 0..10 {
        spawn(&scene, &provider, i + 1, at_x(i as f32 * 10.0));
    }
    scene.view::<TickSceneView>().post_tick();

    let hull = box_hull(Vec3::new(0.0, -5.0, -5.0), Vec3::new(15.0, 5.0, 5.0));
    assert_eq!(query(&scene, &hull), vec![1, 2]);
    // Everything beyond the hull stays out
    let far = box_hull(Vec3::new(85.0, -5.0, -5.0), Vec3::new(200.0, 5.0, 5.0));
    assert_eq!(query(&scene, &far), vec![10]);
}

#[test]
fn test_integration_objects_outside_the_tree_stay_findable() {
    let config = DynamicSceneConfig { initial_size: 50.0, initial_depth: 2, ..Default::default() };
    let (scene, provider) = scene_with_provider(config);

    spawn(&scene, &provider, 1, Vec3::new(500.0, 0.0, 0.0));
    let huge = AABB::new(Vec3::splat(-40.0), Vec3::splat(40.0));
    provider.add_object(vehicle(&scene, 2), Mat4::IDENTITY, huge, huge);

    assert_eq!(query(&scene, &box_hull(Vec3::new(495.0, -1.0, -1.0), Vec3::new(505.0, 1.0, 1.0))), vec![1]);
    assert_eq!(query(&scene, &box_hull(Vec3::new(30.0, 30.0, 30.0), Vec3::new(35.0, 35.0, 35.0))), vec![2]);
}

#[test]
fn test_integration_resize_during_simulation() {
    let (scene, provider) = scene_with_provider(DynamicSceneConfig::default());
    let handles: Vec<DynamicObjectHandle> =
        (0..4).map(|i| spawn(&scene, &provider, i + 1, Vec3::new(i as f32 * 30.0, 0.0, 0.0))).collect();
    provider.update_object(handles[3], Mat4::IDENTITY, unit_box(Vec3::ZERO), unit_box(Vec3::ZERO)).unwrap();

    provider.resize_scene(&AABB::new(Vec3::new(-10.0, -10.0, -10.0), Vec3::new(100.0, 10.0, 10.0)));
    assert_eq!(provider.tree_depth(), 3);
    // The pending update survives the resize and is committed at post-tick
    scene.view::<TickSceneView>().post_tick();

    let around_origin = box_hull(Vec3::splat(-2.0), Vec3::splat(2.0));
    assert_eq!(query(&scene, &around_origin), vec![1, 4]);
    assert_eq!(provider.num_objects(), 4);
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Removes every vehicle that drifted past x = 50 while ticking
struct Reaper {
    provider: Rc<DynamicSceneProvider>,
    handles: RefCell<Vec<DynamicObjectHandle>>,
    reaped: RefCell<Vec<usize>>,
}

impl TickHandler for Reaper {
    fn tick(&self, _dt: f32, objects: &[SceneObject]) {
        for object in objects {
            let handle = self.handles.borrow()[object.handle() - 1];
            let past = self.provider.object_collision_bb(handle).is_some_and(|bb| bb.min.x > 50.0);
            if past && self.provider.remove_object(handle).is_ok() {
                self.reaped.borrow_mut().push(object.handle());
            }
        }
    }
}

#[test]
fn test_integration_handlers_may_remove_while_ticking() {
    let (scene, provider) = scene_with_provider(DynamicSceneConfig::default());
    let handles: Vec<DynamicObjectHandle> =
        (0..5).map(|i| spawn(&scene, &provider, i + 1, at_x(i as f32 * 20.0))).collect();
    let reaper = scene.object_operation::<TickOperation>().add_handler::<Vehicle, _>(Reaper {
        provider: provider.clone(),
        handles: RefCell::new(handles.clone()),
        reaped: RefCell::new(Vec::new()),
    });

    let tick = scene.view::<TickSceneView>();
    for _frame in 0..2 {
        tick.tick(0.1);
        for (i, &handle) in handles.iter().enumerate() {
            if let Some(bb) = provider.object_collision_bb(handle) {
                let centre = bb.centre() + Vec3::new(5.0 + i as f32, 0.0, 0.0);
                provider.update_object(handle, Mat4::from_translation(centre), unit_box(centre), unit_box(centre)).unwrap();
            }
        }
        tick.post_tick();
    }

    // Frame one reaps the vehicles at x = 60 and 80; the one from x = 40
    // only passes 50 after the last tick
    assert_eq!(*reaper.reaped.borrow(), vec![4, 5]);
    assert_eq!(provider.object_collision_bb(handles[2]), Some(unit_box(at_x(54.0))));
    assert_eq!(provider.num_objects(), 3);
    let everything = box_hull(Vec3::splat(-1000.0), Vec3::splat(1000.0));
    assert_eq!(query(&scene, &everything), vec![1, 2, 3]);
}

#[derive(Default)]
struct MotionLog {
    changed: RefCell<Vec<Vec<usize>>>,
}

impl ObjectChangeListener for MotionLog {
    fn on_objects_changed(&self, _provider: ProviderId, objects: &[SceneObject]) {
        let mut handles: Vec<usize> = objects.iter().map(SceneObject::handle).collect();
        handles.sort_unstable();
        self.changed.borrow_mut().push(handles);
    }
}

#[test]
fn test_integration_one_change_batch_per_frame() {
    let (scene, provider) = scene_with_provider(DynamicSceneConfig::default());
    let log = Rc::new(MotionLog::default());
    scene.view::<ObjectChangeSceneView>().add_listener(log.clone());
    let a = spawn(&scene, &provider, 1, Vec3::ZERO);
    let b = spawn(&scene, &provider, 2, at_x(10.0));
    spawn(&scene, &provider, 3, at_x(20.0));

    let tick = scene.view::<TickSceneView>();
    for frame in 1..=3 {
        let centre = at_x(frame as f32);
        provider.update_object(a, Mat4::from_translation(centre), unit_box(centre), unit_box(centre)).unwrap();
        provider.update_object(a, Mat4::from_translation(centre), unit_box(centre), unit_box(centre)).unwrap();
        if frame == 2 {
            provider.update_object(b, Mat4::IDENTITY, unit_box(at_x(11.0)), unit_box(at_x(11.0))).unwrap();
        }
        tick.post_tick();
    }
    // Idle frame
    tick.post_tick();

    assert_eq!(*log.changed.borrow(), vec![vec![1], vec![1, 2], vec![1]]);
}
