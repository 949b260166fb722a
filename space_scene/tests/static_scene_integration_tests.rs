//! Integration tests for baked static scenes
//!
//! These tests bake a container to bytes, load it back through the binary
//! reader and check what the scene sees.
//!
//! Run with: cargo test --test static_scene_integration_tests


use std::sync::{Arc, Mutex};
use serial_test::serial;
use space_scene::binary::{BinaryFormat, StringTable};
use space_scene::compiled_space::{StaticSceneProvider, TypeHeader};
use space_scene::glam::Vec3;
use space_scene::math::{ConvexHull, AABB};
use space_scene::scene::*;
use space_scene::space::log::{LogEntry, LogSeverity, Logger};
use space_scene::space::{Engine, Error};
use scene_test_utils::*;

const UNKNOWN_TYPE: u32 = 99;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Captures warnings emitted by the static provider only
struct StaticSceneLogger {
    warnings: Arc<Mutex<Vec<String>>>,
}

impl StaticSceneLogger {
    fn install() -> Arc<Mutex<Vec<String>>> {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(Self { warnings: warnings.clone() });
        warnings
    }
}

impl Logger for StaticSceneLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity == LogSeverity::Warn && entry.source == "space::StaticSceneProvider" {
            self.warnings.lock().unwrap().push(entry.message.clone());
        }
    }
}

fn everything() -> ConvexHull {
    ConvexHull::from_aabb(&AABB::new(Vec3::splat(-1000.0), Vec3::splat(1000.0)))
}

fn visible(scene: &Scene) -> Vec<usize> {
    let mut out = IntersectionSet::new();
    scene.view::<IntersectSceneView>().intersect(&SceneIntersectContext::default(), &everything(), &mut out);
    let mut handles: Vec<usize> = out.iter().map(|o| o.handle()).collect();
    handles.sort_unstable();
    handles
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_integration_load_from_bytes() {
    let scene = Scene::new();
    let provider = load_world(&scene, baked_world(&[]));

    assert!(provider.is_valid());
    assert_eq!(provider.num_objects(), 5);
    assert_eq!(
        provider.type_headers(),
        vec![TypeHeader { type_id: MODEL_TYPE, num_objects: 3 }, TypeHeader { type_id: FLARE_TYPE, num_objects: 2 }]
    );
    assert_eq!(provider.bounds(), AABB::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(50.5, 0.5, 0.5)));
    assert_eq!(provider.object(3).map(|o| o.handle()), Some(FIRST_FLARE_HANDLE));

    assert!(provider.bind(&scene));
    assert_eq!(visible(&scene), vec![100, 101, 102, 200, 201]);
}

#[test]
#[serial]
fn test_integration_unknown_type_is_skipped_once() {
    let warnings = StaticSceneLogger::install();

    let scene = Scene::new();
    let extra = [(UNKNOWN_TYPE, Vec3::new(5.0, 0.0, 0.0)), (UNKNOWN_TYPE, Vec3::new(15.0, 0.0, 0.0))];
    let provider = load_world(&scene, baked_world(&extra));
    provider.bind(&scene);

    {
        let warnings = warnings.lock().unwrap();
        let skipped: Vec<&String> = warnings.iter().filter(|m| m.contains("unknown object type id")).collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("99"));
        assert!(skipped[0].contains("skipping 2 objects"));
    }

    // The unknown sub-range stays invalid and never reaches a query
    assert_eq!(provider.num_objects(), 7);
    assert!(provider.object(5).is_some_and(|o| !o.is_valid()));
    assert_eq!(visible(&scene), vec![100, 101, 102, 200, 201]);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_failed_type_load_is_reported() {
    let warnings = StaticSceneLogger::install();

    // Without the name table entries the loaders refuse their objects
    let scene = Scene::new();
    let bytes = baked_world(&[]);
    let format = BinaryFormat::from_bytes(bytes).unwrap();
    let mut provider = StaticSceneProvider::new();
    provider.add_type_handler(NumberingLoader::boxed(MODEL_TYPE, scene.object_type_id::<Model>(), 100, "models/crate"));
    provider.load(&format, &StringTable::new()).unwrap();

    assert!(provider.is_valid());
    assert!(provider.object(0).is_some_and(|o| !o.is_valid()));
    let failed = warnings.lock().unwrap().iter().filter(|m| m.contains("failed to load")).count();
    assert_eq!(failed, 1);

    Engine::reset_logger();
}

#[test]
fn test_integration_truncated_container_is_rejected() {
    let mut bytes = baked_world(&[]);
    bytes.truncate(bytes.len() - 8);

    match BinaryFormat::from_bytes(bytes) {
        Err(Error::MalformedData(_)) => {}
        other => panic!("expected malformed data, got {:?}", other.map(|f| f.num_sections())),
    }
}

#[test]
fn test_integration_container_without_scene_section() {
    let bytes = space_scene::binary::BinaryFormatWriter::new().finish();
    let format = BinaryFormat::from_bytes(bytes).unwrap();

    let mut provider = StaticSceneProvider::new();
    let result = provider.load(&format, &StringTable::new());
    assert!(matches!(result, Err(Error::SectionNotFound { .. })));
    assert!(!provider.is_valid());
    assert_eq!(provider.num_objects(), 0);
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[derive(Default)]
struct AreaTracker {
    areas: std::cell::RefCell<Vec<(bool, AABB)>>,
}

impl SceneChangeListener for AreaTracker {
    fn on_area_loaded(&self, bounds: &AABB) {
        self.areas.borrow_mut().push((true, *bounds));
    }

    fn on_area_unloaded(&self, bounds: &AABB) {
        self.areas.borrow_mut().push((false, *bounds));
    }
}

#[test]
fn test_integration_area_notifications() {
    let scene = Scene::new();
    let tracker = std::rc::Rc::new(AreaTracker::default());
    scene.view::<ChangeSceneView>().add_listener(tracker.clone());

    let provider = load_world(&scene, baked_world(&[]));
    let bounds = provider.bounds();
    provider.bind(&scene);
    provider.unload(&scene);

    assert_eq!(*tracker.areas.borrow(), vec![(true, bounds), (false, bounds)]);
    assert!(visible(&scene).is_empty());
    assert_eq!(scene.num_providers(), 0);
}

#[test]
fn test_integration_reload_after_unload() {
    let scene = Scene::new();
    let provider = load_world(&scene, baked_world(&[]));
    provider.bind(&scene);
    provider.unload(&scene);

    let provider = load_world(&scene, baked_world(&[(MODEL_TYPE, Vec3::new(30.0, 0.0, 0.0))]));
    provider.bind(&scene);
    assert_eq!(visible(&scene), vec![100, 101, 102, 103, 200, 201]);
}
