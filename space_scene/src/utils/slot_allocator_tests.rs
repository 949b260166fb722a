use super::*;

// ============================================================================
// Allocation
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut ids = SlotAllocator::new();
    assert_eq!(ids.alloc(), 0);
    assert_eq!(ids.alloc(), 1);
    assert_eq!(ids.alloc(), 2);
    assert_eq!(ids.len(), 3);
    assert!(ids.is_allocated(1));
}

#[test]
fn test_new_is_empty() {
    let ids = SlotAllocator::default();
    assert!(ids.is_empty());
    assert_eq!(ids.high_water_mark(), 0);
    assert!(!ids.is_allocated(0));
}

// ============================================================================
// Free and recycle
// ============================================================================

#[test]
fn test_free_recycles_lifo() {
    let mut ids = SlotAllocator::new();
    let a = ids.alloc(); // 0
    let _b = ids.alloc(); // 1
    let c = ids.alloc(); // 2
    assert!(ids.free(a));
    assert!(ids.free(c));

    assert_eq!(ids.alloc(), 2);
    assert_eq!(ids.alloc(), 0);
    assert_eq!(ids.alloc(), 3);
    assert_eq!(ids.high_water_mark(), 4);
}

#[test]
fn test_double_free_is_rejected() {
    let mut ids = SlotAllocator::new();
    let a = ids.alloc();
    assert!(ids.free(a));
    assert!(!ids.free(a));
    assert_eq!(ids.len(), 0);

    // The id is handed out once, not twice
    assert_eq!(ids.alloc(), a);
    assert_eq!(ids.alloc(), 1);
}

#[test]
fn test_free_unknown_id_is_rejected() {
    let mut ids = SlotAllocator::new();
    assert!(!ids.free(7));
    assert!(ids.is_empty());
}

#[test]
fn test_live_ids_stay_unique() {
    let mut ids = SlotAllocator::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..50 {
        seen.insert(ids.alloc());
    }
    for id in 0..10 {
        ids.free(id);
        seen.remove(&id);
    }
    for _ in 0..10 {
        let id = ids.alloc();
        assert!(seen.insert(id), "duplicate id: {}", id);
    }
    assert_eq!(seen.len(), 50);
    assert_eq!(ids.high_water_mark(), 50);
}
