//! Contract tests shared by every resource

#![allow(unsafe_code)]

mod common;

use std::sync::Arc;

use proptest::prelude::*;
use rstest::rstest;
use strata_memory::prelude::*;
use strata_memory::resource::scoped_default_resource;

use common::{TrackingResource, registry_lock, use_tracking_default};

#[test]
fn null_resource_always_fails() {
    let null = null_resource();
    let error = null.allocate(1, 1).unwrap_err();
    assert!(error.is_out_of_memory());
    assert_eq!(error.code(), "MEM:ALLOC:FAILED");

    assert!(resources_equal(&*null, &*null_resource()));
    assert!(!resources_equal(&*null, &*system_resource()));
}

#[test]
fn system_resource_round_trip() {
    let system = system_resource();
    let ptr = system.allocate(100, 8).unwrap().unwrap();
    // SAFETY: 100 bytes freshly allocated.
    unsafe {
        ptr.as_ptr().write_bytes(0x11, 100);
        system.deallocate(ptr, 100, 8);
    }
    assert!(resources_equal(&*system, &SystemResource));
}

#[test]
fn replace_default_resource() {
    let fixture = use_tracking_default();
    let current = get_default_resource();
    assert!(resources_equal(&*current, &*fixture.tracked));

    let ptr = current.allocate(32, 8).unwrap().unwrap();
    // SAFETY: allocated above with the same arguments.
    unsafe { current.deallocate(ptr, 32, 8) };
    assert_eq!(fixture.tracked.allocations(), vec![32]);
    assert!(fixture.tracked.all_memory_deallocated());
}

#[test]
fn set_default_returns_previous_and_none_restores_system() {
    let _lock = registry_lock();
    let tracked: SharedResource = TrackingResource::shared();

    let before = set_default_resource(Some(Arc::clone(&tracked)));
    assert!(resources_equal(&*before, &SystemResource));

    let previous = set_default_resource(None);
    assert!(Arc::ptr_eq(&previous, &tracked));
    assert!(resources_equal(&*get_default_resource(), &SystemResource));
}

#[test]
fn strategies_capture_default_at_construction() {
    let fixture = use_tracking_default();
    let arena = ArenaAllocator::new();
    let pool = PoolAllocator::new();
    let shared_pool = ThreadSafePoolAllocator::new();

    assert!(resources_equal(&**arena.upstream_resource(), &*fixture.tracked));
    assert!(resources_equal(&**pool.upstream_resource(), &*fixture.tracked));
    assert!(resources_equal(&*shared_pool.upstream_resource(), &*fixture.tracked));

    // Swapping the default afterwards does not affect existing strategies.
    let _system = scoped_default_resource(system_resource());
    arena.allocate(8, 8).unwrap();
    pool.allocate(8, 8).unwrap();
    shared_pool.allocate(8, 8).unwrap();
    assert_eq!(fixture.tracked.allocations().len(), 3);
}

fn resource_under_test(kind: &str) -> Box<dyn MemoryResource> {
    let upstream = system_resource();
    match kind {
        "system" => Box::new(SystemResource),
        "null" => Box::new(NullResource),
        "arena" => Box::new(ArenaAllocator::with_upstream(upstream)),
        "pool" => Box::new(PoolAllocator::with_upstream(upstream)),
        "thread_safe_pool" => Box::new(ThreadSafePoolAllocator::with_upstream(upstream)),
        other => unreachable!("unknown resource kind {other}"),
    }
}

#[rstest]
fn zero_bytes_is_none_without_upstream_calls(
    #[values("system", "null", "arena", "pool", "thread_safe_pool")] kind: &str,
    #[values(1, 2, 4, 8, 16)] align: usize,
) {
    let tracked = TrackingResource::shared();
    let strategies: Vec<Box<dyn MemoryResource + '_>> = vec![
        Box::new(ArenaAllocator::with_upstream(&*tracked)),
        Box::new(PoolAllocator::with_upstream(&*tracked)),
        Box::new(ThreadSafePoolAllocator::with_upstream(Arc::clone(&tracked))),
    ];
    for strategy in &strategies {
        assert_eq!(strategy.allocate(0, align).unwrap(), None);
    }
    assert!(tracked.allocations().is_empty());

    let resource = resource_under_test(kind);
    assert_eq!(resource.allocate(0, align).unwrap(), None);
}

#[rstest]
#[case::system("system")]
#[case::arena("arena")]
#[case::pool("pool")]
#[case::thread_safe_pool("thread_safe_pool")]
fn every_resource_equals_itself(#[case] kind: &str) {
    let a = resource_under_test(kind);
    assert!(resources_equal(&*a, &*a));
    assert!(a.is_equal(&*a));
}

#[rstest]
#[case::arena("arena")]
#[case::pool("pool")]
#[case::thread_safe_pool("thread_safe_pool")]
fn independent_strategies_differ(#[case] kind: &str) {
    let a = resource_under_test(kind);
    let b = resource_under_test(kind);
    assert!(!resources_equal(&*a, &*b));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn allocations_honour_alignment(
        kind in prop::sample::select(vec!["system", "arena", "pool", "thread_safe_pool"]),
        requests in prop::collection::vec((1usize..2048, 0u32..5), 1..64),
    ) {
        let resource = resource_under_test(kind);
        let mut live = Vec::with_capacity(requests.len());
        for (bytes, align_shift) in requests {
            let align = 1usize << align_shift;
            let ptr = resource.allocate(bytes, align).unwrap().unwrap();
            prop_assert_eq!(ptr.as_ptr() as usize % align, 0);
            // SAFETY: `bytes` freshly allocated bytes.
            unsafe { ptr.as_ptr().write_bytes(0xC3, bytes) };
            live.push((ptr, bytes, align));
        }
        for (ptr, bytes, align) in live {
            // SAFETY: allocated above with the same arguments.
            unsafe { resource.deallocate(ptr, bytes, align) };
        }
    }
}
