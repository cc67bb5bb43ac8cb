use super::*;
use silo_core::TaskId;

fn task(handler: &str, url: &str, capabilities: CapabilitySet) -> Task {
    Task {
        id: TaskId::new(),
        handler: handler.into(),
        url: url.into(),
        capabilities,
    }
}

#[test]
fn pop_matching_respects_fifo_within_a_bundle() {
    let mut queue = TaskQueue::new();
    let bundle = CapabilitySet::new().with("http", 1);
    queue.push(task("news", "a", bundle.clone()));
    queue.push(task("news", "b", bundle.clone()));

    let available = CapabilitySet::new().with("http", 5);
    let first = queue.pop_matching(&available).expect("a task");
    assert_eq!(first.url, "a");
    let second = queue.pop_matching(&available).expect("a task");
    assert_eq!(second.url, "b");
}

#[test]
fn pop_matching_skips_bundles_the_worker_cannot_satisfy() {
    let mut queue = TaskQueue::new();
    queue.push(task("news", "a", CapabilitySet::new().with("browser", 1)));

    let available = CapabilitySet::new().with("http", 1);
    assert!(queue.pop_matching(&available).is_none());
    assert_eq!(queue.len(), 1);
}

#[test]
fn capacity_tracker_reserves_and_releases() {
    let total = CapabilitySet::new().with("http", 2);
    let mut tracker = CapacityTracker::new(total, ResourceLimitSet::new());
    let bundle = CapabilitySet::new().with("http", 1);

    tracker.reserve(&bundle);
    assert_eq!(tracker.available().count(&Capability::from("http")), 1);

    tracker.release(&bundle);
    assert_eq!(tracker.available().count(&Capability::from("http")), 2);
}

#[test]
fn capacity_tracker_honors_resource_limits_below_raw_capacity() {
    let total = CapabilitySet::new().with("browser", 4);
    let limits = ResourceLimitSet::new().with_limit("browser", 1);
    let tracker = CapacityTracker::new(total, limits);
    assert_eq!(tracker.available().count(&Capability::from("browser")), 1);
}

#[test]
fn failure_tracker_allows_retries_up_to_the_limit_then_stops() {
    let mut tracker = FailureTracker::new();
    for _ in 0..ALLOWED_FAILS - 1 {
        assert!(tracker.record_failure("news", "a"));
    }
    assert!(!tracker.record_failure("news", "a"));
}

#[test]
fn failure_tracker_clear_resets_the_count() {
    let mut tracker = FailureTracker::new();
    tracker.record_failure("news", "a");
    tracker.clear("news", "a");
    assert_eq!(tracker.failures("news", "a"), 0);
}
