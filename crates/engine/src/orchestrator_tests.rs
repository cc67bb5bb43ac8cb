use super::*;
use parking_lot::Mutex;
use silo_adapters::{FakeHandler, FakeSession};
use silo_core::{CapabilitySet, FetchOutcome, ParsedUnit, SystemClock, TaskId};
use silo_store::ObjectStore;
use tempfile::tempdir;

use crate::distribution::SyncDriver;

fn handler_map(name: &str, capabilities: CapabilitySet, result: ParsedUnit) -> HashMap<String, Arc<dyn Handler>> {
    let mut map: HashMap<String, Arc<dyn Handler>> = HashMap::new();
    map.insert(
        name.to_string(),
        Arc::new(FakeHandler::new(name, capabilities, result)),
    );
    map
}

#[tokio::test]
async fn drain_runs_a_task_and_produces_a_collection_event() {
    let dir = tempdir().expect("tempdir");
    let objects = ObjectStore::new(dir.path());
    let capabilities = CapabilitySet::new().with("http", 1);
    let handlers = handler_map("news", capabilities.clone(), ParsedUnit::default());

    let session_factory: SessionFactory = Arc::new(|_task: &Task| {
        Arc::new(FakeSession::new("s", vec![FetchOutcome::Ok(b"hi".to_vec())])) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, objects);

    let mut queue = TaskQueue::new();
    queue.push(Task {
        id: TaskId::new(),
        handler: "news".into(),
        url: "https://example.test/a".into(),
        capabilities: capabilities.clone(),
    });
    let capacity = CapacityTracker::new(
        CapabilitySet::new().with("http", 1),
        silo_core::ResourceLimitSet::new(),
    );
    let clock = SystemClock;

    let events = orchestrator.drain(queue, capacity, &SyncDriver, &clock).await.expect("drain");
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Collection(c) => {
            assert_eq!(c.url, "https://example.test/a");
            assert_eq!(c.status, silo_core::SourceStatus::Processed);
            assert!(c.content_digest.is_some());
        }
        _ => panic!("expected a collection event"),
    }
}

#[tokio::test]
async fn drain_registers_new_urls_discovered_while_parsing() {
    let dir = tempdir().expect("tempdir");
    let objects = ObjectStore::new(dir.path());
    let capabilities = CapabilitySet::new().with("http", 1);
    let parsed = ParsedUnit {
        registrations: vec![silo_core::RegistrationEvent {
            handler: "news".into(),
            url: "https://example.test/b".into(),
            expiry_seconds: None,
            overwrite: false,
        }],
        ..Default::default()
    };
    let handlers = handler_map("news", capabilities.clone(), parsed);

    let session_factory: SessionFactory = Arc::new(|_task: &Task| {
        Arc::new(FakeSession::new("s", vec![FetchOutcome::Ok(b"hi".to_vec())])) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, objects);

    let mut queue = TaskQueue::new();
    queue.push(Task {
        id: TaskId::new(),
        handler: "news".into(),
        url: "https://example.test/a".into(),
        capabilities: capabilities.clone(),
    });
    let capacity = CapacityTracker::new(
        CapabilitySet::new().with("http", 1),
        silo_core::ResourceLimitSet::new(),
    );
    let clock = SystemClock;

    let events = orchestrator.drain(queue, capacity, &SyncDriver, &clock).await.expect("drain");
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Registration(r) if r.url == "https://example.test/b")));
}

#[tokio::test]
async fn drain_reuses_one_session_across_tasks_for_the_same_handler() {
    let dir = tempdir().expect("tempdir");
    let objects = ObjectStore::new(dir.path());
    let capabilities = CapabilitySet::new().with("http", 1);
    let handlers = handler_map("news", capabilities.clone(), ParsedUnit::default());

    let created = Arc::new(Mutex::new(0usize));
    let created_for_factory = created.clone();
    let session_factory: SessionFactory = Arc::new(move |_task: &Task| {
        *created_for_factory.lock() += 1;
        Arc::new(FakeSession::new("s", vec![FetchOutcome::Ok(b"hi".to_vec())])) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, objects);

    let mut queue = TaskQueue::new();
    for i in 0..3 {
        queue.push(Task {
            id: TaskId::new(),
            handler: "news".into(),
            url: format!("https://example.test/{i}"),
            capabilities: capabilities.clone(),
        });
    }
    let capacity = CapacityTracker::new(
        CapabilitySet::new().with("http", 1),
        silo_core::ResourceLimitSet::new(),
    );
    let clock = SystemClock;

    let events = orchestrator.drain(queue, capacity, &SyncDriver, &clock).await.expect("drain");
    assert_eq!(events.len(), 3);
    assert_eq!(*created.lock(), 1);
}

#[tokio::test]
async fn drain_runs_independent_tasks_concurrently() {
    let dir = tempdir().expect("tempdir");
    let objects = ObjectStore::new(dir.path());
    let capabilities = CapabilitySet::new().with("http", 1);
    let mut handlers: HashMap<String, Arc<dyn Handler>> = HashMap::new();
    handlers.insert(
        "a".to_string(),
        Arc::new(FakeHandler::new("a", capabilities.clone(), ParsedUnit::default())),
    );
    handlers.insert(
        "b".to_string(),
        Arc::new(FakeHandler::new("b", capabilities.clone(), ParsedUnit::default())),
    );

    let session_factory: SessionFactory = Arc::new(|task: &Task| {
        Arc::new(FakeSession::new(
            task.handler.clone(),
            vec![FetchOutcome::Ok(b"hi".to_vec())],
        )) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, objects);

    let mut queue = TaskQueue::new();
    queue.push(Task {
        id: TaskId::new(),
        handler: "a".into(),
        url: "https://example.test/a".into(),
        capabilities: capabilities.clone(),
    });
    queue.push(Task {
        id: TaskId::new(),
        handler: "b".into(),
        url: "https://example.test/b".into(),
        capabilities: capabilities.clone(),
    });
    // Two slots of capacity for two distinct single-capability tasks: both
    // can be in flight at once instead of strictly one-at-a-time.
    let capacity = CapacityTracker::new(
        CapabilitySet::new().with("http", 2),
        silo_core::ResourceLimitSet::new(),
    );
    let clock = SystemClock;

    let events = orchestrator.drain(queue, capacity, &SyncDriver, &clock).await.expect("drain");
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn drain_reports_not_enough_resources_for_an_unsatisfiable_bundle() {
    let dir = tempdir().expect("tempdir");
    let objects = ObjectStore::new(dir.path());
    let task_capabilities = CapabilitySet::new().with("browser", 1);
    let handlers = handler_map("news", task_capabilities.clone(), ParsedUnit::default());
    let session_factory: SessionFactory = Arc::new(|_task: &Task| {
        Arc::new(FakeSession::new("s", vec![FetchOutcome::Ok(b"hi".to_vec())])) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, objects);

    let mut queue = TaskQueue::new();
    queue.push(Task {
        id: TaskId::new(),
        handler: "news".into(),
        url: "https://example.test/a".into(),
        capabilities: task_capabilities,
    });
    // Capacity never has any `browser` slots, so this bundle can never be
    // served, regardless of how long we wait.
    let capacity = CapacityTracker::new(
        CapabilitySet::new().with("http", 1),
        silo_core::ResourceLimitSet::new(),
    );
    let clock = SystemClock;

    let result = orchestrator.drain(queue, capacity, &SyncDriver, &clock).await;
    assert!(matches!(result, Err(EngineError::NotEnoughResources)));
}
