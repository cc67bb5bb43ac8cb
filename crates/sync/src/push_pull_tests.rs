use super::*;
use silo_core::{CollectionEvent, RunContext, SourceStatus};
use silo_store::Depot;
use tempfile::tempdir;

use crate::transport::LocalTransport;

fn populate(depot: &Depot, handler: &str, url: &str, content: &[u8]) -> RunId {
    let digest = depot.objects.dump_bytes("bin", content).expect("dump content");
    let event = Event::Collection(CollectionEvent {
        handler: handler.into(),
        url: url.to_string(),
        timestamp_ms: 1,
        status: SourceStatus::Processed,
        content_digest: Some(digest),
        expiry_seconds: None,
        message: None,
    });
    let context = RunContext {
        start_timestamp_ms: 1,
        ..Default::default()
    };
    let run_id = depot.commit_run(&[event], &context).expect("commit run");
    depot.integrate(run_id.clone(), 1).expect("integrate");
    run_id
}

#[tokio::test]
async fn push_copies_runs_statuses_and_objects_to_an_empty_remote() {
    let local_dir = tempdir().expect("tempdir");
    let remote_dir = tempdir().expect("tempdir");
    let local = Depot::open(local_dir.path());
    populate(&local, "news", "https://example.test/a", b"hello");

    let transport = LocalTransport::new(remote_dir.path());
    push(&local, &transport).await.expect("push");

    assert!(remote_dir.path().join("runs").read_dir().unwrap().count() >= 1);
    assert!(remote_dir.path().join("statuses").read_dir().unwrap().count() >= 1);
    assert!(remote_dir.path().join("objects").exists());
}

#[tokio::test]
async fn push_is_idempotent_and_never_overwrites() {
    let local_dir = tempdir().expect("tempdir");
    let remote_dir = tempdir().expect("tempdir");
    let local = Depot::open(local_dir.path());
    populate(&local, "news", "https://example.test/a", b"hello");

    let transport = LocalTransport::new(remote_dir.path());
    push(&local, &transport).await.expect("first push");
    push(&local, &transport).await.expect("second push");

    assert!(remote_dir.path().join("objects").exists());
}

#[tokio::test]
async fn default_pull_fetches_missing_runs_and_statuses_but_no_objects() {
    let remote_dir = tempdir().expect("tempdir");
    let remote_depot = Depot::open(remote_dir.path());
    populate(&remote_depot, "news", "https://example.test/a", b"hello");

    let local_dir = tempdir().expect("tempdir");
    let local = Depot::open(local_dir.path());
    let transport = LocalTransport::new(remote_dir.path());

    let pulled = pull(&local, &transport, PullMode::Default)
        .await
        .expect("pull");
    assert_eq!(pulled.len(), 1);
    assert!(local_dir.path().join("runs").exists());
    assert!(!local_dir.path().join("objects").exists());
}

#[tokio::test]
async fn complete_pull_fetches_runs_statuses_and_objects() {
    let remote_dir = tempdir().expect("tempdir");
    let remote_depot = Depot::open(remote_dir.path());
    populate(&remote_depot, "news", "https://example.test/a", b"hello");

    let local_dir = tempdir().expect("tempdir");
    let local = Depot::open(local_dir.path());
    let transport = LocalTransport::new(remote_dir.path());

    pull(&local, &transport, PullMode::Complete)
        .await
        .expect("pull");
    assert!(local_dir.path().join("objects").read_dir().unwrap().count() >= 1);
}

#[tokio::test]
async fn post_status_pull_fetches_only_objects_reachable_from_target() {
    let remote_dir = tempdir().expect("tempdir");
    let remote_depot = Depot::open(remote_dir.path());
    populate(&remote_depot, "news", "https://example.test/a", b"first");
    let target = remote_depot.current_status().expect("current status");
    populate(&remote_depot, "news", "https://example.test/b", b"second");

    let local_dir = tempdir().expect("tempdir");
    let local = Depot::open(local_dir.path());
    let transport = LocalTransport::new(remote_dir.path());

    let pulled = pull(&local, &transport, PullMode::PostStatus(target))
        .await
        .expect("pull");
    assert_eq!(pulled.len(), 1);

    let object_count: usize = std::fs::read_dir(local_dir.path().join("objects"))
        .map(|entries| {
            entries
                .flatten()
                .map(|prefix| std::fs::read_dir(prefix.path()).map(|e| e.count()).unwrap_or(0))
                .sum()
        })
        .unwrap_or(0);
    assert_eq!(object_count, 1);
}
