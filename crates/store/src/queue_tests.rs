use super::*;
use silo_core::CollectionEvent;
use tempfile::tempdir;

#[test]
fn add_url_is_idempotent() {
    let mut queue = Queue::new();
    assert!(queue.add_url("news", "https://example.test/a", None));
    assert!(!queue.add_url("news", "https://example.test/a", None));
    assert_eq!(queue.len(), 1);
}

#[test]
fn add_url_overwrite_resets_an_existing_row_to_todo() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.next_batch("news", 1, true);
    let row = queue.get("news", "https://example.test/a").expect("row exists");
    assert_eq!(row.status, SourceStatus::Processing);

    assert!(!queue.add_url_overwrite("news", "https://example.test/a", None, true));
    let row = queue.get("news", "https://example.test/a").expect("row exists");
    assert_eq!(row.status, SourceStatus::Todo);
}

#[test]
fn add_url_without_overwrite_leaves_an_existing_row_untouched() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.next_batch("news", 1, true);

    assert!(!queue.add_url_overwrite("news", "https://example.test/a", None, false));
    let row = queue.get("news", "https://example.test/a").expect("row exists");
    assert_eq!(row.status, SourceStatus::Processing);
}

#[test]
fn next_batch_marks_rows_processing() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.add_url("news", "https://example.test/b", None);

    let batch = queue.next_batch("news", 1, true);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].status, SourceStatus::Processing);
    assert_eq!(queue.next_batch("news", 10, true).len(), 1);
}

#[test]
fn reset_processing_reverts_inflight_rows() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.next_batch("news", 1, true);
    queue.reset_processing();
    let row = queue.get("news", "https://example.test/a").expect("row exists");
    assert_eq!(row.status, SourceStatus::Todo);
}

#[test]
fn next_batch_includes_session_broken_rows() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let event = Event::Collection(CollectionEvent {
        handler: "news".into(),
        url: "https://example.test/a".into(),
        timestamp_ms: 1,
        status: SourceStatus::SessionBroken,
        content_digest: None,
        expiry_seconds: None,
        message: None,
    });
    queue.integrate_events(&[event], 1000).expect("integrate");

    let batch = queue.next_batch("news", 10, true);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].url, "https://example.test/a");
}

#[test]
fn next_batch_can_peek_without_promoting_to_processing() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let batch = queue.next_batch("news", 10, false);
    assert_eq!(batch.len(), 1);
    let row = queue.get("news", "https://example.test/a").expect("row exists");
    assert_eq!(row.status, SourceStatus::Todo);
}

#[test]
fn reset_requeues_matching_error_statuses() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.add_url("news", "https://example.test/b", None);
    let events = vec![
        Event::Collection(CollectionEvent {
            handler: "news".into(),
            url: "https://example.test/a".into(),
            timestamp_ms: 1,
            status: SourceStatus::ConnectionError,
            content_digest: None,
            expiry_seconds: None,
            message: None,
        }),
        Event::Collection(CollectionEvent {
            handler: "news".into(),
            url: "https://example.test/b".into(),
            timestamp_ms: 1,
            status: SourceStatus::ParsingError,
            content_digest: None,
            expiry_seconds: None,
            message: None,
        }),
    ];
    queue.integrate_events(&events, 1000).expect("integrate");
    queue.reset(&[SourceStatus::ConnectionError, SourceStatus::ParsingError]);
    assert_eq!(
        queue.get("news", "https://example.test/a").expect("row a").status,
        SourceStatus::Todo
    );
    assert_eq!(
        queue.get("news", "https://example.test/b").expect("row b").status,
        SourceStatus::Todo
    );
}

#[test]
fn successful_non_persistent_collection_deletes_the_row() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let event = Event::Collection(CollectionEvent {
        handler: "news".into(),
        url: "https://example.test/a".into(),
        timestamp_ms: 1,
        status: SourceStatus::Processed,
        content_digest: Some("d".into()),
        expiry_seconds: None,
        message: None,
    });
    queue.integrate_events(&[event], 1000).expect("integrate");
    assert!(queue.get("news", "https://example.test/a").is_none());
}

#[test]
fn persistent_success_keeps_the_row_with_updated_status() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let event = Event::Collection(CollectionEvent {
        handler: "news".into(),
        url: "https://example.test/a".into(),
        timestamp_ms: 1,
        status: SourceStatus::PersistentProcessed,
        content_digest: Some("d".into()),
        expiry_seconds: Some(60),
        message: None,
    });
    queue.integrate_events(&[event], 1000).expect("integrate");
    let row = queue.get("news", "https://example.test/a").expect("row kept");
    assert_eq!(row.status, SourceStatus::PersistentProcessed);
    assert_eq!(row.processed_at_ms, Some(1000));
}

#[test]
fn reset_expired_requeues_rows_past_their_ttl() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let event = Event::Collection(CollectionEvent {
        handler: "news".into(),
        url: "https://example.test/a".into(),
        timestamp_ms: 1,
        status: SourceStatus::PersistentProcessed,
        content_digest: Some("d".into()),
        expiry_seconds: Some(10),
        message: None,
    });
    queue.integrate_events(&[event], 1_000).expect("integrate");
    queue.reset_expired(1_000 + 10_000 + 1);
    let row = queue.get("news", "https://example.test/a").expect("row kept");
    assert_eq!(row.status, SourceStatus::Todo);
}

#[test]
fn error_events_keep_the_row_and_bump_fail_count() {
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    let event = Event::Collection(CollectionEvent {
        handler: "news".into(),
        url: "https://example.test/a".into(),
        timestamp_ms: 1,
        status: SourceStatus::ConnectionError,
        content_digest: None,
        expiry_seconds: None,
        message: Some("reset".into()),
    });
    queue.integrate_events(&[event], 1000).expect("integrate");
    let row = queue.get("news", "https://example.test/a").expect("row kept");
    assert_eq!(row.status, SourceStatus::ConnectionError);
    assert_eq!(row.fail_count, 1);
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("queue.sqlite.zip");
    let mut queue = Queue::new();
    queue.add_url("news", "https://example.test/a", None);
    queue.save(&path).expect("save");

    let loaded = Queue::load(&path).expect("load");
    assert_eq!(loaded.len(), 1);
}

#[test]
fn loading_a_missing_snapshot_yields_an_empty_queue() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("does-not-exist.zip");
    let loaded = Queue::load(&path).expect("load");
    assert!(loaded.is_empty());
}
