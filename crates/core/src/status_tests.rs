use super::*;
use yare::parameterized;

#[parameterized(
    todo = { SourceStatus::Todo, false },
    processing = { SourceStatus::Processing, false },
    processed = { SourceStatus::Processed, true },
    persistent_processed = { SourceStatus::PersistentProcessed, true },
    parsing_error = { SourceStatus::ParsingError, true },
)]
fn terminal_classification(status: SourceStatus, expected: bool) {
    assert_eq!(status.is_terminal(), expected);
}

#[parameterized(
    persistent_processed = { SourceStatus::PersistentProcessed, true },
    cache_loaded = { SourceStatus::CacheLoaded, true },
    persistent_cached = { SourceStatus::PersistentCached, true },
    processed = { SourceStatus::Processed, false },
    todo = { SourceStatus::Todo, false },
)]
fn persistence_classification(status: SourceStatus, expected: bool) {
    assert_eq!(status.is_persistent(), expected);
}

#[test]
fn error_statuses_are_flagged() {
    assert!(SourceStatus::ConnectionError.is_error());
    assert!(SourceStatus::SessionBroken.is_error());
    assert!(!SourceStatus::Processed.is_error());
}

#[test]
fn display_matches_wire_format() {
    assert_eq!(SourceStatus::PersistentProcessed.to_string(), "PERSISTENT_PROCESSED");
}
