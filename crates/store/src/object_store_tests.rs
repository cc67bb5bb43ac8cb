use super::*;
use tempfile::tempdir;

#[test]
fn dump_and_read_bytes_round_trip() {
    let dir = tempdir().expect("tempdir");
    let store = ObjectStore::new(dir.path());
    let digest = store.dump_bytes("bin", b"hello depot").expect("dump");
    let back = store.read_bytes(&digest, "bin").expect("read");
    assert_eq!(back, b"hello depot");
}

#[test]
fn dump_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let store = ObjectStore::new(dir.path());
    let first = store.dump_bytes("bin", b"same content").expect("dump");
    let second = store.dump_bytes("bin", b"same content").expect("dump again");
    assert_eq!(first, second);
}

#[test]
fn reading_missing_blob_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let store = ObjectStore::new(dir.path());
    let err = store.read_bytes("0000deadbeef", "bin").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn json_round_trips_through_typed_helpers() {
    let dir = tempdir().expect("tempdir");
    let store = ObjectStore::new(dir.path());
    let value = serde_json::json!({"a": 1, "b": "two"});
    let digest = store.dump_json(&value).expect("dump json");
    let back: serde_json::Value = store.read_json(&digest).expect("read json");
    assert_eq!(value, back);
}

#[test]
fn blobs_are_sharded_into_prefix_directories() {
    let dir = tempdir().expect("tempdir");
    let store = ObjectStore::new(dir.path());
    let digest = store.dump_bytes("bin", b"shard me").expect("dump");
    let expected_prefix = dir.path().join(&digest[..2]);
    assert!(expected_prefix.is_dir());
}
