use super::*;
use silo_core::RunId;
use tempfile::tempdir;

#[test]
fn full_run_tree_accumulates_along_the_parent_chain() {
    let dir = tempdir().expect("tempdir");
    let root = StatusId::root();
    let s1 = write_status(dir.path(), &root, &[RunId::from_raw("r1")], 1).expect("write s1");
    let s2 = write_status(dir.path(), &s1, &[RunId::from_raw("r2")], 2).expect("write s2");

    let tree = full_run_tree(dir.path(), &s2).expect("full run tree");
    assert_eq!(tree.len(), 2);
    assert!(tree.contains(&RunId::from_raw("r1")));
    assert!(tree.contains(&RunId::from_raw("r2")));
}

#[test]
fn select_leaf_prefers_the_larger_full_run_tree() {
    let dir = tempdir().expect("tempdir");
    let root = StatusId::root();
    let s1 = write_status(dir.path(), &root, &[RunId::from_raw("r1")], 1).expect("write s1");
    let _s2 = write_status(dir.path(), &s1, &[RunId::from_raw("r2")], 2).expect("write s2");
    // A second, shorter branch off the same root.
    let _s3 = write_status(dir.path(), &root, &[RunId::from_raw("r3")], 1).expect("write s3");

    let leaf = select_leaf(dir.path()).expect("select leaf").expect("a leaf exists");
    let tree = full_run_tree(dir.path(), &leaf).expect("tree");
    assert_eq!(tree.len(), 2);
}

#[test]
fn select_leaf_breaks_ties_deterministically() {
    let dir = tempdir().expect("tempdir");
    let root = StatusId::root();
    let a = write_status(dir.path(), &root, &[RunId::from_raw("ra")], 1).expect("write a");
    let b = write_status(dir.path(), &root, &[RunId::from_raw("rb")], 1).expect("write b");

    let leaf = select_leaf(dir.path()).expect("select leaf").expect("a leaf exists");
    let expected = std::cmp::min(a.as_str(), b.as_str());
    assert_eq!(leaf.as_str(), expected);
}

#[test]
fn current_defaults_to_root_when_unset() {
    let dir = tempdir().expect("tempdir");
    assert!(current(dir.path()).expect("current").is_root());
}

#[test]
fn set_current_persists_across_reads() {
    let dir = tempdir().expect("tempdir");
    let id = StatusId::from_raw("abc123");
    set_current(dir.path(), &id).expect("set current");
    assert_eq!(current(dir.path()).expect("current"), id);
}

#[test]
fn status_cache_merge_unions_both_maps() {
    let mut a = StatusCache::new();
    let mut b = StatusCache::new();
    let root = StatusId::root();
    let s1 = StatusId::from_raw("s1");
    let s2 = StatusId::from_raw("s2");
    a.record(
        s1.clone(),
        &StatusContext {
            parent: Some(root.clone()),
            integrated_runs: vec![],
            created_at_ms: 0,
        },
    );
    b.record(
        s2.clone(),
        &StatusContext {
            parent: Some(root),
            integrated_runs: vec![],
            created_at_ms: 0,
        },
    );
    a.merge(&b);
    assert!(a.statuses.contains(&s1));
    assert!(a.statuses.contains(&s2));
}

#[test]
fn load_cache_defaults_to_empty_when_absent() {
    let dir = tempdir().expect("tempdir");
    let cache = load_cache(dir.path()).expect("load cache");
    assert!(cache.statuses.is_empty());
}

#[test]
fn save_cache_then_load_round_trips() {
    let dir = tempdir().expect("tempdir");
    let mut cache = StatusCache::new();
    let id = StatusId::from_raw("abc123");
    cache.record(
        id.clone(),
        &StatusContext {
            parent: Some(StatusId::root()),
            integrated_runs: vec![],
            created_at_ms: 0,
        },
    );
    save_cache(dir.path(), &cache).expect("save cache");
    let loaded = load_cache(dir.path()).expect("load cache");
    assert!(loaded.statuses.contains(&id));
}
