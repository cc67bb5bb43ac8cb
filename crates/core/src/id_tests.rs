use super::*;

crate::define_id!(TestId, "t-");

#[test]
fn new_ids_carry_the_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("t-"));
    assert_eq!(id.suffix().len(), 19);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("t-abc123");
    assert_eq!(id.as_str(), "t-abc123");
    assert_eq!(id, "t-abc123");
}

#[test]
fn short_truncates_from_the_left() {
    assert_eq!(short("abcdefgh", 4), "efgh");
    assert_eq!(short("ab", 4), "ab");
}

#[test]
fn serde_round_trips_through_json() {
    let id = TestId::from_string("t-xyz");
    let encoded = serde_json::to_string(&id).expect("serialize");
    let decoded: TestId = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(id, decoded);
}
