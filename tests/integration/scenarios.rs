//! Documented behaviors, end to end

use crate::common::*;
use std::sync::Arc;

// ============================================================================
// Consolidation
// ============================================================================

#[test]
fn field_merge_fills_gaps_from_both_sides() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.add_one(Character::new(1).name("Alice"));
    memory.add_one(Character::new(1).value(30));

    assert_eq!(memory.get(&1), Some(Character::new(1).name("Alice").value(30)));
}

#[test]
fn field_merge_replaces_lists_instead_of_concatenating() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.add_one(Character::new(1).tags(&["ranger", "heir"]));
    memory.add_one(Character::new(1).tags(&["king"]));
    assert_eq!(memory.get(&1).unwrap().tags, vec!["king".to_string()]);

    // An empty incoming list leaves the stored one alone
    memory.add_one(Character::new(1));
    assert_eq!(memory.get(&1).unwrap().tags, vec!["king".to_string()]);
}

#[test]
fn keep_incoming_duplicates_in_one_call_keep_the_last() {
    let memory = memory_with(Arc::new(KeepIncoming));
    let report = memory.add(vec![
        Character::new(9).name("first"),
        Character::new(9).name("second"),
        Character::new(9).name("third"),
    ]);

    assert_eq!(memory.size(), 1);
    assert_eq!(memory.get(&9), Some(Character::new(9).name("third")));
    assert_eq!(report.merged, 1);
    assert_eq!(report.reduce.rounds, 2);
}

#[test]
fn keep_existing_never_overwrites() {
    let memory = memory_with(Arc::new(KeepExisting));
    memory.add_one(Character::new(1).name("Gandalf the Grey"));
    memory.add(vec![
        Character::new(1).name("Gandalf the White"),
        Character::new(1).name("Mithrandir"),
    ]);
    assert_eq!(memory.get(&1).unwrap().name.as_deref(), Some("Gandalf the Grey"));
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn merged_record_moves_between_lookup_buckets() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory.add_one(Character::new(1).loc("Kitchen"));
    memory.add_one(Character::new(1).loc("Moria"));

    assert!(memory.get_by_lookup("by_loc", "Kitchen").is_empty());
    let moria = memory.get_by_lookup("by_loc", "Moria");
    assert_eq!(moria.len(), 1);
    assert_eq!(moria[0].id, 1);
}

#[test]
fn remove_purges_every_lookup() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory
        .create_lookup("by_name_len", |c: &Character| c.name.as_ref().map(|n| n.len() as i64))
        .unwrap();
    memory.add(vec![
        Character::new(1).name("Sam").loc("Shire"),
        Character::new(2).name("Pip").loc("Shire"),
    ]);

    assert!(memory.remove(&1));
    assert_eq!(memory.get_by_lookup("by_loc", "Shire").len(), 1);
    assert_eq!(memory.get_by_lookup("by_name_len", 3i64).len(), 1);
    assert_eq!(memory.get_by_lookup("by_loc", "Shire")[0].id, 2);

    // Absent key: false, nothing changes
    assert!(!memory.remove(&1));
    assert_eq!(memory.get_by_lookup("by_loc", "Shire").len(), 1);
    assert_eq!(memory.get_by_lookup("by_name_len", 3i64).len(), 1);
}

#[test]
fn unknown_lookup_or_value_is_empty_not_error() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory.add_one(Character::new(1).loc("Rivendell"));
    assert!(memory.get_by_lookup("by_loc", "Mordor").is_empty());
    assert!(memory.get_by_lookup("by_colour", "grey").is_empty());
}

#[test]
fn lookups_are_listed_in_creation_order() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory.create_field_lookup("by_name", "name").unwrap();
    memory.create_field_lookup("by_value", "value").unwrap();
    assert!(memory.drop_lookup("by_name"));
    assert_eq!(memory.list_lookups(), vec!["by_loc".to_string(), "by_value".to_string()]);
}

// ============================================================================
// Error surfaces
// ============================================================================

#[test]
fn schema_violation_aborts_before_mutation() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.add_one(Character::new(1).name("Frodo"));

    let err = memory
        .add_json(vec![
            serde_json::json!({"id": 1, "name": "Bilbo", "tags": []}),
            serde_json::json!({"id": "two", "tags": []}),
        ])
        .unwrap_err();
    assert!(matches!(err, Error::SchemaViolation { index: 1, .. }));
    assert_eq!(memory.get(&1).unwrap().name.as_deref(), Some("Frodo"));
}

#[test]
fn clear_resets_records_but_keeps_lookups() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory.add(vec![Character::new(1).loc("Bree"), Character::new(2).loc("Bree")]);
    memory.clear();

    assert_eq!(memory.size(), 0);
    assert!(memory.keys().is_empty());
    assert_eq!(memory.list_lookups(), vec!["by_loc".to_string()]);
    assert!(memory.get_by_lookup("by_loc", "Bree").is_empty());
}
