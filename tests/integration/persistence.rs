//! Dump/load round trips through the public API

use crate::common::*;
use concord::SnapshotMetadata;
use std::sync::Arc;
use tempfile::TempDir;

fn populated() -> Memory<Character, u32> {
    let memory = searchable_memory();
    memory.add(vec![
        Character::new(3).name("Aragorn").loc("Bree").tags(&["ranger"]),
        Character::new(1).name("Frodo").loc("Shire"),
        Character::new(2).name("Gimli").value(139),
    ]);
    memory
}

#[test]
fn dump_then_load_yields_identical_store() {
    let dir = TempDir::new().unwrap();
    let original = populated();
    original.dump(dir.path()).unwrap();

    let restored = searchable_memory();
    assert_eq!(restored.load(dir.path()).unwrap(), 3);
    assert_eq!(restored.keys(), original.keys());
    for key in original.keys() {
        assert_eq!(restored.get(&key), original.get(&key));
    }
}

#[test]
fn snapshot_layout_and_metadata() {
    let dir = TempDir::new().unwrap();
    let memory = populated();
    memory.create_field_lookup("by_loc", "loc").unwrap();
    memory.dump(dir.path()).unwrap();

    assert!(dir.path().join("memory.json").exists());
    assert!(dir.path().join("metadata.json").exists());
    // No search happened, so no index was built
    assert!(!dir.path().join("index.bin").exists());

    let meta: SnapshotMetadata =
        serde_json::from_slice(&std::fs::read(dir.path().join("metadata.json")).unwrap()).unwrap();
    assert_eq!(meta.schema_name, "Character");
    assert_eq!(meta.size, 3);
    assert_eq!(meta.fields_for_index, vec!["name".to_string(), "loc".to_string()]);
    assert_eq!(meta.lookups, vec!["by_loc".to_string()]);
    assert!(meta.saved_at.is_some());
}

#[test]
fn built_index_is_persisted_and_restored() {
    let dir = TempDir::new().unwrap();
    let memory = populated();
    assert_eq!(memory.search("shire", 1).unwrap()[0].id, 1);
    memory.dump(dir.path()).unwrap();
    assert!(dir.path().join("index.bin").exists());

    let restored = searchable_memory();
    restored.load(dir.path()).unwrap();
    assert!(restored.has_index());
    assert_eq!(restored.search("bree", 1).unwrap()[0].id, 3);
}

#[test]
fn lookups_rebuild_from_loaded_records() {
    let dir = TempDir::new().unwrap();
    populated().dump(dir.path()).unwrap();

    let restored = memory_with(Arc::new(FieldMerge));
    restored.create_field_lookup("by_loc", "loc").unwrap();
    restored.load(dir.path()).unwrap();
    assert_eq!(restored.get_by_lookup("by_loc", "Shire")[0].id, 1);
}

#[test]
fn load_merges_with_existing_records() {
    let dir = TempDir::new().unwrap();
    populated().dump(dir.path()).unwrap();

    let target = memory_with(Arc::new(FieldMerge));
    target.add_one(Character::new(1).value(50));
    target.load(dir.path()).unwrap();

    assert_eq!(target.size(), 3);
    assert_eq!(target.get(&1), Some(Character::new(1).name("Frodo").loc("Shire").value(50)));
}

#[test]
fn corrupted_index_is_a_hard_error() {
    let dir = TempDir::new().unwrap();
    let memory = populated();
    memory.build_index(false).unwrap();
    memory.dump(dir.path()).unwrap();

    let path = dir.path().join("index.bin");
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    let restored = searchable_memory();
    assert!(matches!(restored.load(dir.path()), Err(Error::Corruption(_))));
    assert_eq!(restored.size(), 0);
    assert!(!restored.has_index());

    // A retry after repairing the blob loads each record exactly once
    std::fs::remove_file(&path).unwrap();
    assert_eq!(restored.load(dir.path()).unwrap(), memory.size());
    assert_eq!(restored.items(), memory.items());
}

#[test]
fn loading_nothing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let memory = memory_with(Arc::new(FieldMerge));
    assert!(matches!(memory.load(dir.path().join("absent")), Err(Error::NotFound(_))));
}
