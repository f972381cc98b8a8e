//! Remote reasoning strategies through the builder and config

use crate::common::*;
use concord::{MemoryBuilder, MemoryConfig, CONFIG_FILE_NAME};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn llm_memory(backend: Arc<OverlayBackend>, strategy: MergeStrategy) -> Memory<Character, u32> {
    Memory::builder(character_key)
        .strategy(strategy)
        .remote_backend(backend)
        .merge_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[test]
fn llm_strategy_merges_with_one_call_per_round() {
    let backend = Arc::new(OverlayBackend::default());
    let memory = llm_memory(backend.clone(), MergeStrategy::LlmBalanced);
    assert_eq!(memory.merger_name(), "llm_balanced");

    memory.add(vec![
        Character::new(1).name("Boromir"),
        Character::new(1).loc("Gondor"),
        Character::new(2).name("Faramir"),
        Character::new(2).value(36),
        Character::new(2).loc("Ithilien"),
        Character::new(2).tags(&["captain"]),
    ]);

    // Largest group has 4 fragments: two rounds, two remote calls
    assert_eq!(backend.calls(), 2);
    assert_eq!(memory.get(&1), Some(Character::new(1).name("Boromir").loc("Gondor")));
    assert_eq!(
        memory.get(&2),
        Some(
            Character::new(2)
                .name("Faramir")
                .value(36)
                .loc("Ithilien")
                .tags(&["captain"])
        )
    );
}

#[test]
fn fast_path_never_calls_the_model() {
    let backend = Arc::new(OverlayBackend::default());
    let memory = llm_memory(backend.clone(), MergeStrategy::LlmPreferIncoming);
    let report = memory.add((0..10).map(|i| Character::new(i).name("orc")));
    assert_eq!(report.inserted, 10);
    assert_eq!(backend.calls(), 0);
}

#[test]
fn unreachable_model_falls_back_to_incoming() {
    let backend = Arc::new(OverlayBackend::failing());
    let memory = llm_memory(backend.clone(), MergeStrategy::LlmPreferExisting);
    memory.create_field_lookup("by_loc", "loc").unwrap();

    memory.add_one(Character::new(1).name("Smeagol").loc("Gladden Fields"));
    let report = memory.add_one(Character::new(1).name("Gollum").loc("Misty Mountains"));

    assert_eq!(report.reduce.fallbacks, 1);
    assert_eq!(backend.calls(), 2);
    assert_eq!(memory.get(&1), Some(Character::new(1).name("Gollum").loc("Misty Mountains")));
    assert!(memory.get_by_lookup("by_loc", "Gladden Fields").is_empty());
    assert_eq!(memory.get_by_lookup("by_loc", "Misty Mountains").len(), 1);
}

#[test]
fn custom_rule_requires_rule_text() {
    let result = Memory::<Character, u32>::builder(character_key)
        .strategy(MergeStrategy::LlmCustomRule)
        .remote_backend(Arc::new(OverlayBackend::default()))
        .rule("   ")
        .build();
    assert!(matches!(result, Err(Error::Config(_))));

    let memory = Memory::<Character, u32>::builder(character_key)
        .strategy(MergeStrategy::LlmCustomRule)
        .remote_backend(Arc::new(OverlayBackend::default()))
        .rule("Prefer the most recent location.")
        .dynamic_rule(|| "Season: winter".to_string())
        .build()
        .unwrap();
    assert_eq!(memory.merger_name(), "llm_custom_rule");
}

#[test]
fn config_file_drives_the_builder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"
strategy = "keep_old"
fields_for_index = ["name"]
"#,
    )
    .unwrap();

    let config = MemoryConfig::from_file(&path).unwrap();
    let memory = MemoryBuilder::from_config(character_key, &config)
        .unwrap()
        .search_backend(Arc::new(KeywordBackend::default()))
        .build()
        .unwrap();

    assert_eq!(memory.merger_name(), "keep_existing");
    assert_eq!(memory.fields_for_index(), ["name".to_string()]);
    memory.add_one(Character::new(1).name("Treebeard"));
    memory.add_one(Character::new(1).name("Fangorn"));
    assert_eq!(memory.get(&1).unwrap().name.as_deref(), Some("Treebeard"));
}

#[test]
fn llm_config_without_model_section_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "strategy = \"llm_balanced\"\n").unwrap();

    let config = MemoryConfig::from_file(&path).unwrap();
    let result = MemoryBuilder::<Character, u32>::from_config(character_key, &config)
        .unwrap()
        .build();
    assert!(matches!(result, Err(Error::Config(_))));
}
