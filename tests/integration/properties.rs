//! Store-level properties over random operation sequences

use crate::common::*;
use concord::{rounds_for, MergeError};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const LOCS: [&str; 3] = ["Shire", "Bree", "Moria"];

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<(u32, Option<usize>)>),
    Remove(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec((0u32..8, prop::option::of(0usize..LOCS.len())), 1..6)
            .prop_map(Op::Add),
        1 => (0u32..8).prop_map(Op::Remove),
    ]
}

fn fragment(id: u32, loc: Option<usize>) -> Character {
    let c = Character::new(id);
    match loc {
        Some(i) => c.loc(LOCS[i]),
        None => c,
    }
}

fn character_strategy() -> impl Strategy<Value = Character> {
    (
        0u32..100,
        prop::option::of("[a-z]{1,8}"),
        prop::option::of(any::<i64>()),
        prop::option::of(prop::sample::select(LOCS.to_vec())),
        prop::collection::vec("[a-z]{1,5}", 0..3),
    )
        .prop_map(|(id, name, value, loc, tags)| Character {
            id,
            name,
            value,
            loc: loc.map(str::to_string),
            tags,
        })
}

/// Counts batch calls through the store; keeps incoming.
#[derive(Default)]
struct CountingMerger {
    batch_calls: AtomicUsize,
}

impl Merger<Character> for CountingMerger {
    fn name(&self) -> &str {
        "counting"
    }

    fn pair_merge(&self, _existing: &Character, incoming: &Character) -> Result<Character, MergeError> {
        Ok(incoming.clone())
    }

    fn batch_merge(&self, pairs: &[(Character, Character)]) -> Vec<Result<Character, MergeError>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        pairs.iter().map(|(e, i)| self.pair_merge(e, i)).collect()
    }
}

proptest! {
    /// size == distinct keys ever added minus keys subsequently removed,
    /// and every lookup bucket agrees with the store.
    #[test]
    fn size_law_and_lookup_invariant(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let memory = memory_with(Arc::new(FieldMerge));
        memory.create_field_lookup("by_loc", "loc").unwrap();
        let mut live: HashSet<u32> = HashSet::new();

        for op in ops {
            match op {
                Op::Add(fragments) => {
                    for (id, _) in &fragments {
                        live.insert(*id);
                    }
                    memory.add(fragments.into_iter().map(|(id, loc)| fragment(id, loc)));
                }
                Op::Remove(id) => {
                    let removed = memory.remove(&id);
                    prop_assert_eq!(removed, live.remove(&id));
                }
            }

            prop_assert_eq!(memory.size(), live.len());

            for loc in LOCS {
                for record in memory.get_by_lookup("by_loc", loc) {
                    prop_assert!(live.contains(&record.id));
                    prop_assert_eq!(record.loc.as_deref(), Some(loc));
                }
            }
            for record in memory.items() {
                if let Some(loc) = &record.loc {
                    let bucket = memory.get_by_lookup("by_loc", loc.as_str());
                    prop_assert!(bucket.iter().any(|r| r.id == record.id));
                }
            }
        }
    }

    /// Merging a record with itself yields the record under every classic
    /// policy.
    #[test]
    fn classic_policies_are_idempotent(record in character_strategy()) {
        let policies: Vec<Arc<dyn Merger<Character>>> =
            vec![Arc::new(KeepExisting), Arc::new(KeepIncoming), Arc::new(FieldMerge)];
        for policy in policies {
            let memory = memory_with(policy);
            memory.add_one(record.clone());
            memory.add_one(record.clone());
            prop_assert_eq!(memory.get(&record.id), Some(record.clone()));
        }
    }

    /// One add spanning many keys costs ceil(log2(max n)) batch calls,
    /// counting the stored record as a fragment of its key.
    #[test]
    fn one_add_costs_rounds_of_the_largest_group(
        seeded in prop::collection::hash_set(0u32..6, 0..6),
        ids in prop::collection::vec(0u32..6, 1..40),
    ) {
        let merger = Arc::new(CountingMerger::default());
        let memory = memory_with(merger.clone());
        memory.add(seeded.iter().map(|id| Character::new(*id)));
        merger.batch_calls.store(0, Ordering::SeqCst);

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for id in &ids {
            *counts.entry(*id).or_insert(0) += 1;
        }
        let expected = counts
            .iter()
            .map(|(id, n)| rounds_for(n + usize::from(seeded.contains(id))))
            .max()
            .unwrap_or(0);

        let report = memory.add(ids.iter().map(|id| Character::new(*id)));
        prop_assert_eq!(merger.batch_calls.load(Ordering::SeqCst), expected);
        prop_assert_eq!(report.reduce.batch_calls, expected);
    }
}
