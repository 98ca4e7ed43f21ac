//! Property-based tests for balanced cloning
//!
//! Tests invariants:
//! - A collection with templates always reaches its target exactly
//! - Fresh templates end with clone counts differing by at most one,
//!   earlier templates never behind later ones
//! - With shared templates, every targeted collection reaches its target

use proptest::prelude::*;

use crate::core::roster::cloner::BalancedCloner;
use crate::core::roster::distribution::DistributionTarget;
use crate::core::roster::graph::ReferenceGraphBuilder;
use crate::core::roster::memory_store::InMemoryStore;
use crate::core::roster::names::Gender;
use crate::core::roster::store::{EntityHandle, LeveledEntry, MembershipMetadata};

fn entry(reference: EntityHandle) -> LeveledEntry {
    LeveledEntry::new(reference, MembershipMetadata::new(1, 1, 0))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: target reached exactly, counts balanced and front-loaded
    #[test]
    fn prop_single_collection_balanced(
        template_count in 1usize..8,
        extra in 0u32..60
    ) {
        let mut store = InMemoryStore::new();
        let entries: Vec<LeveledEntry> = (0..template_count)
            .map(|i| entry(store.add_character(&format!("T{}", i), Gender::Male)))
            .collect();
        store.add_leveled_list("L1", entries);

        let target = template_count as u32 + extra;
        let mut graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", target)])
            .unwrap();
        let l1 = graph.to_multiply()[0];
        let created = BalancedCloner::new(&mut store).multiply(&mut graph, l1).unwrap();

        prop_assert_eq!(created.len() as u32, extra);
        prop_assert_eq!(graph.collection(l1).current_count, target);

        let counts: Vec<usize> = graph.templates().iter().map(|t| t.clones.len()).collect();
        let max = *counts.iter().max().unwrap();
        let min = *counts.iter().min().unwrap();
        prop_assert!(max - min <= 1, "unbalanced counts {:?}", counts);
        prop_assert!(counts.windows(2).all(|w| w[0] >= w[1]), "not front-loaded {:?}", counts);
    }

    /// Property: overlapping collections each reach their targets
    #[test]
    fn prop_shared_templates_reach_targets(
        first_size in 1usize..5,
        second_size in 1usize..5,
        overlap in 0usize..5,
        first_extra in 0u32..20,
        second_extra in 0u32..20
    ) {
        let overlap = overlap.min(first_size).min(second_size);
        let mut store = InMemoryStore::new();

        let first: Vec<EntityHandle> = (0..first_size)
            .map(|i| store.add_character(&format!("A{}", i), Gender::Female))
            .collect();
        let mut second: Vec<EntityHandle> = first[..overlap].to_vec();
        second.extend(
            (overlap..second_size).map(|i| store.add_character(&format!("B{}", i), Gender::Male)),
        );

        store.add_leveled_list("L1", first.iter().map(|h| entry(*h)).collect());
        store.add_leveled_list("L2", second.iter().map(|h| entry(*h)).collect());

        let targets = [
            DistributionTarget::new("L1", first_size as u32 + first_extra),
            DistributionTarget::new("L2", second_size as u32 + second_extra),
        ];
        let mut graph = ReferenceGraphBuilder::new(&store).build(&targets).unwrap();
        let order = graph.to_multiply().to_vec();

        let mut cloner = BalancedCloner::new(&mut store);
        for id in &order {
            cloner.multiply(&mut graph, *id).unwrap();
        }

        for (id, target) in order.iter().zip(targets.iter()) {
            let record = graph.collection(*id);
            prop_assert!(
                record.current_count >= target.count,
                "{} at {} below {}",
                record.editor_id,
                record.current_count,
                target.count
            );
            let pending = record.pending_count() as u32;
            let initial = record.templates.len() as u32;
            prop_assert_eq!(record.current_count, initial + pending);
        }
    }
}
