//! Mock-based tests for the engine's use of the host store
//!
//! Uses the mockall-generated `MockEntityStore` to check the order of store
//! mutations across phases and that store failures stop a run.

use mockall::predicate::{always, eq};
use mockall::Sequence;

use crate::config::EngineConfig;
use crate::core::roster::distribution::{DistributionTable, DistributionTarget};
use crate::core::roster::engine::DuplicationEngine;
use crate::core::roster::errors::{RosterError, StoreError};
use crate::core::roster::store::{
    EntityHandle, EntityKind, LeveledEntry, MembershipMetadata, MockEntityStore,
};

const LIST: EntityHandle = EntityHandle(10);
const TEMPLATE: EntityHandle = EntityHandle(1);
const CLONE: EntityHandle = EntityHandle(20);

// ============================================================================
// Helpers
// ============================================================================

/// A store holding one leveled list `L1` with one template `A`.
fn single_template_store() -> MockEntityStore {
    let mut mock = MockEntityStore::new();
    mock.expect_entities().returning(|kind, _| match kind {
        EntityKind::LeveledList => vec![LIST],
        _ => Vec::new(),
    });
    mock.expect_winning_override().returning(Ok);
    mock.expect_leveled_entries().with(eq(LIST)).returning(|_| {
        Ok(Some(vec![LeveledEntry::new(
            TEMPLATE,
            MembershipMetadata::new(1, 1, 0),
        )]))
    });
    mock.expect_editor_id().returning(|handle| match handle {
        LIST => Ok("L1".to_string()),
        TEMPLATE => Ok("A".to_string()),
        CLONE => Ok("A_acot0".to_string()),
        other => Err(StoreError::unknown_entity(other.0)),
    });
    mock.expect_long_name()
        .returning(|handle| Ok(format!("[{}]", handle)));
    mock.expect_kind().returning(|handle| match handle {
        LIST => Ok(EntityKind::LeveledList),
        _ => Ok(EntityKind::Character),
    });
    mock.expect_is_template_bound().returning(|_| Ok(true));
    mock.expect_is_female().returning(|_| Ok(false));
    mock
}

fn table(target: DistributionTarget) -> DistributionTable {
    let mut table = DistributionTable::new();
    table.push(target);
    table
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_phases_mutate_store_in_order() {
    let mut mock = single_template_store();
    let mut seq = Sequence::new();

    mock.expect_copy_as_new()
        .with(eq(TEMPLATE), eq("A_acot0"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CLONE));
    mock.expect_set_display_name()
        .with(eq(TEMPLATE), always())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    mock.expect_set_display_name()
        .with(eq(CLONE), always())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    mock.expect_append_leveled_entry()
        .with(
            eq(LIST),
            eq(LeveledEntry::new(CLONE, MembershipMetadata::new(1, 1, 0))),
        )
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let engine = DuplicationEngine::new(EngineConfig::default()).unwrap();
    let report = engine
        .run(&mut mock, table(DistributionTarget::new("L1", 2).with_rename(true)))
        .unwrap();

    assert_eq!(report.renamed, 2);
    assert_eq!(report.entries_appended, 1);
    assert_eq!(report.clone_counts(), vec![("A", 1)]);
}

#[test]
fn test_store_failure_stops_run() {
    let mut mock = single_template_store();
    mock.expect_copy_as_new()
        .returning(|_, _| Err(StoreError::operation_failed("copy", "output is read-only")));
    mock.expect_set_display_name().never();
    mock.expect_append_leveled_entry().never();

    let engine = DuplicationEngine::new(EngineConfig::default()).unwrap();
    let err = engine
        .run(&mut mock, table(DistributionTarget::new("L1", 3).with_rename(true)))
        .unwrap_err();

    assert!(matches!(
        err,
        RosterError::Store(StoreError::OperationFailed { .. })
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn test_no_mutation_when_target_already_met() {
    let mut mock = single_template_store();
    mock.expect_copy_as_new().never();
    mock.expect_set_display_name().never();
    mock.expect_append_leveled_entry().never();

    let engine = DuplicationEngine::new(EngineConfig::default()).unwrap();
    let report = engine
        .run(&mut mock, table(DistributionTarget::new("L1", 1)))
        .unwrap();

    assert_eq!(report.total_clones(), 0);
    assert_eq!(report.multiplied, vec!["L1".to_string()]);
    assert!(report.modified.is_empty());
}
