//! Reference Graph
//!
//! Records which collections reference which templates, and with what
//! per-entry metadata, so cloning one template can update every collection
//! that should receive the clone.
//!
//! # Architecture
//!
//! ```text
//! ReferenceGraph
//!   +-- templates: Vec<TemplateRecord>        (indexed by TemplateId)
//!   |     +-- collections: {CollectionId}
//!   |     +-- clones: [EntityHandle]
//!   +-- collections: Vec<CollectionRecord>    (indexed by CollectionId)
//!   |     +-- templates: {TemplateId}          (multiply set)
//!   |     +-- ledgers: TemplateId -> MembershipLedger
//!   +-- to_multiply / to_modify / rename_queue
//! ```
//!
//! Building runs in two phases. Targeted collections are resolved first and
//! define the template set. Every remaining collection is then scanned for
//! references to those templates, so clones propagate to collections that
//! were never named in the distribution table.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use super::distribution::DistributionTarget;
use super::errors::{Result, RosterError};
use super::store::{EntityHandle, EntityKind, EntityScope, EntityStore, MembershipMetadata};

// ============================================================================
// Identifiers
// ============================================================================

/// Index of a template in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(usize);

impl TemplateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a collection in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(usize);

impl CollectionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

// ============================================================================
// Records
// ============================================================================

/// Which membership shape a collection has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Entries carry [`MembershipMetadata`].
    Leveled,
    /// Bare references.
    Plain,
}

impl CollectionKind {
    fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Leveled => EntityKind::LeveledList,
            Self::Plain => EntityKind::FormList,
        }
    }
}

/// What the run does with a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Not (yet) involved.
    #[default]
    Untouched,
    /// Targeted with at least one template; clones are created for it.
    Multiply,
    /// References a template but is not targeted; receives clones only.
    Modify,
    /// Targeted but references no template.
    Skipped,
}

/// A duplicable entity and everything that references it.
#[derive(Debug, Clone)]
pub struct TemplateRecord {
    /// Winning version of the template.
    pub handle: EntityHandle,
    pub editor_id: String,
    /// Collections that reference this template, in discovery order.
    pub collections: IndexSet<CollectionId>,
    /// Clones created so far, in creation order.
    pub clones: Vec<EntityHandle>,
}

/// What one collection recorded about one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipLedger {
    /// Metadata of each original entry referencing the template.
    pub entries: Vec<MembershipMetadata>,
    /// Clones awaiting insertion into the collection.
    pub pending: Vec<EntityHandle>,
}

/// A discovered collection.
#[derive(Debug, Clone)]
pub struct CollectionRecord {
    /// Winning version of the collection.
    pub handle: EntityHandle,
    pub editor_id: String,
    pub kind: CollectionKind,
    pub disposition: Disposition,
    /// Desired population, present only for targeted collections.
    pub target_count: Option<u32>,
    pub rename: bool,
    /// Distinct templates plus distinct base entities, plus clones added so far.
    pub current_count: u32,
    /// Templates this collection multiplies.
    pub templates: IndexSet<TemplateId>,
    /// Per-template membership metadata and pending clones.
    pub ledgers: IndexMap<TemplateId, MembershipLedger>,
}

impl CollectionRecord {
    fn new(handle: EntityHandle, editor_id: String, kind: CollectionKind) -> Self {
        Self {
            handle,
            editor_id,
            kind,
            disposition: Disposition::Untouched,
            target_count: None,
            rename: false,
            current_count: 0,
            templates: IndexSet::new(),
            ledgers: IndexMap::new(),
        }
    }

    /// Number of clones still needed to reach the target.
    pub fn deficit(&self) -> u32 {
        self.target_count
            .map(|target| target.saturating_sub(self.current_count))
            .unwrap_or(0)
    }

    /// Total clones awaiting insertion across all ledgers.
    pub fn pending_count(&self) -> usize {
        self.ledgers.values().map(|l| l.pending.len()).sum()
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Template/collection relationships for one run.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    templates: Vec<TemplateRecord>,
    template_index: HashMap<String, TemplateId>,
    collections: Vec<CollectionRecord>,
    to_multiply: Vec<CollectionId>,
    to_modify: IndexSet<CollectionId>,
    rename_queue: IndexSet<EntityHandle>,
    warnings: Vec<RosterError>,
}

impl ReferenceGraph {
    pub fn template(&self, id: TemplateId) -> &TemplateRecord {
        &self.templates[id.0]
    }

    pub fn collection(&self, id: CollectionId) -> &CollectionRecord {
        &self.collections[id.0]
    }

    pub fn templates(&self) -> &[TemplateRecord] {
        &self.templates
    }

    pub fn collections(&self) -> &[CollectionRecord] {
        &self.collections
    }

    /// Look a template up by identifier.
    pub fn template_id(&self, editor_id: &str) -> Option<TemplateId> {
        self.template_index.get(editor_id).copied()
    }

    /// Look a discovered collection up by identifier.
    pub fn collection_id(&self, editor_id: &str) -> Option<CollectionId> {
        self.collections
            .iter()
            .position(|c| c.editor_id == editor_id)
            .map(CollectionId)
    }

    /// Targeted collections with templates, in distribution order.
    pub fn to_multiply(&self) -> &[CollectionId] {
        &self.to_multiply
    }

    /// Collections to rewrite: targeted first, then transitively affected.
    pub fn to_modify(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.to_modify.iter().copied()
    }

    /// Entities awaiting a generated display name.
    pub fn rename_queue(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.rename_queue.iter().copied()
    }

    pub fn rename_queue_len(&self) -> usize {
        self.rename_queue.len()
    }

    /// Recoverable problems seen while building.
    pub fn warnings(&self) -> &[RosterError] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<RosterError> {
        std::mem::take(&mut self.warnings)
    }

    /// Record a freshly created clone of `template`.
    ///
    /// Every collection referencing the template counts the clone and queues
    /// it for insertion. The clone joins the rename queue when `rename` is set.
    pub fn register_clone(&mut self, template: TemplateId, clone: EntityHandle, rename: bool) {
        let record = &mut self.templates[template.0];
        record.clones.push(clone);

        for collection in record.collections.iter() {
            let target = &mut self.collections[collection.0];
            target.current_count = target.current_count.saturating_add(1);
            target.ledgers.entry(template).or_default().pending.push(clone);
        }

        if rename {
            self.rename_queue.insert(clone);
        }
    }

    fn add_collection(&mut self, record: CollectionRecord) -> CollectionId {
        self.collections.push(record);
        CollectionId(self.collections.len() - 1)
    }

    fn template_or_insert(&mut self, handle: EntityHandle, editor_id: &str) -> (TemplateId, bool) {
        if let Some(id) = self.template_index.get(editor_id) {
            return (*id, false);
        }
        self.templates.push(TemplateRecord {
            handle,
            editor_id: editor_id.to_string(),
            collections: IndexSet::new(),
            clones: Vec::new(),
        });
        let id = TemplateId(self.templates.len() - 1);
        self.template_index.insert(editor_id.to_string(), id);
        (id, true)
    }

    fn link(
        &mut self,
        collection: CollectionId,
        template: TemplateId,
        metadata: Option<MembershipMetadata>,
    ) {
        self.templates[template.0].collections.insert(collection);
        let ledger = self.collections[collection.0]
            .ledgers
            .entry(template)
            .or_default();
        ledger.entries.extend(metadata);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// One reference held by a collection.
#[derive(Debug, Clone)]
struct Member {
    reference: EntityHandle,
    metadata: Option<MembershipMetadata>,
}

/// Builds a [`ReferenceGraph`] from a store and a list of targets.
pub struct ReferenceGraphBuilder<'s, S: EntityStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: EntityStore + ?Sized> ReferenceGraphBuilder<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolve `targets` against the store and map every template reference.
    pub fn build(&self, targets: &[DistributionTarget]) -> Result<ReferenceGraph> {
        let mut graph = ReferenceGraph::default();
        let mut members: Vec<Vec<Member>> = Vec::new();
        let mut pool: IndexMap<(CollectionKind, String), CollectionId> = IndexMap::new();

        self.discover(CollectionKind::Leveled, &mut graph, &mut members, &mut pool)?;
        self.discover(CollectionKind::Plain, &mut graph, &mut members, &mut pool)?;
        info!(collections = pool.len(), "Discovered collections");

        for target in targets {
            let key = [CollectionKind::Leveled, CollectionKind::Plain]
                .into_iter()
                .map(|kind| (kind, target.editor_id.clone()))
                .find(|key| pool.contains_key(key));
            let Some(id) = key.and_then(|key| pool.shift_remove(&key)) else {
                let err = RosterError::collection_not_found(&target.editor_id);
                warn!("{}", err);
                graph.warnings.push(err);
                continue;
            };
            self.resolve_target(&mut graph, id, &members[id.0], target)?;
        }

        for id in pool.values().copied() {
            self.scan_remaining(&mut graph, id, &members[id.0])?;
        }

        info!(
            templates = graph.templates.len(),
            multiply = graph.to_multiply.len(),
            modify = graph.to_modify.len(),
            "Built reference graph"
        );
        Ok(graph)
    }

    /// Register every non-empty collection of `kind`.
    fn discover(
        &self,
        kind: CollectionKind,
        graph: &mut ReferenceGraph,
        members: &mut Vec<Vec<Member>>,
        pool: &mut IndexMap<(CollectionKind, String), CollectionId>,
    ) -> Result<()> {
        for handle in self.store.entities(kind.entity_kind(), EntityScope::All) {
            let winner = self.store.winning_override(handle)?;
            let Some(list) = self.members_of(kind, winner)? else {
                continue;
            };
            if list.is_empty() {
                continue;
            }

            let editor_id = self.store.editor_id(winner)?;
            if kind == CollectionKind::Plain && !self.all_characters(&list)? {
                debug!(collection = %editor_id, "Skipping plain collection with non-character members");
                continue;
            }

            let id = graph.add_collection(CollectionRecord::new(winner, editor_id.clone(), kind));
            members.push(list);
            pool.insert((kind, editor_id), id);
        }
        Ok(())
    }

    fn members_of(&self, kind: CollectionKind, list: EntityHandle) -> Result<Option<Vec<Member>>> {
        let members = match kind {
            CollectionKind::Leveled => self.store.leveled_entries(list)?.map(|entries| {
                entries
                    .into_iter()
                    .map(|entry| Member {
                        reference: entry.reference,
                        metadata: Some(entry.metadata),
                    })
                    .collect()
            }),
            CollectionKind::Plain => self.store.form_list_members(list)?.map(|refs| {
                refs.into_iter()
                    .map(|reference| Member {
                        reference,
                        metadata: None,
                    })
                    .collect()
            }),
        };
        Ok(members)
    }

    fn all_characters(&self, members: &[Member]) -> Result<bool> {
        for member in members {
            if self.store.kind(member.reference)? != EntityKind::Character {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// First phase: collect templates and base entities of a targeted collection.
    fn resolve_target(
        &self,
        graph: &mut ReferenceGraph,
        id: CollectionId,
        members: &[Member],
        target: &DistributionTarget,
    ) -> Result<()> {
        let collection = &mut graph.collections[id.0];
        collection.target_count = Some(target.count);
        collection.rename = target.rename;
        let long_name = self.store.long_name(collection.handle)?;
        info!("Collecting the members of {}", long_name);

        let mut bases: IndexSet<String> = IndexSet::new();
        for member in members {
            let resolved = self.store.winning_override(member.reference)?;
            let editor_id = self.store.editor_id(resolved)?;

            // Nested lists and other non-characters fill a slot but are never cloned or named
            if self.store.kind(resolved)? != EntityKind::Character {
                debug!(
                    collection = %target.editor_id,
                    member = %editor_id,
                    "Counting non-character member"
                );
                bases.insert(editor_id);
                continue;
            }

            if !self.store.is_template_bound(resolved)? {
                bases.insert(editor_id);
                if target.rename {
                    graph.rename_queue.insert(resolved);
                }
                continue;
            }

            let (template, created) = graph.template_or_insert(resolved, &editor_id);
            if created && target.rename {
                graph.rename_queue.insert(resolved);
            }
            graph.collections[id.0].templates.insert(template);
            graph.link(id, template, member.metadata.clone());
        }

        let collection = &mut graph.collections[id.0];
        let population = collection.templates.len() + bases.len();
        collection.current_count = u32::try_from(population).unwrap_or(u32::MAX);

        if collection.templates.is_empty() {
            collection.disposition = Disposition::Skipped;
            let err = RosterError::empty_template_set(&collection.editor_id);
            warn!("{}", err);
            graph.warnings.push(err);
            return Ok(());
        }

        debug!(
            collection = %collection.editor_id,
            templates = collection.templates.len(),
            bases = bases.len(),
            current = collection.current_count,
            target = target.count,
            "Resolved target"
        );
        collection.disposition = Disposition::Multiply;
        graph.to_multiply.push(id);
        graph.to_modify.insert(id);
        Ok(())
    }

    /// Second phase: record references to known templates in an untargeted collection.
    fn scan_remaining(
        &self,
        graph: &mut ReferenceGraph,
        id: CollectionId,
        members: &[Member],
    ) -> Result<()> {
        let mut found = false;
        for member in members {
            let resolved = self.store.winning_override(member.reference)?;
            let editor_id = self.store.editor_id(resolved)?;
            if let Some(template) = graph.template_id(&editor_id) {
                graph.link(id, template, member.metadata.clone());
                found = true;
            }
        }

        if found {
            graph.collections[id.0].disposition = Disposition::Modify;
            graph.to_modify.insert(id);
            debug!(collection = %graph.collections[id.0].editor_id, "Collection references templates");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::memory_store::InMemoryStore;
    use crate::core::roster::names::Gender;
    use crate::core::roster::store::LeveledEntry;

    fn entry(reference: EntityHandle, level: i32) -> LeveledEntry {
        LeveledEntry::new(reference, MembershipMetadata::new(level, 1, 0))
    }

    #[test]
    fn test_targeted_collection_counts_templates_and_bases() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let b = store.add_character("B", Gender::Female);
        let base = store.add_base_character("Base01", Gender::Male);
        store.add_leveled_list("L1", vec![entry(a, 1), entry(b, 2), entry(base, 3), entry(a, 4)]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", 10)])
            .unwrap();

        let l1 = graph.collection_id("L1").unwrap();
        let record = graph.collection(l1);
        assert_eq!(record.current_count, 3);
        assert_eq!(record.templates.len(), 2);
        assert_eq!(record.disposition, Disposition::Multiply);
        assert_eq!(graph.to_multiply(), &[l1]);

        let a_id = graph.template_id("A").unwrap();
        assert_eq!(record.ledgers[&a_id].entries.len(), 2);
        assert!(graph.template_id("Base01").is_none());
    }

    #[test]
    fn test_untargeted_collections_are_scanned() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let other = store.add_character("Other", Gender::Male);
        store.add_leveled_list("L1", vec![entry(a, 1)]);
        store.add_leveled_list("L2", vec![entry(a, 7), entry(other, 1)]);
        store.add_leveled_list("L3", vec![entry(other, 1)]);
        store.add_form_list("F1", vec![a, other]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", 5)])
            .unwrap();

        let modified: Vec<&str> = graph
            .to_modify()
            .map(|id| graph.collection(id).editor_id.as_str())
            .collect();
        assert_eq!(modified, vec!["L1", "L2", "F1"]);

        let a_id = graph.template_id("A").unwrap();
        let l2 = graph.collection(graph.collection_id("L2").unwrap());
        assert_eq!(l2.disposition, Disposition::Modify);
        assert_eq!(l2.ledgers[&a_id].entries, vec![MembershipMetadata::new(7, 1, 0)]);
        assert_eq!(graph.template(a_id).collections.len(), 3);
    }

    #[test]
    fn test_missing_and_empty_targets_are_warnings() {
        let mut store = InMemoryStore::new();
        let base = store.add_base_character("Base01", Gender::Male);
        store.add_leveled_list("LBasesOnly", vec![entry(base, 1)]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[
                DistributionTarget::new("LMissing", 5),
                DistributionTarget::new("LBasesOnly", 5),
            ])
            .unwrap();

        assert!(graph.to_multiply().is_empty());
        assert_eq!(graph.warnings().len(), 2);
        assert!(matches!(graph.warnings()[0], RosterError::CollectionNotFound { .. }));
        assert!(matches!(graph.warnings()[1], RosterError::EmptyTemplateSet { .. }));
    }

    #[test]
    fn test_overrides_are_resolved() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let b = store.add_character("B", Gender::Male);
        let list = store.add_leveled_list("L1", vec![entry(a, 1)]);
        store.override_leveled_entries(list, vec![entry(a, 1), entry(b, 1)]).unwrap();
        store.override_template_bound(a, false).unwrap();

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", 5)])
            .unwrap();

        let record = graph.collection(graph.collection_id("L1").unwrap());
        assert_eq!(record.templates.len(), 1);
        assert!(graph.template_id("A").is_none());
        assert!(graph.template_id("B").is_some());
        assert_eq!(record.current_count, 2);
    }

    #[test]
    fn test_plain_collections_need_character_members() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let misc = store.add_other("SomeKeyword");
        store.add_leveled_list("L1", vec![entry(a, 1)]);
        store.add_form_list("FMixed", vec![a, misc]);
        store.add_form_list("FEmpty", Vec::new());

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", 2)])
            .unwrap();

        assert!(graph.collection_id("FMixed").is_none());
        assert!(graph.collection_id("FEmpty").is_none());
    }

    #[test]
    fn test_rename_queue_order() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let base = store.add_base_character("Base01", Gender::Male);
        store.add_leveled_list("L1", vec![entry(a, 1), entry(base, 1), entry(a, 2)]);
        store.add_leveled_list("L2", vec![entry(a, 1)]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[
                DistributionTarget::new("L1", 4).with_rename(true),
                DistributionTarget::new("L2", 4).with_rename(true),
            ])
            .unwrap();

        let queue: Vec<EntityHandle> = graph.rename_queue().collect();
        assert_eq!(queue, vec![a, base]);
    }

    #[test]
    fn test_shared_base_character_renamed_once() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let b = store.add_character("B", Gender::Female);
        let base = store.add_base_character("Base01", Gender::Female);
        store.add_leveled_list("L1", vec![entry(base, 1), entry(a, 1)]);
        store.add_leveled_list("L2", vec![entry(b, 1), entry(base, 2)]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[
                DistributionTarget::new("L1", 4).with_rename(true),
                DistributionTarget::new("L2", 4).with_rename(true),
            ])
            .unwrap();

        let queue: Vec<EntityHandle> = graph.rename_queue().collect();
        assert_eq!(queue, vec![base, a, b]);
        assert_eq!(graph.rename_queue_len(), 3);
        assert!(graph.template_id("Base01").is_none());
    }

    #[test]
    fn test_nested_list_fills_a_slot_but_is_never_renamed() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        let base = store.add_base_character("Base01", Gender::Male);
        let inner = store.add_leveled_list("LInner", vec![entry(base, 1)]);
        store.add_leveled_list("LOuter", vec![entry(a, 1), entry(inner, 1)]);

        let graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("LOuter", 3).with_rename(true)])
            .unwrap();

        let outer = graph.collection(graph.collection_id("LOuter").unwrap());
        assert_eq!(outer.current_count, 2);
        assert_eq!(outer.templates.len(), 1);
        assert!(graph.template_id("LInner").is_none());

        let queue: Vec<EntityHandle> = graph.rename_queue().collect();
        assert_eq!(queue, vec![a]);
    }

    #[test]
    fn test_register_clone_updates_every_referencing_collection() {
        let mut store = InMemoryStore::new();
        let a = store.add_character("A", Gender::Male);
        store.add_leveled_list("L1", vec![entry(a, 1)]);
        store.add_leveled_list("L2", vec![entry(a, 3)]);

        let mut graph = ReferenceGraphBuilder::new(&store)
            .build(&[DistributionTarget::new("L1", 3)])
            .unwrap();
        let a_id = graph.template_id("A").unwrap();
        graph.register_clone(a_id, EntityHandle(100), true);

        let l1 = graph.collection(graph.collection_id("L1").unwrap());
        let l2 = graph.collection(graph.collection_id("L2").unwrap());
        assert_eq!(l1.current_count, 2);
        assert_eq!(l1.deficit(), 1);
        assert_eq!(l2.current_count, 1);
        assert_eq!(l2.pending_count(), 1);
        assert_eq!(graph.rename_queue_len(), 1);
    }
}
