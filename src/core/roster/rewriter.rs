//! Collection Rewriting
//!
//! Appends the clones recorded in a collection's ledgers. Leveled collections
//! get one entry per (original entry, clone) pair carrying a copy of that
//! original entry's metadata; plain collections get each clone once.

use tracing::{debug, info};

use super::errors::Result;
use super::graph::{CollectionId, CollectionKind, ReferenceGraph};
use super::store::{EntityStore, LeveledEntry};

/// Writes pending clones into their collections.
pub struct CollectionRewriter<'a, S: EntityStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: EntityStore + ?Sized> CollectionRewriter<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Append every pending clone of `collection`. Returns the number of
    /// entries appended.
    pub fn rewrite(&mut self, graph: &ReferenceGraph, collection: CollectionId) -> Result<usize> {
        let record = graph.collection(collection);
        if record.pending_count() == 0 {
            debug!(collection = %record.editor_id, "Nothing to add");
            return Ok(0);
        }

        let long_name = self.store.long_name(record.handle)?;
        info!("Adding new members to {}", long_name);

        let mut appended = 0;
        for ledger in record.ledgers.values() {
            match record.kind {
                CollectionKind::Leveled => {
                    for metadata in &ledger.entries {
                        for clone in &ledger.pending {
                            let entry = LeveledEntry::new(*clone, metadata.clone());
                            self.store.append_leveled_entry(record.handle, &entry)?;
                            appended += 1;
                        }
                    }
                }
                CollectionKind::Plain => {
                    for clone in &ledger.pending {
                        self.store.append_form_list_member(record.handle, *clone)?;
                        appended += 1;
                    }
                }
            }
        }

        debug!(collection = %record.editor_id, appended, "Rewrote collection");
        Ok(appended)
    }
}

// ============================================================================
// Tests
// ============================================================================
