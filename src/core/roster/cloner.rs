//! Balanced Cloning
//!
//! Grows a targeted collection to its desired population by cloning its
//! templates round-robin, always cloning templates with the fewest existing
//! clones first. Clone counts are shared across collections, so a template
//! already cloned for an earlier target is passed over until the others
//! catch up.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::errors::Result;
use super::graph::{CollectionId, ReferenceGraph, TemplateId};
use super::store::{EntityHandle, EntityStore};

/// Default clone identifier infix: `<template>_acot<n>`.
pub const DEFAULT_CLONE_SUFFIX: &str = "acot";

/// Build the identifier of the `index`-th clone of `template_id`.
pub fn clone_editor_id(template_id: &str, suffix: &str, index: usize) -> String {
    format!("{}_{}{}", template_id, suffix, index)
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Emits an info line at most once per interval.
#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    last_report: Instant,
    reports: usize,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: Instant::now(),
            reports: 0,
        }
    }

    /// Restart the cadence for a new collection.
    pub fn reset(&mut self) {
        self.last_report = Instant::now();
    }

    /// Report progress if the interval has elapsed. Returns whether it did.
    pub fn record(&mut self, collection: &str, current: u32, target: u32) -> bool {
        self.record_at(Instant::now(), collection, current, target)
    }

    fn record_at(&mut self, now: Instant, collection: &str, current: u32, target: u32) -> bool {
        if now.saturating_duration_since(self.last_report) < self.interval {
            return false;
        }
        info!("{}: {}/{} entries", collection, current, target);
        self.last_report = now;
        self.reports += 1;
        true
    }

    /// Number of lines emitted so far.
    pub fn reports(&self) -> usize {
        self.reports
    }
}

// ============================================================================
// Balanced Cloner
// ============================================================================

/// Creates clones through a store and records them in a graph.
pub struct BalancedCloner<'a, S: EntityStore + ?Sized> {
    store: &'a mut S,
    suffix: String,
    progress: ProgressReporter,
}

impl<'a, S: EntityStore + ?Sized> BalancedCloner<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            suffix: DEFAULT_CLONE_SUFFIX.to_string(),
            progress: ProgressReporter::new(Duration::from_secs(5)),
        }
    }

    /// Set the clone identifier infix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set how often progress lines are emitted.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress = ProgressReporter::new(interval);
        self
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Clone templates of `collection` until its population reaches the target.
    ///
    /// Returns the clones created, in creation order. A collection already at
    /// or above its target gets none.
    pub fn multiply(
        &mut self,
        graph: &mut ReferenceGraph,
        collection: CollectionId,
    ) -> Result<Vec<EntityHandle>> {
        let record = graph.collection(collection);
        let templates: Vec<TemplateId> = record.templates.iter().copied().collect();
        let target = record.target_count.unwrap_or(record.current_count);
        let rename = record.rename;
        let label = record.editor_id.clone();

        let mut created = Vec::new();
        let Some(&first) = templates.first() else {
            return Ok(created);
        };
        if record.current_count >= target {
            debug!(collection = %label, current = record.current_count, target, "Already at target");
            return Ok(created);
        }

        info!(
            "Multiplying {}: {} templates, {} -> {}",
            label,
            templates.len(),
            record.current_count,
            target
        );
        self.progress.reset();

        let mut least_clones = 0usize;
        let mut next_least = graph.template(first).clones.len();

        'fill: while graph.collection(collection).current_count < target {
            for &template in &templates {
                let mut clone_count = graph.template(template).clones.len();
                if clone_count == least_clones {
                    created.push(self.clone_template(graph, template, rename)?);
                    clone_count += 1;

                    let current = graph.collection(collection).current_count;
                    self.progress.record(&label, current, target);
                    if current >= target {
                        break 'fill;
                    }
                }
                if clone_count < next_least {
                    next_least = clone_count;
                }
            }
            least_clones = next_least;
            next_least += 1;
        }

        info!("{}: created {} clones", label, created.len());
        Ok(created)
    }

    fn clone_template(
        &mut self,
        graph: &mut ReferenceGraph,
        template: TemplateId,
        rename: bool,
    ) -> Result<EntityHandle> {
        let record = graph.template(template);
        let editor_id = clone_editor_id(&record.editor_id, &self.suffix, record.clones.len());
        let clone = self.store.copy_as_new(record.handle, &editor_id)?;
        graph.register_clone(template, clone, rename);
        let long_name = self.store.long_name(clone)?;
        debug!("Creating {}", long_name);
        Ok(clone)
    }
}

// ============================================================================
// Tests
// ============================================================================
