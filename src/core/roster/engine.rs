//! Duplication Engine
//!
//! Runs one roster expansion against a host store. Phases run strictly in
//! order:
//!
//! 1. Build the reference graph from the distribution targets.
//! 2. Clone templates for each multiply collection, in target order.
//! 3. Name every entity in the rename queue.
//! 4. Append pending clones to every affected collection.
//!
//! Names are drawn before any collection is rewritten, and nothing touches
//! the store before the name tables have been validated.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::cloner::BalancedCloner;
use super::distribution::DistributionTable;
use super::errors::{Result, RosterError};
use super::graph::{ReferenceGraph, ReferenceGraphBuilder};
use super::names::{
    Gender, NameGenerator, DEFAULT_FAMILY_NAMES, DEFAULT_FEMALE_NAMES, DEFAULT_MALE_NAMES,
};
use super::rewriter::CollectionRewriter;
use super::store::EntityStore;
use super::weighted::NameTableCache;
use crate::config::EngineConfig;

// ============================================================================
// Run Report
// ============================================================================

/// Outcome of one run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Clone identifiers per template identifier, in creation order.
    pub clones: IndexMap<String, Vec<String>>,
    /// Collections that were grown toward a target.
    pub multiplied: Vec<String>,
    /// Collections that received new entries.
    pub modified: Vec<String>,
    pub entries_appended: usize,
    pub renamed: usize,
    /// Recoverable problems; the run continued past each.
    #[serde(skip)]
    pub warnings: Vec<RosterError>,
    /// Broken invariants; the affected entity was left as it was.
    #[serde(skip)]
    pub defects: Vec<RosterError>,
}

impl RunReport {
    /// Number of clones per template, in template discovery order.
    pub fn clone_counts(&self) -> Vec<(&str, usize)> {
        self.clones
            .iter()
            .map(|(template, clones)| (template.as_str(), clones.len()))
            .collect()
    }

    pub fn total_clones(&self) -> usize {
        self.clones.values().map(Vec::len).sum()
    }

    pub fn has_defects(&self) -> bool {
        !self.defects.is_empty()
    }

    /// Serialize the counts and identifiers for the host to persist.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Validated configuration plus loaded name tables.
#[derive(Debug)]
pub struct DuplicationEngine {
    config: EngineConfig,
    names: NameGenerator,
    cache: NameTableCache,
}

impl DuplicationEngine {
    /// Validate `config` and build its name tables.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_cache(config, NameTableCache::new())
    }

    /// Like [`new`](Self::new), reusing tables already in `cache`.
    pub fn with_cache(config: EngineConfig, mut cache: NameTableCache) -> Result<Self> {
        config.validate()?;
        let names = NameGenerator::from_texts(
            &mut cache,
            config.names.male.as_deref().unwrap_or(DEFAULT_MALE_NAMES),
            config.names.female.as_deref().unwrap_or(DEFAULT_FEMALE_NAMES),
            config.names.family.as_deref().unwrap_or(DEFAULT_FAMILY_NAMES),
        )?;
        Ok(Self {
            config,
            names,
            cache,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn names(&self) -> &NameGenerator {
        &self.names
    }

    /// Hand the table cache back for reuse by another engine.
    pub fn into_cache(self) -> NameTableCache {
        self.cache
    }

    /// Run with the distribution table from the configuration.
    pub fn run_configured<S: EntityStore + ?Sized>(&self, store: &mut S) -> Result<RunReport> {
        let table = self.config.distribution_table();
        self.run(store, table)
    }

    /// Run against `store` for the given targets.
    pub fn run<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        mut table: DistributionTable,
    ) -> Result<RunReport> {
        let mut report = RunReport::default();
        for rejected in table.take_rejected() {
            warn!("{}", rejected);
            report.warnings.push(rejected);
        }

        info!(targets = table.targets().len(), seed = self.config.seed, "Starting roster expansion");
        let mut graph = ReferenceGraphBuilder::new(&*store).build(table.targets())?;
        report.warnings.extend(graph.take_warnings());

        self.multiply(store, &mut graph, &mut report)?;
        self.rename(store, &graph, &mut report)?;
        self.rewrite(store, &graph, &mut report)?;

        for template in graph.templates() {
            if template.clones.is_empty() {
                continue;
            }
            let ids = template
                .clones
                .iter()
                .map(|clone| store.editor_id(*clone))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            report.clones.insert(template.editor_id.clone(), ids);
        }

        info!(
            clones = report.total_clones(),
            entries = report.entries_appended,
            renamed = report.renamed,
            warnings = report.warnings.len(),
            defects = report.defects.len(),
            "Roster expansion finished"
        );
        Ok(report)
    }

    fn multiply<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &mut ReferenceGraph,
        report: &mut RunReport,
    ) -> Result<()> {
        let targets = graph.to_multiply().to_vec();
        let mut cloner = BalancedCloner::new(store)
            .with_suffix(self.config.clone_suffix.trim())
            .with_progress_interval(self.config.progress_interval());

        for collection in targets {
            info!("Duplicating templates of {}", graph.collection(collection).editor_id);
            cloner.multiply(graph, collection)?;
            report.multiplied.push(graph.collection(collection).editor_id.clone());
        }
        Ok(())
    }

    fn rename<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &ReferenceGraph,
        report: &mut RunReport,
    ) -> Result<()> {
        if graph.rename_queue_len() == 0 {
            return Ok(());
        }
        info!("Renaming {} entities", graph.rename_queue_len());

        for entity in graph.rename_queue() {
            let editor_id = store.editor_id(entity)?;
            let gender = Gender::from_is_female(store.is_female(entity)?);
            match self.names.generate(&editor_id, gender, self.config.seed) {
                Ok(name) => {
                    store.set_display_name(entity, &name)?;
                    let long_name = store.long_name(entity)?;
                    debug!("Renaming {}", long_name);
                    report.renamed += 1;
                }
                Err(err) if err.is_defect() => {
                    error!(entity = %editor_id, "{}", err);
                    report.defects.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn rewrite<S: EntityStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &ReferenceGraph,
        report: &mut RunReport,
    ) -> Result<()> {
        let mut rewriter = CollectionRewriter::new(store);
        for collection in graph.to_modify() {
            let appended = rewriter.rewrite(graph, collection)?;
            if appended > 0 {
                report.entries_appended += appended;
                report.modified.push(graph.collection(collection).editor_id.clone());
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
