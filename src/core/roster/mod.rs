//! Roster Expansion Engine
//!
//! Grows hand-authored character collections to a target population by
//! cloning their template characters, spreads the clones evenly across
//! templates, and writes every clone into each collection that referenced
//! its template. Clones (and optionally base characters) can be given
//! deterministic names drawn from weighted tables.
//!
//! # Architecture
//!
//! ```text
//!   DistributionTable          NameTableCache
//!   (EditorID,Count,Rename)    (Name,Weight tables)
//!           |                          |
//!           v                          v
//!   ReferenceGraphBuilder        NameGenerator
//!           |                    (SeededRandomStream)
//!           v                          |
//!    ReferenceGraph ---> BalancedCloner |
//!           |                          v
//!           +------------------> rename queue
//!           |
//!           v
//!   CollectionRewriter ---> EntityStore (host)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cast_of_thousands::{DuplicationEngine, EngineConfig, InMemoryStore};
//!
//! let engine = DuplicationEngine::new(EngineConfig::default())?;
//! let report = engine.run_configured(&mut store)?;
//! for (template, clones) in report.clone_counts() {
//!     println!("{template}: {clones}");
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`errors`]: Error taxonomy (recoverable, defect, fatal)
//! - [`tabular`]: Quote-aware tabular text parser
//! - [`distribution`]: Target counts per collection
//! - [`weighted`]: Cumulative-weight tables and their cache
//! - [`random`]: Per-entity seeded xorshift streams
//! - [`names`]: Display name generation
//! - [`store`]: Host store boundary
//! - [`memory_store`]: Vector-backed store
//! - [`graph`]: Template/collection reference graph
//! - [`cloner`]: Balanced round-robin cloning
//! - [`rewriter`]: Appending clones to collections
//! - [`engine`]: Whole-run orchestration

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cloner;
pub mod distribution;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod memory_store;
pub mod names;
pub mod random;
pub mod rewriter;
pub mod store;
pub mod tabular;
pub mod weighted;

// ============================================================================
// Re-exports: Error Types
// ============================================================================

pub use errors::{Result, RosterError, StoreError};

// ============================================================================
// Re-exports: Tables and Names
// ============================================================================

pub use distribution::{DistributionTable, DistributionTarget, TargetSetting};
pub use names::{
    Gender, NameGenerator, DEFAULT_FAMILY_NAMES, DEFAULT_FEMALE_NAMES, DEFAULT_MALE_NAMES,
};
pub use random::SeededRandomStream;
pub use tabular::{parse_rows, NameRow, Record, Table, TableRow, TargetRow};
pub use weighted::{NameTableCache, WeightedRow, WeightedTable};

// ============================================================================
// Re-exports: Store Boundary
// ============================================================================

pub use memory_store::InMemoryStore;
pub use store::{
    EntityHandle, EntityKind, EntityScope, EntityStore, LeveledEntry, MembershipMetadata,
    Ownership, StoreResult,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use cloner::{clone_editor_id, BalancedCloner, ProgressReporter, DEFAULT_CLONE_SUFFIX};
pub use engine::{DuplicationEngine, RunReport};
pub use graph::{
    CollectionId, CollectionKind, CollectionRecord, Disposition, MembershipLedger,
    ReferenceGraph, ReferenceGraphBuilder, TemplateId, TemplateRecord,
};
pub use rewriter::CollectionRewriter;
