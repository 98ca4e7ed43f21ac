/// Cast of Thousands - roster expansion engine
///
/// Clones template characters until each targeted collection reaches its
/// population, spreads clones evenly across templates, propagates them to
/// every collection that referenced the originals, and names them from
/// weighted tables with per-entity seeded streams.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub use crate::config::EngineConfig;
pub use crate::core::logging::LoggingOptions;
pub use crate::core::roster::{
    DistributionTable, DistributionTarget, DuplicationEngine, EntityHandle, EntityKind,
    EntityScope, EntityStore, Gender, InMemoryStore, LeveledEntry, MembershipMetadata,
    NameGenerator, NameTableCache, Ownership, Result, RosterError, RunReport, StoreError,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
