//! Roster Expansion Error Types
//!
//! Defines the error taxonomy for table loading, name generation, graph
//! construction and host-store mutation. Uses thiserror with rich context
//! fields, mirroring the recoverable/fatal split the engine relies on.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Store Errors
// ============================================================================

/// Errors reported by an [`EntityStore`](super::store::EntityStore) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The handle does not name an entity in this store.
    #[error("Unknown entity handle #{handle}")]
    UnknownEntity { handle: u64 },

    /// The entity exists but is not of the kind the operation requires.
    #[error("Entity '{editor_id}' is a {actual}, expected {expected}")]
    WrongKind {
        editor_id: String,
        expected: String,
        actual: String,
    },

    /// An entity with this identifier already exists in the output.
    #[error("An entity named '{editor_id}' already exists in the output")]
    DuplicateIdentifier { editor_id: String },

    /// Host-specific failure.
    #[error("Store operation '{operation}' failed: {reason}")]
    OperationFailed { operation: String, reason: String },
}

impl StoreError {
    /// Create an UnknownEntity error.
    pub fn unknown_entity(handle: u64) -> Self {
        Self::UnknownEntity { handle }
    }

    /// Create a WrongKind error.
    pub fn wrong_kind(
        editor_id: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongKind {
            editor_id: editor_id.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an OperationFailed error.
    pub fn operation_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Roster Errors
// ============================================================================

/// Errors that can occur while expanding a roster.
#[derive(Error, Debug)]
pub enum RosterError {
    /// A configured collection identifier matches no discovered collection.
    #[error("Couldn't find a collection named '{editor_id}'")]
    CollectionNotFound { editor_id: String },

    /// A targeted collection references no duplicable template.
    #[error("No templates found to duplicate in '{editor_id}', skipping it")]
    EmptyTemplateSet { editor_id: String },

    /// A distribution row could not be used.
    #[error("Invalid distribution row {row}: {reason}")]
    InvalidTargetRow { row: usize, reason: String },

    /// A table is missing a column it cannot work without.
    #[error("Table '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: String },

    /// A weight cell is neither empty nor a non-negative integer.
    #[error("Invalid weight '{value}' for '{name}' in table '{table}': expected a whole number, empty or 0 for 1")]
    InvalidWeight {
        table: String,
        name: String,
        value: String,
    },

    /// The summed weights of a table do not fit the draw range.
    #[error("Total weight of table '{table}' exceeds {limit}")]
    WeightOverflow { table: String, limit: u32 },

    /// A name table has no data rows.
    #[error("Name table '{table}' has no rows")]
    EmptyNameTable { table: String },

    /// A draw fell outside every cumulative-weight interval.
    ///
    /// This cannot happen for a well-formed table and an in-range draw; seeing
    /// it means the table or the stream is broken.
    #[error("Sampling miss in table '{table}': draw {draw} with total weight {total_weight}")]
    SamplingMiss {
        table: String,
        draw: u32,
        total_weight: u32,
    },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Failed to parse a configuration file.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to read a file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RosterError {
    /// Create a CollectionNotFound error.
    pub fn collection_not_found(editor_id: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            editor_id: editor_id.into(),
        }
    }

    /// Create an EmptyTemplateSet error.
    pub fn empty_template_set(editor_id: impl Into<String>) -> Self {
        Self::EmptyTemplateSet {
            editor_id: editor_id.into(),
        }
    }

    /// Create an InvalidTargetRow error.
    pub fn invalid_target_row(row: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTargetRow {
            row,
            reason: reason.into(),
        }
    }

    /// Create a MissingColumn error.
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create an InvalidWeight error.
    pub fn invalid_weight(
        table: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidWeight {
            table: table.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a SamplingMiss error.
    pub fn sampling_miss(table: impl Into<String>, draw: u32, total_weight: u32) -> Self {
        Self::SamplingMiss {
            table: table.into(),
            draw,
            total_weight,
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an Io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is scoped to one row or collection (log and continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CollectionNotFound { .. }
                | Self::EmptyTemplateSet { .. }
                | Self::InvalidTargetRow { .. }
        )
    }

    /// Check if this error indicates a broken invariant rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::SamplingMiss { .. })
    }
}

/// Type alias for Result with RosterError.
pub type Result<T> = std::result::Result<T, RosterError>;

// ============================================================================
// Tests
// ============================================================================
