//! Host Entity Store Boundary
//!
//! The engine never owns entity data. It reads and mutates records through
//! [`EntityStore`], which a host implements over its own record storage
//! (plugin files, a database, an editor session). All calls are synchronous
//! and the engine issues them in a fixed order, so a deterministic store
//! yields deterministic output.
//!
//! Field mapping used by the reference host:
//!
//! | Concept                  | Host field                         |
//! |--------------------------|------------------------------------|
//! | membership list          | `Leveled List Entries` / `FormIDs` |
//! | level / count / chance   | `LVLO\Level`, `Count`, `Chance None` |
//! | ownership block          | `COED` (`Owner`, `Item Condition`, ...) |
//! | template-bound marker    | `TPLT`                             |
//! | display name             | `FULL`                             |

use serde::{Deserialize, Serialize};

use super::errors::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Handles and Kinds
// ============================================================================

/// Opaque reference to one version of an entity in the host store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Entity kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A character record; templates, base forms and clones are all characters.
    Character,
    /// A collection whose entries carry per-entry metadata.
    LeveledList,
    /// A collection of bare references.
    FormList,
    /// Anything else the host stores.
    Other,
}

impl EntityKind {
    /// Four-character record signature used in long names.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Character => "NPC_",
            Self::LeveledList => "LVLN",
            Self::FormList => "FLST",
            Self::Other => "????",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.signature())
    }
}

/// Which entities an enumeration returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityScope {
    /// Every entity of the kind, original versions only.
    #[default]
    All,
    /// Only entities created in the output data set.
    NewInOutput,
}

// ============================================================================
// Membership Metadata
// ============================================================================

/// Optional ownership/condition block attached to a membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ownership {
    pub owner: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_rank: Option<String>,
}

impl Ownership {
    pub fn new(owner: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            condition: condition.into(),
            global_variable: None,
            required_rank: None,
        }
    }

    pub fn with_global_variable(mut self, global: impl Into<String>) -> Self {
        self.global_variable = Some(global.into());
        self
    }

    pub fn with_required_rank(mut self, rank: impl Into<String>) -> Self {
        self.required_rank = Some(rank.into());
        self
    }
}

/// Per-entry data of one template's presence in a leveled collection.
///
/// Recorded once from the original entry and copied verbatim onto every
/// entry created for that template's clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipMetadata {
    pub level: i32,
    pub count: i32,
    /// Percentage chance that the entry yields nothing.
    pub chance_none: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
}

impl MembershipMetadata {
    pub fn new(level: i32, count: i32, chance_none: i32) -> Self {
        Self {
            level,
            count,
            chance_none,
            ownership: None,
        }
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = Some(ownership);
        self
    }
}

/// One entry of a leveled collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledEntry {
    pub reference: EntityHandle,
    pub metadata: MembershipMetadata,
}

impl LeveledEntry {
    pub fn new(reference: EntityHandle, metadata: MembershipMetadata) -> Self {
        Self {
            reference,
            metadata,
        }
    }
}

// ============================================================================
// Store Trait
// ============================================================================

/// Synchronous access to the host's entity storage.
#[cfg_attr(test, mockall::automock)]
pub trait EntityStore {
    /// Enumerate entities of `kind` in declaration order.
    fn entities(&self, kind: EntityKind, scope: EntityScope) -> Vec<EntityHandle>;

    /// Resolve `entity` to the version that wins override resolution.
    fn winning_override(&self, entity: EntityHandle) -> StoreResult<EntityHandle>;

    fn editor_id(&self, entity: EntityHandle) -> StoreResult<String>;

    /// Human-readable label for log lines.
    fn long_name(&self, entity: EntityHandle) -> StoreResult<String>;

    fn kind(&self, entity: EntityHandle) -> StoreResult<EntityKind>;

    fn is_female(&self, entity: EntityHandle) -> StoreResult<bool>;

    /// Whether the entity carries the marker that makes it a duplicable template.
    fn is_template_bound(&self, entity: EntityHandle) -> StoreResult<bool>;

    fn display_name(&self, entity: EntityHandle) -> StoreResult<Option<String>>;

    /// Entries of a leveled collection, or `None` when it has no entry list.
    fn leveled_entries(&self, list: EntityHandle) -> StoreResult<Option<Vec<LeveledEntry>>>;

    /// Members of a plain collection, or `None` when it has no member list.
    fn form_list_members(&self, list: EntityHandle) -> StoreResult<Option<Vec<EntityHandle>>>;

    /// Copy `entity` into the output data set as a new entity named `editor_id`.
    fn copy_as_new(&mut self, entity: EntityHandle, editor_id: &str) -> StoreResult<EntityHandle>;

    fn set_display_name(&mut self, entity: EntityHandle, name: &str) -> StoreResult<()>;

    /// Append one entry to a leveled collection.
    fn append_leveled_entry(&mut self, list: EntityHandle, entry: &LeveledEntry)
        -> StoreResult<()>;

    /// Append one bare reference to a plain collection.
    fn append_form_list_member(
        &mut self,
        list: EntityHandle,
        member: EntityHandle,
    ) -> StoreResult<()>;
}

// ============================================================================
// Tests
// ============================================================================
