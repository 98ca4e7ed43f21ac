//! In-Memory Entity Store
//!
//! A self-contained [`EntityStore`] backed by a `Vec` of records. Handles are
//! positions in that vector. Overrides are separate records linked to the
//! record they override; the newest override wins.
//!
//! Used for tests and for hosts that load their data up front.

use super::errors::StoreError;
use super::names::Gender;
use super::store::{EntityHandle, EntityKind, EntityScope, EntityStore, LeveledEntry, StoreResult};

#[derive(Debug, Clone)]
struct StoredEntity {
    editor_id: String,
    kind: EntityKind,
    display_name: Option<String>,
    female: bool,
    template_bound: bool,
    entries: Option<Vec<LeveledEntry>>,
    members: Option<Vec<EntityHandle>>,
    new_in_output: bool,
    /// Record this one overrides.
    overrides: Option<EntityHandle>,
    /// Newest override of this record.
    winner: Option<EntityHandle>,
}

impl StoredEntity {
    fn new(editor_id: &str, kind: EntityKind) -> Self {
        Self {
            editor_id: editor_id.to_string(),
            kind,
            display_name: None,
            female: false,
            template_bound: false,
            entries: None,
            members: None,
            new_in_output: false,
            overrides: None,
            winner: None,
        }
    }
}

/// Vector-backed entity store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entities: Vec<StoredEntity>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Number of records, overrides included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    fn push(&mut self, entity: StoredEntity) -> EntityHandle {
        self.entities.push(entity);
        EntityHandle((self.entities.len() - 1) as u64)
    }

    /// Add a template-bound character.
    pub fn add_character(&mut self, editor_id: &str, gender: Gender) -> EntityHandle {
        let mut entity = StoredEntity::new(editor_id, EntityKind::Character);
        entity.female = gender == Gender::Female;
        entity.template_bound = true;
        self.push(entity)
    }

    /// Add a character without the template marker.
    pub fn add_base_character(&mut self, editor_id: &str, gender: Gender) -> EntityHandle {
        let mut entity = StoredEntity::new(editor_id, EntityKind::Character);
        entity.female = gender == Gender::Female;
        self.push(entity)
    }

    /// Add a leveled collection with the given entries.
    pub fn add_leveled_list(&mut self, editor_id: &str, entries: Vec<LeveledEntry>) -> EntityHandle {
        let mut entity = StoredEntity::new(editor_id, EntityKind::LeveledList);
        entity.entries = Some(entries);
        self.push(entity)
    }

    /// Add a leveled collection that has no entry list at all.
    pub fn add_leveled_list_without_entries(&mut self, editor_id: &str) -> EntityHandle {
        self.push(StoredEntity::new(editor_id, EntityKind::LeveledList))
    }

    /// Add a plain collection with the given members.
    pub fn add_form_list(&mut self, editor_id: &str, members: Vec<EntityHandle>) -> EntityHandle {
        let mut entity = StoredEntity::new(editor_id, EntityKind::FormList);
        entity.members = Some(members);
        self.push(entity)
    }

    /// Add a record of a kind the engine ignores.
    pub fn add_other(&mut self, editor_id: &str) -> EntityHandle {
        self.push(StoredEntity::new(editor_id, EntityKind::Other))
    }

    /// Override a leveled collection with a new entry list.
    pub fn override_leveled_entries(
        &mut self,
        original: EntityHandle,
        entries: Vec<LeveledEntry>,
    ) -> StoreResult<EntityHandle> {
        let handle = self.push_override(original)?;
        self.get_mut(handle)?.entries = Some(entries);
        Ok(handle)
    }

    /// Override a character, changing its template marker.
    pub fn override_template_bound(
        &mut self,
        original: EntityHandle,
        template_bound: bool,
    ) -> StoreResult<EntityHandle> {
        let handle = self.push_override(original)?;
        self.get_mut(handle)?.template_bound = template_bound;
        Ok(handle)
    }

    fn push_override(&mut self, original: EntityHandle) -> StoreResult<EntityHandle> {
        let root = self.root_of(original)?;
        let winner = self.winning_override(root)?;

        let mut copy = self.get(winner)?.clone();
        copy.overrides = Some(root);
        copy.winner = None;
        let handle = self.push(copy);

        self.get_mut(root)?.winner = Some(handle);
        Ok(handle)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// First original record with this identifier.
    pub fn find(&self, editor_id: &str) -> Option<EntityHandle> {
        self.entities
            .iter()
            .position(|e| e.overrides.is_none() && e.editor_id == editor_id)
            .map(|index| EntityHandle(index as u64))
    }

    fn get(&self, handle: EntityHandle) -> StoreResult<&StoredEntity> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.entities.get(index))
            .ok_or_else(|| StoreError::unknown_entity(handle.0))
    }

    fn get_mut(&mut self, handle: EntityHandle) -> StoreResult<&mut StoredEntity> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.entities.get_mut(index))
            .ok_or_else(|| StoreError::unknown_entity(handle.0))
    }

    fn root_of(&self, handle: EntityHandle) -> StoreResult<EntityHandle> {
        Ok(self.get(handle)?.overrides.unwrap_or(handle))
    }

    fn get_kind_mut(
        &mut self,
        handle: EntityHandle,
        expected: EntityKind,
    ) -> StoreResult<&mut StoredEntity> {
        let entity = self.get_mut(handle)?;
        if entity.kind != expected {
            return Err(StoreError::wrong_kind(
                entity.editor_id.clone(),
                expected.signature(),
                entity.kind.signature(),
            ));
        }
        Ok(entity)
    }
}

impl EntityStore for InMemoryStore {
    fn entities(&self, kind: EntityKind, scope: EntityScope) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.overrides.is_none() && e.kind == kind)
            .filter(|(_, e)| scope == EntityScope::All || e.new_in_output)
            .map(|(index, _)| EntityHandle(index as u64))
            .collect()
    }

    fn winning_override(&self, entity: EntityHandle) -> StoreResult<EntityHandle> {
        let root = self.root_of(entity)?;
        Ok(self.get(root)?.winner.unwrap_or(root))
    }

    fn editor_id(&self, entity: EntityHandle) -> StoreResult<String> {
        Ok(self.get(entity)?.editor_id.clone())
    }

    fn long_name(&self, entity: EntityHandle) -> StoreResult<String> {
        let stored = self.get(entity)?;
        Ok(match &stored.display_name {
            Some(name) => format!(
                "{} \"{}\" [{}:{}]",
                stored.editor_id,
                name,
                stored.kind.signature(),
                entity
            ),
            None => format!("{} [{}:{}]", stored.editor_id, stored.kind.signature(), entity),
        })
    }

    fn kind(&self, entity: EntityHandle) -> StoreResult<EntityKind> {
        Ok(self.get(entity)?.kind)
    }

    fn is_female(&self, entity: EntityHandle) -> StoreResult<bool> {
        Ok(self.get(entity)?.female)
    }

    fn is_template_bound(&self, entity: EntityHandle) -> StoreResult<bool> {
        Ok(self.get(entity)?.template_bound)
    }

    fn display_name(&self, entity: EntityHandle) -> StoreResult<Option<String>> {
        Ok(self.get(entity)?.display_name.clone())
    }

    fn leveled_entries(&self, list: EntityHandle) -> StoreResult<Option<Vec<LeveledEntry>>> {
        Ok(self.get(list)?.entries.clone())
    }

    fn form_list_members(&self, list: EntityHandle) -> StoreResult<Option<Vec<EntityHandle>>> {
        Ok(self.get(list)?.members.clone())
    }

    fn copy_as_new(&mut self, entity: EntityHandle, editor_id: &str) -> StoreResult<EntityHandle> {
        if self.entities.iter().any(|e| e.editor_id == editor_id) {
            return Err(StoreError::DuplicateIdentifier {
                editor_id: editor_id.to_string(),
            });
        }

        let mut copy = self.get(entity)?.clone();
        copy.editor_id = editor_id.to_string();
        copy.new_in_output = true;
        copy.overrides = None;
        copy.winner = None;
        Ok(self.push(copy))
    }

    fn set_display_name(&mut self, entity: EntityHandle, name: &str) -> StoreResult<()> {
        self.get_mut(entity)?.display_name = Some(name.to_string());
        Ok(())
    }

    fn append_leveled_entry(&mut self, list: EntityHandle, entry: &LeveledEntry) -> StoreResult<()> {
        self.get_kind_mut(list, EntityKind::LeveledList)?
            .entries
            .get_or_insert_with(Vec::new)
            .push(entry.clone());
        Ok(())
    }

    fn append_form_list_member(
        &mut self,
        list: EntityHandle,
        member: EntityHandle,
    ) -> StoreResult<()> {
        self.get_kind_mut(list, EntityKind::FormList)?
            .members
            .get_or_insert_with(Vec::new)
            .push(member);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
