//! Display Name Generation
//!
//! Names are composed as `"{given} {family}"`. The given name comes from the
//! table matching the entity's gender and the family name from a shared
//! table. Both draws come from one [`SeededRandomStream`] created for the
//! entity, given name first, so a name depends only on
//! `(entity_id, seed, tables)`.
//!
//! # Architecture
//!
//! ```text
//! NameGenerator
//!   +-- male: WeightedTable      (given names)
//!   +-- female: WeightedTable    (given names)
//!   +-- family: WeightedTable    (family names)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::Result;
use super::random::SeededRandomStream;
use super::weighted::{NameTableCache, WeightedTable};

/// Bundled given-name table for male characters.
pub const DEFAULT_MALE_NAMES: &str = include_str!("../../../data/names/male.csv");

/// Bundled given-name table for female characters.
pub const DEFAULT_FEMALE_NAMES: &str = include_str!("../../../data/names/female.csv");

/// Bundled family-name table.
pub const DEFAULT_FAMILY_NAMES: &str = include_str!("../../../data/names/family.csv");

// ============================================================================
// Gender
// ============================================================================

/// Which given-name table applies to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Map the host's "is female" flag.
    pub fn from_is_female(is_female: bool) -> Self {
        if is_female {
            Self::Female
        } else {
            Self::Male
        }
    }
}

// ============================================================================
// Name Generator
// ============================================================================

/// Draws full display names from weighted tables.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    male: Arc<WeightedTable>,
    female: Arc<WeightedTable>,
    family: Arc<WeightedTable>,
}

impl NameGenerator {
    /// Create a generator from built tables.
    pub fn new(
        male: Arc<WeightedTable>,
        female: Arc<WeightedTable>,
        family: Arc<WeightedTable>,
    ) -> Self {
        Self {
            male,
            female,
            family,
        }
    }

    /// Build the three tables from text through `cache`.
    pub fn from_texts(
        cache: &mut NameTableCache,
        male: &str,
        female: &str,
        family: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            cache.load("male", male)?,
            cache.load("female", female)?,
            cache.load("family", family)?,
        ))
    }

    /// Generator over the bundled tables.
    pub fn with_default_tables(cache: &mut NameTableCache) -> Result<Self> {
        Self::from_texts(
            cache,
            DEFAULT_MALE_NAMES,
            DEFAULT_FEMALE_NAMES,
            DEFAULT_FAMILY_NAMES,
        )
    }

    /// Given-name table for `gender`.
    pub fn given_names(&self, gender: Gender) -> &WeightedTable {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    pub fn family_names(&self) -> &WeightedTable {
        &self.family
    }

    /// Generate the full name for one entity.
    pub fn generate(&self, entity_id: &str, gender: Gender, seed: u32) -> Result<String> {
        let mut stream = SeededRandomStream::new(entity_id, seed);
        let given = self.given_names(gender).sample_with(&mut stream)?;
        let family = self.family.sample_with(&mut stream)?;
        Ok(format!("{} {}", given.name, family.name))
    }
}

// ============================================================================
// Tests
// ============================================================================
