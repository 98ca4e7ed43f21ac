//! Weighted Name Tables
//!
//! A [`WeightedTable`] attaches a running cumulative weight to each parsed
//! row so a single uniform draw in `[0, total_weight)` selects a row with
//! probability proportional to its weight.
//!
//! Tables are built once per distinct input text and shared through a
//! [`NameTableCache`] keyed by a SHA-256 digest of that text.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::errors::{Result, RosterError};
use super::random::SeededRandomStream;
use super::tabular::{NameRow, TableRow};

// ============================================================================
// Weighted Table
// ============================================================================

/// A row with its effective and cumulative weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedRow {
    pub name: String,
    /// Effective weight (missing or zero weights count as 1).
    pub weight: u32,
    /// Sum of the effective weights of this row and every row before it.
    pub cumulative_weight: u32,
}

/// Rows in parse order with cumulative weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTable {
    label: String,
    rows: Vec<WeightedRow>,
    total_weight: u32,
}

impl WeightedTable {
    /// Build a table from `Name,Weight` text.
    pub fn parse(label: impl Into<String>, text: &str) -> Result<Self> {
        let label = label.into();
        let (table, rows) = NameRow::parse_all(text);
        if !table.has_column("Name") {
            return Err(RosterError::missing_column(label, "Name"));
        }
        Self::build(label, &rows)
    }

    /// Build a table from already-parsed rows.
    pub fn build(label: impl Into<String>, rows: &[NameRow]) -> Result<Self> {
        let label = label.into();
        if rows.is_empty() {
            return Err(RosterError::EmptyNameTable { table: label });
        }

        let mut weighted = Vec::with_capacity(rows.len());
        let mut total: u32 = 0;
        for row in rows {
            let name = row.name.clone().unwrap_or_default();
            let weight = effective_weight(&label, &name, row.weight.as_deref())?;
            total = total.checked_add(weight).ok_or_else(|| RosterError::WeightOverflow {
                table: label.clone(),
                limit: u32::MAX,
            })?;
            weighted.push(WeightedRow {
                name,
                weight,
                cumulative_weight: total,
            });
        }

        Ok(Self {
            label,
            rows: weighted,
            total_weight: total,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rows(&self) -> &[WeightedRow] {
        &self.rows
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Return the first row whose cumulative weight exceeds `draw`.
    ///
    /// A draw outside `[0, total_weight)` matches nothing and is reported as
    /// [`RosterError::SamplingMiss`].
    pub fn sample(&self, draw: u32) -> Result<&WeightedRow> {
        self.rows
            .iter()
            .find(|row| draw < row.cumulative_weight)
            .ok_or_else(|| RosterError::sampling_miss(&self.label, draw, self.total_weight))
    }

    /// Draw once from `stream` and sample the table with it.
    pub fn sample_with(&self, stream: &mut SeededRandomStream) -> Result<&WeightedRow> {
        let draw = stream.next_below(self.total_weight);
        self.sample(draw)
    }
}

fn effective_weight(table: &str, name: &str, raw: Option<&str>) -> Result<u32> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(1);
    }
    match raw.parse::<u32>() {
        Ok(0) => Ok(1),
        Ok(weight) => Ok(weight),
        Err(_) => Err(RosterError::invalid_weight(table, name, raw)),
    }
}

// ============================================================================
// Table Cache
// ============================================================================

/// Cache of built tables keyed by the digest of their source text.
///
/// Owned by the engine for the duration of a run; identical texts loaded
/// under different labels share one table.
#[derive(Debug, Default)]
pub struct NameTableCache {
    tables: HashMap<String, Arc<WeightedTable>>,
}

impl NameTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the table for `text`, building it on first use.
    pub fn load(&mut self, label: &str, text: &str) -> Result<Arc<WeightedTable>> {
        let key = content_key(text);
        if let Some(table) = self.tables.get(&key) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(WeightedTable::parse(label, text)?);
        tracing::debug!(
            table = label,
            rows = table.rows().len(),
            total_weight = table.total_weight(),
            "Built name table"
        );
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of distinct tables built so far.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Hex SHA-256 of the raw table text.
fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Tests
// ============================================================================
