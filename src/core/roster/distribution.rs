//! Distribution Targets
//!
//! The distribution table names the collections to grow and the population
//! each should reach. It comes either as tabular text
//! (`EditorID,Count[,Rename]`) or as a direct identifier-to-setting mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::errors::RosterError;
use super::tabular::{TableRow, TargetRow};

/// One collection to grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionTarget {
    /// Identifier of the collection.
    pub editor_id: String,
    /// Desired total population after duplication.
    pub count: u32,
    /// Whether members and clones of this collection get generated names.
    pub rename: bool,
}

impl DistributionTarget {
    pub fn new(editor_id: impl Into<String>, count: u32) -> Self {
        Self {
            editor_id: editor_id.into(),
            count,
            rename: false,
        }
    }

    /// Request generated names for this collection.
    pub fn with_rename(mut self, rename: bool) -> Self {
        self.rename = rename;
        self
    }
}

/// Mapping-shaped target setting, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSetting {
    pub count: u32,
    #[serde(default)]
    pub rename: bool,
}

/// Ordered list of targets plus the rows that had to be skipped.
#[derive(Debug, Default)]
pub struct DistributionTable {
    targets: Vec<DistributionTarget>,
    rejected: Vec<RosterError>,
}

impl DistributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tabular text. Unusable rows are kept as recoverable errors.
    pub fn from_csv(text: &str) -> Self {
        let mut table = Self::new();
        table.extend_csv(text);
        table
    }

    /// Build from a direct mapping, preserving its order.
    pub fn from_mapping(mapping: &IndexMap<String, TargetSetting>) -> Self {
        let mut table = Self::new();
        table.extend_mapping(mapping);
        table
    }

    /// Append the rows of tabular text.
    pub fn extend_csv(&mut self, text: &str) {
        let (_, rows) = TargetRow::parse_all(text);
        for row in rows {
            match validate_row(&row) {
                Ok(target) => self.targets.push(target),
                Err(err) => self.rejected.push(err),
            }
        }
    }

    /// Append the entries of a mapping. A zero count is rejected.
    pub fn extend_mapping(&mut self, mapping: &IndexMap<String, TargetSetting>) {
        let offset = self.targets.len() + self.rejected.len();
        for (position, (editor_id, setting)) in mapping.iter().enumerate() {
            if editor_id.trim().is_empty() {
                self.rejected.push(RosterError::invalid_target_row(
                    offset + position + 1,
                    "EditorID is empty",
                ));
                continue;
            }
            if setting.count == 0 {
                self.rejected.push(RosterError::invalid_target_row(
                    offset + position + 1,
                    format!("Count for '{}' must be positive", editor_id),
                ));
                continue;
            }
            self.targets.push(
                DistributionTarget::new(editor_id.trim(), setting.count)
                    .with_rename(setting.rename),
            );
        }
    }

    /// Append one target.
    pub fn push(&mut self, target: DistributionTarget) {
        self.targets.push(target);
    }

    pub fn targets(&self) -> &[DistributionTarget] {
        &self.targets
    }

    /// Rows that could not be turned into targets.
    pub fn rejected(&self) -> &[RosterError] {
        &self.rejected
    }

    /// Hand back the rejected rows, leaving none behind.
    pub fn take_rejected(&mut self) -> Vec<RosterError> {
        std::mem::take(&mut self.rejected)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn validate_row(row: &TargetRow) -> Result<DistributionTarget, RosterError> {
    let editor_id = row
        .editor_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RosterError::invalid_target_row(row.row, "EditorID is empty"))?;

    let raw_count = row.count.as_deref().map(str::trim).unwrap_or("");
    let count = match raw_count.parse::<u32>() {
        Ok(count) if count > 0 => count,
        _ => {
            return Err(RosterError::invalid_target_row(
                row.row,
                format!(
                    "Count '{}' for '{}' is not a positive integer",
                    raw_count, editor_id
                ),
            ))
        }
    };

    let rename = row
        .rename
        .as_deref()
        .map(|flag| flag.trim().eq_ignore_ascii_case("y"))
        .unwrap_or(false);

    Ok(DistributionTarget::new(editor_id, count).with_rename(rename))
}

// ============================================================================
// Tests
// ============================================================================
