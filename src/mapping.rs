//! Alignment-column <-> `auth_seq_id` position mappings.
//!
//! A [`PositionMapping`] is sparse: columns where the chain has a gap are
//! simply absent. [`PositionMapper`] pairs the forward table with its inverse
//! so both lookup directions cost one hash/tree probe.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

/// Sparse map from master alignment column (0-based) to `auth_seq_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMapping {
    columns: BTreeMap<usize, i32>,
}

impl PositionMapping {
    /// Empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `auth_seq_id` aligned to `column`, if the chain has a residue there.
    #[must_use]
    pub fn get(&self, column: usize) -> Option<i32> {
        self.columns.get(&column).copied()
    }

    /// Number of mapped columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `(column, auth_seq_id)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.columns.iter().map(|(&c, &a)| (c, a))
    }

    /// First and last mapped columns.
    #[must_use]
    pub fn column_span(&self) -> Option<(usize, usize)> {
        let first = self.columns.keys().next()?;
        let last = self.columns.keys().next_back()?;
        Some((*first, *last))
    }
}

impl FromIterator<(usize, i32)> for PositionMapping {
    fn from_iter<T: IntoIterator<Item = (usize, i32)>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Build the column -> `auth_seq_id` table from an alignment service mapping.
///
/// `column_mapping[i]` is the column of residue `i` or negative (`-1`) when
/// the residue was dropped by the alignment. Runs in one pass. A column that
/// receives two different residue ids is a service contract violation; it is
/// logged and the later residue wins.
#[must_use]
pub fn build_mapping(
    residue_ids: &[i32],
    column_mapping: &[i64],
) -> PositionMapping {
    if residue_ids.len() != column_mapping.len() {
        log::warn!(
            "mapping length {} does not match {} residue ids; extra entries ignored",
            column_mapping.len(),
            residue_ids.len()
        );
    }

    let mut columns = BTreeMap::new();
    for (&auth_seq_id, &column) in residue_ids.iter().zip(column_mapping) {
        let Ok(column) = usize::try_from(column) else {
            continue;
        };
        if let Some(previous) = columns.insert(column, auth_seq_id) {
            if previous != auth_seq_id {
                log::warn!(
                    "alignment column {column} assigned to residues {previous} \
                     and {auth_seq_id}; keeping {auth_seq_id}"
                );
            }
        }
    }
    PositionMapping { columns }
}

/// A mapping plus its inverse index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMapper {
    forward: PositionMapping,
    inverse: FxHashMap<i32, usize>,
}

impl PositionMapper {
    /// Index `mapping` in both directions. If one residue appears in several
    /// columns the lowest column is used for reverse lookups.
    #[must_use]
    pub fn new(mapping: PositionMapping) -> Self {
        let mut inverse = FxHashMap::default();
        for (column, auth_seq_id) in mapping.iter() {
            let _ = inverse.entry(auth_seq_id).or_insert(column);
        }
        Self {
            forward: mapping,
            inverse,
        }
    }

    /// Forward lookup: alignment column to `auth_seq_id`.
    #[must_use]
    pub fn column_to_auth(&self, column: usize) -> Option<i32> {
        self.forward.get(column)
    }

    /// Reverse lookup: `auth_seq_id` to alignment column.
    #[must_use]
    pub fn auth_to_column(&self, auth_seq_id: i32) -> Option<usize> {
        self.inverse.get(&auth_seq_id).copied()
    }

    /// The underlying forward table.
    #[must_use]
    pub fn mapping(&self) -> &PositionMapping {
        &self.forward
    }
}

impl From<PositionMapping> for PositionMapper {
    fn from(mapping: PositionMapping) -> Self {
        Self::new(mapping)
    }
}
