use serde::{Deserialize, Serialize};

use crate::structure::ChainRef;

/// Where a displayed row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    /// A row of the master alignment.
    Master,
    /// A structure chain aligned against the master.
    Pdb,
    /// A user-submitted sequence.
    Custom,
}

/// One row of the MSA grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsaSequence {
    /// Unique id (chain rows use [`ChainRef::key`]).
    pub id: String,
    /// Display label.
    pub name: String,
    /// Gap-padded sequence, alignment length.
    pub sequence: String,
    /// Dense display position, `0..n`.
    pub row_index: usize,
    /// Row provenance.
    pub origin: OriginType,
    /// Source chain for `Pdb` rows.
    pub chain_ref: Option<ChainRef>,
    /// Family classification, e.g. `tubulin_alpha`.
    pub family: Option<String>,
}

/// Which bucket of [`added_sequence_groups`](super::SequenceRegistry::added_sequence_groups)
/// a group represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    /// All chains of one structure.
    Structure(String),
    /// All custom sequences.
    Custom,
}

/// A titled run of rows for grouped display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGroup<'a> {
    /// What the group collects.
    pub kind: GroupKind,
    /// Rows in row order.
    pub sequences: Vec<&'a MsaSequence>,
}

impl SequenceGroup<'_> {
    /// Heading shown above the group.
    #[must_use]
    pub fn title(&self) -> String {
        match &self.kind {
            GroupKind::Structure(pdb_id) => format!("Structure: {pdb_id}"),
            GroupKind::Custom => "Custom Sequences".to_owned(),
        }
    }
}

/// Short family label: `tubulin_alpha` -> `Alpha`, `map_tau` -> `TAU`.
/// Anything else is returned unchanged.
#[must_use]
pub fn format_family(family: &str) -> String {
    let is_word = |s: &str| {
        !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
    };

    if let Some(kind) = family.strip_prefix("tubulin_").filter(|s| is_word(s)) {
        let mut chars = kind.chars();
        return chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        });
    }
    if let Some(kind) = family.strip_prefix("map_") {
        let word: String = kind
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !word.is_empty() {
            return word.to_uppercase();
        }
    }
    family.to_owned()
}

/// Row label for an aligned chain: `5JCO:A` or `5JCO:A (Alpha)`.
#[must_use]
pub fn chain_display_name(chain: &ChainRef, family: Option<&str>) -> String {
    match family.map(format_family) {
        Some(label) => format!("{chain} ({label})"),
        None => chain.to_string(),
    }
}
