//! The sequence registry: every row currently shown in the MSA grid, its
//! display order, and the position mapping of each aligned chain.
//!
//! Row indices of live entries always form the dense range `0..n`, so the
//! grid can index straight into [`SequenceRegistry::ordered_sequences`].
//! Derived views (filtered, grouped) are recomputed on every call.

mod sequence;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
pub use sequence::{
    chain_display_name, format_family, GroupKind, MsaSequence, OriginType,
    SequenceGroup,
};

use crate::mapping::{PositionMapper, PositionMapping};
use crate::structure::ChainRef;

/// Keyed collection of displayed sequences plus per-sequence position
/// mappings.
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    sequences: FxHashMap<String, MsaSequence>,
    mappings: FxHashMap<String, PositionMapper>,
    next_row_index: usize,
    selected: Option<String>,
    /// Monotonically increasing; bumped on any mutation.
    generation: u64,
}

impl SequenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything (sequences, mappings, selection).
    pub fn reset(&mut self) {
        self.sequences.clear();
        self.mappings.clear();
        self.next_row_index = 0;
        self.selected = None;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Mutation counter, usable for cheap change detection.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- Mutation --

    /// Insert a row, or overwrite the row with the same `id`.
    ///
    /// An overwrite updates name, residues, and family only. It keeps the
    /// existing row index so re-aligning a chain does not reshuffle the grid,
    /// and it keeps the stored origin and chain. A new id takes the next free
    /// index. Returns the row index.
    pub fn add_sequence(
        &mut self,
        id: &str,
        name: &str,
        sequence: &str,
        origin: OriginType,
        chain_ref: Option<ChainRef>,
        family: Option<String>,
    ) -> usize {
        if let Some(existing) = self.sequences.get_mut(id) {
            if existing.origin != origin || existing.chain_ref != chain_ref {
                log::warn!(
                    "overwrite of {id} keeps origin {:?} and chain {:?}",
                    existing.origin,
                    existing.chain_ref
                );
            }
            name.clone_into(&mut existing.name);
            sequence.clone_into(&mut existing.sequence);
            existing.family = family;
            let row_index = existing.row_index;
            self.invalidate();
            return row_index;
        }

        let row_index = self.next_row_index;
        self.next_row_index += 1;
        let _ = self.sequences.insert(
            id.to_owned(),
            MsaSequence {
                id: id.to_owned(),
                name: name.to_owned(),
                sequence: sequence.to_owned(),
                row_index,
                origin,
                chain_ref,
                family,
            },
        );
        self.invalidate();
        row_index
    }

    /// Attach (or replace) the position mapping of a registered sequence.
    /// Returns `false` and leaves the registry untouched if `id` is unknown.
    pub fn set_position_mapping(
        &mut self,
        id: &str,
        mapping: PositionMapping,
    ) -> bool {
        if !self.sequences.contains_key(id) {
            log::warn!("position mapping for unregistered sequence {id} ignored");
            return false;
        }
        let _ = self
            .mappings
            .insert(id.to_owned(), PositionMapper::new(mapping));
        self.invalidate();
        true
    }

    /// Remove a row and its mapping, then re-index the survivors densely in
    /// their previous relative order.
    pub fn remove_sequence(&mut self, id: &str) -> Option<MsaSequence> {
        let removed = self.sequences.remove(id)?;
        let _ = self.mappings.remove(id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.reindex();
        Some(removed)
    }

    /// Remove every `Pdb` row and its mapping.
    pub fn clear_pdb_sequences(&mut self) {
        let pdb_ids: Vec<String> = self
            .sequences
            .values()
            .filter(|s| s.origin == OriginType::Pdb)
            .map(|s| s.id.clone())
            .collect();
        for id in &pdb_ids {
            let _ = self.sequences.remove(id);
            let _ = self.mappings.remove(id);
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|sel| !self.sequences.contains_key(sel))
        {
            self.selected = None;
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        let mut order: Vec<(usize, String)> = self
            .sequences
            .values()
            .map(|s| (s.row_index, s.id.clone()))
            .collect();
        order.sort();
        for (row, (_, id)) in order.iter().enumerate() {
            if let Some(seq) = self.sequences.get_mut(id) {
                seq.row_index = row;
            }
        }
        self.next_row_index = order.len();
        self.invalidate();
        let _ = self.check_row_density();
    }

    /// Mark one row as selected (or clear the selection).
    pub fn set_selected_sequence(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.sequences.contains_key(*id))
            .map(ToOwned::to_owned);
        self.invalidate();
    }

    // -- Lookup --

    /// Currently selected row.
    #[must_use]
    pub fn selected_sequence(&self) -> Option<&MsaSequence> {
        self.selected.as_ref().and_then(|id| self.sequences.get(id))
    }

    /// Row by id.
    #[must_use]
    pub fn sequence(&self, id: &str) -> Option<&MsaSequence> {
        self.sequences.get(id)
    }

    /// Row at a display position.
    #[must_use]
    pub fn sequence_at_row(&self, row: usize) -> Option<&MsaSequence> {
        self.sequences.values().find(|s| s.row_index == row)
    }

    /// The `Pdb` row for a chain, if it has been aligned.
    #[must_use]
    pub fn sequence_by_chain(&self, chain: &ChainRef) -> Option<&MsaSequence> {
        self.sequences.values().find(|s| {
            s.origin == OriginType::Pdb && s.chain_ref.as_ref() == Some(chain)
        })
    }

    /// Whether a chain has a `Pdb` row.
    #[must_use]
    pub fn is_chain_aligned(&self, chain: &ChainRef) -> bool {
        self.sequence_by_chain(chain).is_some()
    }

    /// Position mapping for a sequence id.
    #[must_use]
    pub fn position_mapping(&self, id: &str) -> Option<&PositionMapper> {
        self.mappings.get(id)
    }

    /// Position mapping of a chain's `Pdb` row.
    #[must_use]
    pub fn chain_mapping(&self, chain: &ChainRef) -> Option<&PositionMapper> {
        self.sequence_by_chain(chain)
            .and_then(|s| self.mappings.get(&s.id))
    }

    /// Number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    // -- Derived views --

    /// All rows in row order.
    #[must_use]
    pub fn ordered_sequences(&self) -> Vec<&MsaSequence> {
        let mut rows: Vec<&MsaSequence> = self.sequences.values().collect();
        rows.sort_by_key(|s| s.row_index);
        rows
    }

    fn by_origin(&self, origin: OriginType) -> Vec<&MsaSequence> {
        self.ordered_sequences()
            .into_iter()
            .filter(|s| s.origin == origin)
            .collect()
    }

    /// Master alignment rows in row order.
    #[must_use]
    pub fn master_sequences(&self) -> Vec<&MsaSequence> {
        self.by_origin(OriginType::Master)
    }

    /// Aligned chain rows in row order.
    #[must_use]
    pub fn pdb_sequences(&self) -> Vec<&MsaSequence> {
        self.by_origin(OriginType::Pdb)
    }

    /// Custom rows in row order.
    #[must_use]
    pub fn custom_sequences(&self) -> Vec<&MsaSequence> {
        self.by_origin(OriginType::Custom)
    }

    /// Non-master rows grouped for display: one group per structure (sorted
    /// by structure id), then a single trailing group of custom rows.
    #[must_use]
    pub fn added_sequence_groups(&self) -> Vec<SequenceGroup<'_>> {
        let mut by_structure: BTreeMap<&str, Vec<&MsaSequence>> =
            BTreeMap::new();
        let mut custom = Vec::new();

        for seq in self.ordered_sequences() {
            match (seq.origin, &seq.chain_ref) {
                (OriginType::Pdb, Some(chain)) => by_structure
                    .entry(chain.pdb_id.as_str())
                    .or_default()
                    .push(seq),
                (OriginType::Custom, _) => custom.push(seq),
                _ => {}
            }
        }

        let mut groups: Vec<SequenceGroup<'_>> = by_structure
            .into_iter()
            .map(|(pdb_id, sequences)| SequenceGroup {
                kind: GroupKind::Structure(pdb_id.to_owned()),
                sequences,
            })
            .collect();
        if !custom.is_empty() {
            groups.push(SequenceGroup {
                kind: GroupKind::Custom,
                sequences: custom,
            });
        }
        groups
    }

    /// Verify that live row indices are exactly `0..n`. Logs and returns
    /// `false` on violation; callers keep running.
    #[must_use]
    pub fn check_row_density(&self) -> bool {
        let mut rows: Vec<usize> =
            self.sequences.values().map(|s| s.row_index).collect();
        rows.sort_unstable();
        let dense = rows.iter().enumerate().all(|(i, &row)| i == row);
        if !dense {
            log::error!("registry row indices are not dense: {rows:?}");
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::build_mapping;

    fn pdb(pdb_id: &str, chain_id: &str) -> Option<ChainRef> {
        Some(ChainRef::new(pdb_id, chain_id))
    }

    fn add(reg: &mut SequenceRegistry, id: &str, origin: OriginType) -> usize {
        reg.add_sequence(id, id, "AC-GT", origin, None, None)
    }

    #[test]
    fn remove_reindexes_survivors() {
        let mut reg = SequenceRegistry::new();
        assert_eq!(
            reg.add_sequence("m1", "M1", "AC-GT", OriginType::Master, None, None),
            0
        );
        assert_eq!(
            reg.add_sequence(
                "p1",
                "P1",
                "ACGGT",
                OriginType::Pdb,
                pdb("5JCO", "A"),
                None
            ),
            1
        );
        assert!(reg.remove_sequence("m1").is_some());

        let ordered = reg.ordered_sequences();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, "p1");
        assert_eq!(ordered[0].row_index, 0);
    }

    #[test]
    fn overwrite_keeps_row_index() {
        let mut reg = SequenceRegistry::new();
        let _ = add(&mut reg, "a", OriginType::Master);
        let _ = add(&mut reg, "b", OriginType::Pdb);
        let row = reg.add_sequence(
            "a",
            "A renamed",
            "MMMMM",
            OriginType::Master,
            None,
            Some("tubulin_alpha".into()),
        );
        assert_eq!(row, 0);
        let a = reg.sequence("a").unwrap();
        assert_eq!(a.name, "A renamed");
        assert_eq!(a.sequence, "MMMMM");
        assert_eq!(a.family.as_deref(), Some("tubulin_alpha"));
        assert_eq!(reg.len(), 2);
        assert_eq!(add(&mut reg, "c", OriginType::Custom), 2);

        // Origin and chain belong to the first registration.
        let row = reg.add_sequence(
            "b",
            "B",
            "AAAAA",
            OriginType::Custom,
            pdb("6SM8", "B"),
            None,
        );
        assert_eq!(row, 1);
        let b = reg.sequence("b").unwrap();
        assert_eq!(b.origin, OriginType::Pdb);
        assert_eq!(b.chain_ref, None);
        assert_eq!(b.sequence, "AAAAA");
        assert!(reg.pdb_sequences().iter().any(|s| s.id == "b"));
    }

    #[test]
    fn rows_stay_dense_through_mixed_operations() {
        let mut reg = SequenceRegistry::new();
        let ops: &[(&str, bool)] = &[
            ("a", true),
            ("b", true),
            ("c", true),
            ("b", false),
            ("d", true),
            ("a", true),
            ("a", false),
            ("e", true),
            ("c", false),
            ("f", true),
            ("zz", false),
            ("d", false),
            ("e", false),
            ("f", false),
            ("g", true),
        ];
        for &(id, insert) in ops {
            if insert {
                let _ = add(&mut reg, id, OriginType::Custom);
            } else {
                let _ = reg.remove_sequence(id);
            }
            assert!(reg.check_row_density(), "after {id}");
            let rows: Vec<usize> =
                reg.ordered_sequences().iter().map(|s| s.row_index).collect();
            assert_eq!(rows, (0..reg.len()).collect::<Vec<_>>());
        }
        assert_eq!(reg.sequence("g").map(|s| s.row_index), Some(0));
    }

    #[test]
    fn removal_drops_mapping() {
        let mut reg = SequenceRegistry::new();
        let _ = reg.add_sequence(
            "5JCO_A",
            "5JCO:A",
            "ACGT",
            OriginType::Pdb,
            pdb("5JCO", "A"),
            None,
        );
        assert!(reg.set_position_mapping("5JCO_A", build_mapping(&[1], &[0])));
        assert!(!reg.set_position_mapping("missing", PositionMapping::new()));
        assert!(reg.chain_mapping(&ChainRef::new("5JCO", "A")).is_some());

        let _ = reg.remove_sequence("5JCO_A");
        assert!(reg.position_mapping("5JCO_A").is_none());
        assert!(!reg.is_chain_aligned(&ChainRef::new("5JCO", "A")));
    }

    #[test]
    fn groups_sort_structures_and_trail_custom() {
        let mut reg = SequenceRegistry::new();
        let _ = add(&mut reg, "m", OriginType::Master);
        let _ = reg.add_sequence(
            "custom_1", "mine", "AC", OriginType::Custom, None, None,
        );
        let _ = reg.add_sequence(
            "6SM8_B", "6SM8:B", "AC", OriginType::Pdb, pdb("6SM8", "B"), None,
        );
        let _ = reg.add_sequence(
            "5JCO_A", "5JCO:A", "AC", OriginType::Pdb, pdb("5JCO", "A"), None,
        );
        let _ = reg.add_sequence(
            "6SM8_A", "6SM8:A", "AC", OriginType::Pdb, pdb("6SM8", "A"), None,
        );

        let groups = reg.added_sequence_groups();
        let titles: Vec<String> =
            groups.iter().map(SequenceGroup::title).collect();
        assert_eq!(
            titles,
            ["Structure: 5JCO", "Structure: 6SM8", "Custom Sequences"]
        );
        let ids: Vec<&str> =
            groups[1].sequences.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["6SM8_B", "6SM8_A"]);
        assert_eq!(reg.master_sequences().len(), 1);
        assert_eq!(reg.pdb_sequences().len(), 3);
        assert_eq!(reg.custom_sequences().len(), 1);
    }

    #[test]
    fn clear_pdb_keeps_other_rows_dense() {
        let mut reg = SequenceRegistry::new();
        let _ = add(&mut reg, "m", OriginType::Master);
        let _ = reg.add_sequence(
            "5JCO_A", "5JCO:A", "AC", OriginType::Pdb, pdb("5JCO", "A"), None,
        );
        let _ = add(&mut reg, "c", OriginType::Custom);
        reg.set_selected_sequence(Some("5JCO_A"));
        assert_eq!(reg.selected_sequence().map(|s| s.id.as_str()), Some("5JCO_A"));

        reg.clear_pdb_sequences();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.sequence("c").map(|s| s.row_index), Some(1));
        assert!(reg.selected_sequence().is_none());
        assert_eq!(reg.sequence_at_row(0).map(|s| s.id.as_str()), Some("m"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut reg = SequenceRegistry::new();
        let _ = add(&mut reg, "a", OriginType::Master);
        let before = reg.generation();
        reg.reset();
        assert!(reg.is_empty());
        assert!(reg.generation() > before);
        assert_eq!(add(&mut reg, "b", OriginType::Master), 0);
    }
}
