//! Prioritized color rules shared by the MSA grid and the 3D view.
//!
//! Each rule paints a set of alignment columns (grid side) and a set of
//! residues (structure side) with one color. Where rules overlap, the
//! highest priority wins; among equal priorities, the rule added first wins.

use std::collections::BTreeMap;

use crate::annotations::{AnnotationVisibility, ChainAnnotations};
use crate::options::ColorOptions;
use crate::structure::{ResidueColor, ResidueRef};

/// Priority of ligand site rules.
pub const BINDING_SITE_PRIORITY: i32 = 10;
/// Priority of mutation rules; paints over binding sites.
pub const MUTATION_PRIORITY: i32 = 20;

/// What produced a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// A ligand binding site.
    BindingSite,
    /// A mutation.
    Mutation,
    /// Anything added by the host application.
    Custom,
}

/// One color rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRule {
    /// Unique id; adding a rule with an existing id replaces it.
    pub id: String,
    /// Origin of the rule.
    pub kind: RuleKind,
    /// Higher paints over lower.
    pub priority: i32,
    /// Alignment columns painted in the grid.
    pub columns: Vec<usize>,
    /// Residues painted in the structure.
    pub residues: Vec<ResidueRef>,
    /// RGB color in `[0, 1]`.
    pub color: [f32; 3],
    /// Legend label.
    pub label: String,
}

/// Ordered rule set.
#[derive(Debug, Clone, Default)]
pub struct ColorRules {
    rules: Vec<ColorRule>,
}

impl ColorRules {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rule by id.
    pub fn add(&mut self, rule: ColorRule) {
        self.rules.retain(|r| r.id != rule.id);
        self.rules.push(rule);
        // Stable: equal priorities keep insertion order.
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove a rule; returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        self.rules.len() != before
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Rules, highest priority first.
    #[must_use]
    pub fn rules(&self) -> &[ColorRule] {
        &self.rules
    }

    /// Whether no rule is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Column -> color for the grid, winner per column.
    #[must_use]
    pub fn column_colors(&self) -> BTreeMap<usize, [f32; 3]> {
        let mut out = BTreeMap::new();
        for rule in &self.rules {
            for &column in &rule.columns {
                let _ = out.entry(column).or_insert(rule.color);
            }
        }
        out
    }

    /// Per-residue colors for the structure, winner per residue, sorted by
    /// residue.
    #[must_use]
    pub fn residue_colors(&self) -> Vec<ResidueColor> {
        let mut out: BTreeMap<&ResidueRef, [f32; 3]> = BTreeMap::new();
        for rule in &self.rules {
            for residue in &rule.residues {
                let _ = out.entry(residue).or_insert(rule.color);
            }
        }
        out.into_iter()
            .map(|(residue, color)| ResidueColor {
                residue: residue.clone(),
                color,
            })
            .collect()
    }
}

/// Rules for the visible layers of one chain's annotations.
///
/// Visible ligand sites become [`RuleKind::BindingSite`] rules; when
/// mutations are shown each one becomes a [`RuleKind::Mutation`] rule.
/// Mutations at columns the chain does not cover paint only the grid.
#[must_use]
pub fn annotation_rules(
    annotations: &ChainAnnotations,
    visibility: &AnnotationVisibility,
    colors: &ColorOptions,
) -> ColorRules {
    let chain = &annotations.chain;
    let mut rules = ColorRules::new();

    for site in annotations
        .ligand_sites
        .iter()
        .filter(|s| visibility.is_ligand_visible(&s.id))
    {
        rules.add(ColorRule {
            id: format!("site:{}", site.id),
            kind: RuleKind::BindingSite,
            priority: BINDING_SITE_PRIORITY,
            columns: site.master_indices.clone(),
            residues: site
                .auth_seq_ids
                .iter()
                .map(|&auth_seq_id| ResidueRef {
                    chain: chain.clone(),
                    auth_seq_id,
                })
                .collect(),
            color: site.color,
            label: site.ligand_name.clone(),
        });
    }

    if visibility.show_mutations() {
        for (i, mutation) in annotations.mutations.iter().enumerate() {
            rules.add(ColorRule {
                id: format!("mutation:{i}:{}", mutation.label),
                kind: RuleKind::Mutation,
                priority: MUTATION_PRIORITY,
                columns: vec![mutation.master_index],
                residues: mutation
                    .auth_seq_id
                    .map(|auth_seq_id| ResidueRef {
                        chain: chain.clone(),
                        auth_seq_id,
                    })
                    .into_iter()
                    .collect(),
                color: colors.mutation_color,
                label: mutation.label.clone(),
            });
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{LigandSite, Mutation};
    use crate::structure::ChainRef;

    fn residue(auth_seq_id: i32) -> ResidueRef {
        ResidueRef {
            chain: ChainRef::new("5JCO", "A"),
            auth_seq_id,
        }
    }

    fn rule(id: &str, priority: i32, columns: &[usize], color: f32) -> ColorRule {
        ColorRule {
            id: id.into(),
            kind: RuleKind::Custom,
            priority,
            columns: columns.to_vec(),
            residues: columns.iter().map(|&c| residue(c as i32)).collect(),
            color: [color; 3],
            label: id.into(),
        }
    }

    #[test]
    fn higher_priority_wins_and_ties_keep_insertion_order() {
        let mut rules = ColorRules::new();
        rules.add(rule("low", 1, &[1, 2], 0.1));
        rules.add(rule("high", 5, &[2, 3], 0.5));
        rules.add(rule("tie", 1, &[1, 4], 0.9));

        let columns = rules.column_colors();
        assert_eq!(columns[&1], [0.1; 3]);
        assert_eq!(columns[&2], [0.5; 3]);
        assert_eq!(columns[&4], [0.9; 3]);

        let residues = rules.residue_colors();
        assert_eq!(residues.len(), 4);
        assert_eq!(residues[1].residue.auth_seq_id, 2);
        assert_eq!(residues[1].color, [0.5; 3]);
    }

    #[test]
    fn add_replaces_by_id() {
        let mut rules = ColorRules::new();
        rules.add(rule("a", 1, &[1], 0.1));
        rules.add(rule("a", 1, &[7], 0.2));
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.column_colors().keys().copied().collect::<Vec<_>>(), vec![7]);
        assert!(rules.remove("a"));
        assert!(!rules.remove("a"));
        assert!(rules.is_empty());
    }

    #[test]
    fn annotation_rules_follow_visibility() {
        let chain = ChainRef::new("5JCO", "A");
        let annotations = ChainAnnotations {
            chain: chain.clone(),
            family: None,
            ligand_sites: vec![LigandSite {
                id: "GTP_A_501".into(),
                ligand_id: "GTP".into(),
                ligand_name: "GTP".into(),
                ligand_chain: "A".into(),
                ligand_auth_seq_id: Some(501),
                color: [0.2, 0.3, 0.8],
                master_indices: vec![5, 6],
                auth_seq_ids: vec![11, 12],
                interaction_count: 0,
            }],
            mutations: vec![Mutation {
                master_index: 6,
                from_residue: "S".into(),
                to_residue: "F".into(),
                phenotype: None,
                label: "S6F".into(),
                auth_seq_id: Some(12),
            }],
        };
        let colors = ColorOptions::default();
        let mut visibility = AnnotationVisibility::default();

        let rules = annotation_rules(&annotations, &visibility, &colors);
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.rules()[0].kind, RuleKind::Mutation);

        let _ = visibility.toggle_ligand("GTP_A_501");
        let rules = annotation_rules(&annotations, &visibility, &colors);
        let columns = rules.column_colors();
        assert_eq!(columns[&5], [0.2, 0.3, 0.8]);
        assert_eq!(columns[&6], colors.mutation_color);
        assert_eq!(rules.residue_colors().len(), 2);
    }
}
