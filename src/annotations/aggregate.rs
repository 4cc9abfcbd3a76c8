//! Raw backend annotation records -> display-ready ligand sites and
//! mutations.
//!
//! Aggregation is a pure function of the backend payload, the chain's
//! current position mapping, and the palette. It is recomputed whenever any
//! of those change rather than cached.

use std::collections::{BTreeMap, BTreeSet};

use crate::mapping::PositionMapper;
use crate::options::ColorOptions;
use crate::service::wire::{
    ChainAnnotationsResponse, InteractionRecord, MutationRecord,
    NeighborhoodRecord,
};
use crate::structure::ChainRef;

/// A ligand binding site on one chain, in both coordinate systems.
#[derive(Debug, Clone, PartialEq)]
pub struct LigandSite {
    /// Unique key: `"{ligand}_{chain}_{auth_seq_id}"`.
    pub id: String,
    /// Ligand component id.
    pub ligand_id: String,
    /// Display name (component id when the backend gives none).
    pub ligand_name: String,
    /// Chain of the ligand instance.
    pub ligand_chain: String,
    /// Residue number of the ligand instance.
    pub ligand_auth_seq_id: Option<i32>,
    /// Palette color of the ligand id.
    pub color: [f32; 3],
    /// Alignment columns of the site, sorted and deduplicated. Empty while
    /// the chain has no position mapping.
    pub master_indices: Vec<usize>,
    /// Contacting residues of this chain, sorted and deduplicated.
    pub auth_seq_ids: Vec<i32>,
    /// Number of residue-level interaction records for this ligand instance.
    pub interaction_count: usize,
}

impl LigandSite {
    /// Whether the site has no resolvable columns yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.master_indices.is_empty()
    }
}

/// A substitution at a master alignment column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Alignment column.
    pub master_index: usize,
    /// Wild-type residue.
    pub from_residue: String,
    /// Mutant residue.
    pub to_residue: String,
    /// Phenotype / description.
    pub phenotype: Option<String>,
    /// Short label, e.g. `S250F`.
    pub label: String,
    /// Residue of this chain at the column; `None` when the column is not
    /// observed in this structure.
    pub auth_seq_id: Option<i32>,
}

/// Everything displayable for one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAnnotations {
    /// The annotated chain.
    pub chain: ChainRef,
    /// Family of the chain's entity.
    pub family: Option<String>,
    /// Ligand sites, in backend order.
    pub ligand_sites: Vec<LigandSite>,
    /// Substitutions, in backend order.
    pub mutations: Vec<Mutation>,
}

impl ChainAnnotations {
    /// Distinct ligand component ids, sorted.
    #[must_use]
    pub fn unique_ligand_types(&self) -> Vec<&str> {
        let ids: BTreeSet<&str> = self
            .ligand_sites
            .iter()
            .map(|s| s.ligand_id.as_str())
            .collect();
        ids.into_iter().collect()
    }

    /// Ligand site by id.
    #[must_use]
    pub fn ligand_site(&self, id: &str) -> Option<&LigandSite> {
        self.ligand_sites.iter().find(|s| s.id == id)
    }

    /// Mutations at one column.
    pub fn mutations_at(
        &self,
        column: usize,
    ) -> impl Iterator<Item = &Mutation> + '_ {
        self.mutations
            .iter()
            .filter(move |m| m.master_index == column)
    }
}

/// Identity of one ligand instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LigandKey {
    ligand_id: String,
    chain: Option<String>,
    seq: Option<i32>,
}

impl LigandKey {
    fn site_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.ligand_id,
            self.chain.as_deref().unwrap_or_default(),
            self.seq.unwrap_or(0)
        )
    }

    /// Whether an interaction belongs to this instance. Fields the
    /// interaction leaves unset match anything.
    fn matches(&self, ix: &InteractionRecord) -> bool {
        ix.ligand_id.as_deref() == Some(self.ligand_id.as_str())
            && ix
                .ligand_auth_asym_id
                .as_ref()
                .is_none_or(|c| self.chain.as_ref() == Some(c))
            && ix.ligand_auth_seq_id.is_none_or(|s| self.seq == Some(s))
    }
}

/// Build display records for one chain.
///
/// Ligand sites take the union of the reverse-mapped neighborhood residues
/// and the columns of the ligand's interaction records. Records missing a
/// required field are dropped with a warning; the rest still render.
#[must_use]
pub fn aggregate_chain_annotations(
    chain: &ChainRef,
    response: &ChainAnnotationsResponse,
    mapper: Option<&PositionMapper>,
    colors: &ColorOptions,
) -> ChainAnnotations {
    let mut claimed = vec![false; response.interactions.len()];
    let mut ligand_sites = Vec::with_capacity(response.neighborhoods.len());

    for record in &response.neighborhoods {
        let Some(key) = neighborhood_key(record) else {
            log::warn!("{chain}: ligand neighborhood without ligand id dropped");
            continue;
        };
        let interactions: Vec<&InteractionRecord> = response
            .interactions
            .iter()
            .zip(claimed.iter_mut())
            .filter(|(ix, _)| key.matches(ix))
            .map(|(ix, seen)| {
                *seen = true;
                ix
            })
            .collect();
        let name = record.ligand_name.clone();
        ligand_sites.push(build_site(
            key,
            name,
            record,
            &interactions,
            mapper,
            colors,
        ));
    }

    // Interactions whose ligand has no neighborhood record still form sites.
    let mut orphans: BTreeMap<LigandKey, Vec<&InteractionRecord>> =
        BTreeMap::new();
    for (ix, _) in response
        .interactions
        .iter()
        .zip(&claimed)
        .filter(|(_, seen)| !**seen)
    {
        match ix.ligand_id.as_deref().filter(|id| !id.is_empty()) {
            Some(ligand_id) => orphans
                .entry(LigandKey {
                    ligand_id: ligand_id.to_owned(),
                    chain: ix.ligand_auth_asym_id.clone(),
                    seq: ix.ligand_auth_seq_id,
                })
                .or_default()
                .push(ix),
            None => {
                log::warn!("{chain}: interaction without ligand id dropped");
            }
        }
    }
    let empty = NeighborhoodRecord::default();
    for (key, interactions) in orphans {
        ligand_sites.push(build_site(
            key,
            None,
            &empty,
            &interactions,
            mapper,
            colors,
        ));
    }

    let mutations = response
        .mutations
        .iter()
        .filter_map(|m| build_mutation(chain, m, mapper))
        .collect();

    ChainAnnotations {
        chain: chain.clone(),
        family: response.family.clone(),
        ligand_sites,
        mutations,
    }
}

fn neighborhood_key(record: &NeighborhoodRecord) -> Option<LigandKey> {
    let ligand_id = record.ligand_id.as_deref().filter(|id| !id.is_empty())?;
    Some(LigandKey {
        ligand_id: ligand_id.to_owned(),
        chain: record.ligand_auth_asym_id.clone(),
        seq: record.ligand_auth_seq_id,
    })
}

fn build_site(
    key: LigandKey,
    name: Option<String>,
    neighborhood: &NeighborhoodRecord,
    interactions: &[&InteractionRecord],
    mapper: Option<&PositionMapper>,
    colors: &ColorOptions,
) -> LigandSite {
    let mut auth_seq_ids: BTreeSet<i32> = neighborhood
        .residues
        .iter()
        .filter_map(|r| r.auth_seq_id)
        .collect();
    auth_seq_ids.extend(interactions.iter().filter_map(|ix| ix.auth_seq_id));

    let mut columns: BTreeSet<usize> = auth_seq_ids
        .iter()
        .filter_map(|&auth| mapper?.auth_to_column(auth))
        .collect();
    columns.extend(interactions.iter().filter_map(|ix| {
        ix.master_index.and_then(|c| usize::try_from(c).ok())
    }));

    LigandSite {
        id: key.site_id(),
        ligand_name: name.unwrap_or_else(|| key.ligand_id.clone()),
        color: colors.ligand_color(&key.ligand_id),
        ligand_chain: key.chain.unwrap_or_default(),
        ligand_auth_seq_id: key.seq,
        ligand_id: key.ligand_id,
        master_indices: columns.into_iter().collect(),
        auth_seq_ids: auth_seq_ids.into_iter().collect(),
        interaction_count: interactions.len(),
    }
}

fn build_mutation(
    chain: &ChainRef,
    record: &MutationRecord,
    mapper: Option<&PositionMapper>,
) -> Option<Mutation> {
    if record
        .kind
        .as_deref()
        .is_some_and(|k| !k.eq_ignore_ascii_case("substitution"))
    {
        return None;
    }
    let Some(master_index) =
        record.master_index.and_then(|c| usize::try_from(c).ok())
    else {
        log::warn!("{chain}: mutation without a valid master index dropped");
        return None;
    };

    let from_residue = record.wild_type.clone().unwrap_or_else(|| "?".into());
    let to_residue = record.observed.clone().unwrap_or_else(|| "?".into());
    Some(Mutation {
        master_index,
        label: format!("{from_residue}{master_index}{to_residue}"),
        from_residue,
        to_residue,
        phenotype: record.phenotype.clone(),
        auth_seq_id: mapper.and_then(|m| m.column_to_auth(master_index)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::build_mapping;
    use crate::service::wire::NeighborhoodResidue;

    fn chain() -> ChainRef {
        ChainRef::new("5JCO", "A")
    }

    fn residues(ids: &[i32]) -> Vec<NeighborhoodResidue> {
        ids.iter()
            .map(|&id| NeighborhoodResidue {
                auth_seq_id: Some(id),
                comp_id: None,
            })
            .collect()
    }

    fn gtp_neighborhood(ids: &[i32]) -> NeighborhoodRecord {
        NeighborhoodRecord {
            ligand_id: Some("GTP".into()),
            ligand_name: Some("Guanosine triphosphate".into()),
            ligand_auth_asym_id: Some("A".into()),
            ligand_auth_seq_id: Some(501),
            residues: residues(ids),
            ..NeighborhoodRecord::default()
        }
    }

    fn mapper() -> PositionMapper {
        // {5: 11, 6: 12}
        PositionMapper::new(build_mapping(&[10, 11, 12], &[-1, 5, 6]))
    }

    #[test]
    fn unmapped_neighbors_are_dropped_silently() {
        let response = ChainAnnotationsResponse {
            neighborhoods: vec![gtp_neighborhood(&[11, 12, 99])],
            ..ChainAnnotationsResponse::default()
        };
        let mapper = mapper();
        let out = aggregate_chain_annotations(
            &chain(),
            &response,
            Some(&mapper),
            &ColorOptions::default(),
        );
        let site = &out.ligand_sites[0];
        assert_eq!(site.master_indices, vec![5, 6]);
        assert_eq!(site.auth_seq_ids, vec![11, 12, 99]);
        assert_eq!(site.id, "GTP_A_501");
        assert_eq!(site.ligand_name, "Guanosine triphosphate");
        assert_eq!(site.color, ColorOptions::default().ligand_color("GTP"));
    }

    #[test]
    fn interaction_columns_join_the_union() {
        let response = ChainAnnotationsResponse {
            neighborhoods: vec![gtp_neighborhood(&[12, 11, 12])],
            interactions: vec![
                InteractionRecord {
                    ligand_id: Some("GTP".into()),
                    auth_seq_id: Some(40),
                    master_index: Some(2),
                    ..InteractionRecord::default()
                },
                InteractionRecord {
                    ligand_id: Some("GTP".into()),
                    ligand_auth_asym_id: Some("A".into()),
                    master_index: Some(6),
                    ..InteractionRecord::default()
                },
                InteractionRecord {
                    ligand_id: Some("GTP".into()),
                    ligand_auth_asym_id: Some("B".into()),
                    master_index: Some(90),
                    ..InteractionRecord::default()
                },
            ],
            ..ChainAnnotationsResponse::default()
        };
        let mapper = mapper();
        let out = aggregate_chain_annotations(
            &chain(),
            &response,
            Some(&mapper),
            &ColorOptions::default(),
        );

        assert_eq!(out.ligand_sites.len(), 2);
        let site = &out.ligand_sites[0];
        assert_eq!(site.master_indices, vec![2, 5, 6]);
        assert_eq!(site.auth_seq_ids, vec![11, 12, 40]);
        assert_eq!(site.interaction_count, 2);

        // The chain-B instance had no neighborhood record.
        let orphan = &out.ligand_sites[1];
        assert_eq!(orphan.id, "GTP_B_0");
        assert_eq!(orphan.master_indices, vec![90]);
        assert_eq!(orphan.ligand_name, "GTP");
    }

    #[test]
    fn sites_without_mapping_are_pending_not_dropped() {
        let response = ChainAnnotationsResponse {
            neighborhoods: vec![gtp_neighborhood(&[11, 12])],
            ..ChainAnnotationsResponse::default()
        };
        let out = aggregate_chain_annotations(
            &chain(),
            &response,
            None,
            &ColorOptions::default(),
        );
        assert_eq!(out.ligand_sites.len(), 1);
        assert!(out.ligand_sites[0].is_pending());
        assert_eq!(out.ligand_sites[0].auth_seq_ids, vec![11, 12]);
    }

    #[test]
    fn mutations_keep_column_when_residue_unobserved() {
        let response = ChainAnnotationsResponse {
            mutations: vec![
                MutationRecord {
                    master_index: Some(5),
                    wild_type: Some("S".into()),
                    observed: Some("F".into()),
                    phenotype: Some("taxol resistance".into()),
                    ..MutationRecord::default()
                },
                MutationRecord {
                    master_index: Some(300),
                    wild_type: Some("A".into()),
                    observed: Some("T".into()),
                    ..MutationRecord::default()
                },
                MutationRecord {
                    kind: Some("deletion".into()),
                    master_index: Some(7),
                    ..MutationRecord::default()
                },
                MutationRecord {
                    master_index: None,
                    ..MutationRecord::default()
                },
            ],
            ..ChainAnnotationsResponse::default()
        };
        let mapper = mapper();
        let out = aggregate_chain_annotations(
            &chain(),
            &response,
            Some(&mapper),
            &ColorOptions::default(),
        );
        assert_eq!(out.mutations.len(), 2);
        assert_eq!(out.mutations[0].label, "S5F");
        assert_eq!(out.mutations[0].auth_seq_id, Some(11));
        assert_eq!(out.mutations[1].master_index, 300);
        assert_eq!(out.mutations[1].auth_seq_id, None);
        assert_eq!(out.mutations_at(300).count(), 1);
    }

    #[test]
    fn malformed_records_do_not_poison_the_payload() {
        let response = ChainAnnotationsResponse {
            neighborhoods: vec![
                NeighborhoodRecord::default(),
                gtp_neighborhood(&[11]),
            ],
            interactions: vec![InteractionRecord::default()],
            ..ChainAnnotationsResponse::default()
        };
        let out = aggregate_chain_annotations(
            &chain(),
            &response,
            None,
            &ColorOptions::default(),
        );
        assert_eq!(out.ligand_sites.len(), 1);
        assert_eq!(out.unique_ligand_types(), vec!["GTP"]);
        assert!(out.ligand_site("GTP_A_501").is_some());
    }
}
