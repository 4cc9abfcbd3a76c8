//! Request/response shapes of the backend, as consumed by the core.
//!
//! Every optional or loosely-typed field is `Option`/`#[serde(default)]` so a
//! partially filled payload still deserializes; semantic validation happens
//! in [`AlignmentResponse::column_mapping`] and in the annotation aggregator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;
use crate::structure::Classification;

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Body of `POST /msa/sequence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    /// Observed one-letter sequence.
    pub sequence: String,
    /// Caller-chosen identifier echoed back by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
    /// `auth_seq_id`s, 1:1 with `sequence`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_seq_ids: Option<Vec<i32>>,
    /// Opaque annotations to carry through the alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
}

/// Response of `POST /msa/sequence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResponse {
    /// Echo of the request id.
    #[serde(default)]
    pub sequence_id: String,
    /// Sequence padded with gaps to the master alignment length.
    pub aligned_sequence: String,
    /// Per input residue: master column, or `-1` if dropped.
    pub mapping: Vec<i64>,
    /// Annotations re-expressed in alignment columns.
    #[serde(default)]
    pub mapped_annotations: Vec<Value>,
    /// Free-form alignment statistics.
    #[serde(default)]
    pub statistics: serde_json::Map<String, Value>,
    /// The sequence that was aligned.
    #[serde(default)]
    pub original_sequence: String,
}

impl AlignmentResponse {
    /// Check the response against the request it answers and return the
    /// column mapping.
    ///
    /// # Errors
    ///
    /// [`SyncError::Alignment`] when the mapping length differs from the
    /// number of submitted residues, or an entry is negative but not `-1`.
    pub fn column_mapping(
        &self,
        submitted_residues: usize,
    ) -> Result<&[i64], SyncError> {
        if self.mapping.len() != submitted_residues {
            return Err(SyncError::Alignment(format!(
                "malformed response: mapping has {} entries for {} residues",
                self.mapping.len(),
                submitted_residues
            )));
        }
        if let Some(bad) = self.mapping.iter().find(|&&c| c < -1) {
            return Err(SyncError::Alignment(format!(
                "malformed response: invalid column {bad}"
            )));
        }
        Ok(&self.mapping)
    }
}

// ---------------------------------------------------------------------------
// Master alignment
// ---------------------------------------------------------------------------

/// One row of the master alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSequence {
    /// Row id.
    pub id: String,
    /// Gap-padded sequence.
    pub sequence: String,
}

/// Response of `GET /msa/master`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MasterAlignment {
    /// Alignment rows.
    #[serde(default)]
    pub sequences: Vec<MasterSequence>,
    /// Number of columns.
    #[serde(default)]
    pub alignment_length: usize,
}

// ---------------------------------------------------------------------------
// Per-chain annotations
// ---------------------------------------------------------------------------

/// A known mutation / variant at a master alignment column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationRecord {
    /// Variant kind (`substitution`, `insertion`, `deletion`). Missing is
    /// read as substitution.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Master alignment column.
    pub master_index: Option<i64>,
    /// Wild-type residue.
    #[serde(alias = "from_residue")]
    pub wild_type: Option<String>,
    /// Observed (mutant) residue.
    #[serde(alias = "to_residue")]
    pub observed: Option<String>,
    /// Phenotype or free-text description.
    #[serde(alias = "description")]
    pub phenotype: Option<String>,
    /// Originating database.
    pub source: Option<String>,
}

/// One residue-level contact between the chain and a ligand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionRecord {
    /// Ligand component id, e.g. `GTP`.
    pub ligand_id: Option<String>,
    /// Chain of the ligand instance.
    pub ligand_auth_asym_id: Option<String>,
    /// Residue number of the ligand instance.
    pub ligand_auth_seq_id: Option<i32>,
    /// Contacting polymer residue.
    pub auth_seq_id: Option<i32>,
    /// Master column of the contacting residue, when the backend knows it.
    pub master_index: Option<i64>,
    /// Contact type, e.g. `hbond`.
    pub interaction_type: Option<String>,
    /// Component id of the contacting residue.
    pub residue_comp_id: Option<String>,
}

/// A polymer residue inside a ligand neighborhood.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodResidue {
    /// Residue number of the neighbor.
    #[serde(alias = "observed_index")]
    pub auth_seq_id: Option<i32>,
    /// Component id of the neighbor.
    pub comp_id: Option<String>,
}

/// The polymer residues surrounding one ligand instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodRecord {
    /// Ligand component id.
    pub ligand_id: Option<String>,
    /// Human-readable ligand name.
    pub ligand_name: Option<String>,
    /// Chain of the ligand instance.
    pub ligand_auth_asym_id: Option<String>,
    /// Residue number of the ligand instance.
    pub ligand_auth_seq_id: Option<i32>,
    /// Neighboring polymer residues.
    pub residues: Vec<NeighborhoodResidue>,
    /// Residue count reported by the backend.
    pub residue_count: Option<usize>,
    /// DrugBank accession, when known.
    pub drugbank_id: Option<String>,
}

/// Response of `GET /annotations/polymer/{rcsb_id}/{auth_asym_id}/all`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainAnnotationsResponse {
    /// Structure id.
    pub rcsb_id: String,
    /// Chain id.
    pub auth_asym_id: String,
    /// Family classification of the chain's entity.
    pub family: Option<String>,
    /// Known mutations.
    pub mutations: Vec<MutationRecord>,
    /// Residue-level ligand contacts.
    pub interactions: Vec<InteractionRecord>,
    /// Ligand neighborhoods.
    pub neighborhoods: Vec<NeighborhoodRecord>,
}

// ---------------------------------------------------------------------------
// Structure profile
// ---------------------------------------------------------------------------

/// Entity entry of a structure profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEntity {
    /// Family such as `tubulin_alpha` or `map_tau`.
    pub family: Option<String>,
}

/// Polymer chain entry of a structure profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePolypeptide {
    /// Chain id.
    pub auth_asym_id: String,
    /// Entity the chain instantiates.
    pub entity_id: String,
}

/// Response of `GET /structures/{rcsb_id}/profile` (the fields used here).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureProfile {
    /// Structure id.
    pub rcsb_id: String,
    /// Entities keyed by entity id.
    pub entities: BTreeMap<String, ProfileEntity>,
    /// Polymer chains.
    pub polypeptides: Vec<ProfilePolypeptide>,
}

impl StructureProfile {
    /// Chain id -> family for every chain whose entity has a family.
    #[must_use]
    pub fn classification(&self) -> Classification {
        self.polypeptides
            .iter()
            .filter_map(|poly| {
                let family = self.entities.get(&poly.entity_id)?.family.clone()?;
                Some((poly.auth_asym_id.clone(), family))
            })
            .collect()
    }

    /// Family of one chain.
    #[must_use]
    pub fn family_for_chain(&self, chain_id: &str) -> Option<&str> {
        let poly = self.polypeptides.iter().find(|p| p.auth_asym_id == chain_id)?;
        self.entities.get(&poly.entity_id)?.family.as_deref()
    }
}
