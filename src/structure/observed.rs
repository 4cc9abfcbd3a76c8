//! Observed-sequence extraction from atom-level model data.
//!
//! Engines that expose an atom table (mmCIF `atom_site` rows) can implement
//! [`StructureViewer::observed_sequence`](super::StructureViewer::observed_sequence)
//! with [`extract_observed_sequence`].

use rustc_hash::FxHashSet;

use super::ObservedSequence;

/// The subset of an `atom_site` row needed to rebuild a chain's sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSite {
    /// Author chain id.
    pub auth_asym_id: String,
    /// Author residue number.
    pub auth_seq_id: i32,
    /// Three-letter component id (`label_comp_id`), e.g. `ALA`.
    pub comp_id: String,
    /// Whether the atom belongs to a polymer entity.
    pub is_polymer: bool,
}

/// Three-letter amino acid code to one-letter code. Common modified residues
/// map to their parent amino acid; anything else is `X`.
#[must_use]
pub fn one_letter_code(comp_id: &str) -> char {
    match comp_id.trim().to_ascii_uppercase().as_str() {
        "ALA" => 'A',
        "ARG" => 'R',
        "ASN" => 'N',
        "ASP" => 'D',
        "CYS" => 'C',
        "GLN" => 'Q',
        "GLU" => 'E',
        "GLY" => 'G',
        "HIS" => 'H',
        "ILE" => 'I',
        "LEU" => 'L',
        "LYS" => 'K',
        "MET" | "MSE" => 'M',
        "PHE" => 'F',
        "PRO" => 'P',
        "SER" | "SEP" => 'S',
        "THR" | "TPO" => 'T',
        "TRP" => 'W',
        "TYR" | "PTR" => 'Y',
        "VAL" => 'V',
        "SEC" => 'U',
        "PYL" => 'O',
        _ => 'X',
    }
}

/// Build the observed sequence of `chain_id` from atom rows.
///
/// Only polymer atoms of the chain count. Residues appear in structure order
/// (order of first atom); every further atom of an already-seen residue is
/// skipped. Returns `None` when the chain has no polymer residues.
#[must_use]
pub fn extract_observed_sequence(
    atoms: &[AtomSite],
    chain_id: &str,
) -> Option<ObservedSequence> {
    let mut seen = FxHashSet::default();
    let mut sequence = String::new();
    let mut auth_seq_ids = Vec::new();

    for atom in atoms
        .iter()
        .filter(|a| a.is_polymer && a.auth_asym_id == chain_id)
    {
        if !seen.insert(atom.auth_seq_id) {
            continue;
        }
        sequence.push(one_letter_code(&atom.comp_id));
        auth_seq_ids.push(atom.auth_seq_id);
    }

    ObservedSequence::new(sequence, auth_seq_ids)
}
