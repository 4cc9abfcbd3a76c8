//! Structure-side vocabulary: chain identities, observed sequences, and the
//! call surface of the 3D rendering collaborator.
//!
//! The core never reaches into the renderer beyond [`StructureViewer`]. All
//! residue numbers on this side of the boundary are author-assigned
//! `auth_seq_id` values.

pub mod observed;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use observed::{extract_observed_sequence, one_letter_code, AtomSite};

use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// One polymer chain inside one structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainRef {
    /// Structure id (e.g. `5JCO`), stored upper-cased.
    pub pdb_id: String,
    /// Author chain id (`auth_asym_id`).
    pub chain_id: String,
}

impl ChainRef {
    /// Create a chain reference. The structure id is upper-cased so that
    /// `5jco` and `5JCO` name the same chain.
    #[must_use]
    pub fn new(pdb_id: &str, chain_id: &str) -> Self {
        Self {
            pdb_id: pdb_id.to_uppercase(),
            chain_id: chain_id.to_owned(),
        }
    }

    /// Key used for registry sequence ids and annotation tables:
    /// `"{PDB}_{chain}"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}", self.pdb_id, self.chain_id)
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pdb_id, self.chain_id)
    }
}

/// A single residue of a single chain, addressed by `auth_seq_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueRef {
    /// Owning chain.
    pub chain: ChainRef,
    /// Author residue number.
    pub auth_seq_id: i32,
}

/// A per-residue color instruction for [`StructureViewer::apply_colorscheme`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueColor {
    /// Residue to paint.
    pub residue: ResidueRef,
    /// RGB color in `[0, 1]`.
    pub color: [f32; 3],
}

/// Per-chain family classification (`auth_asym_id` -> family such as
/// `tubulin_alpha`), derived from the structure profile.
pub type Classification = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Observed sequence
// ---------------------------------------------------------------------------

/// The residues actually present in a loaded model for one chain.
///
/// `sequence[i]` corresponds to `auth_seq_ids[i]`. Residue numbers need not be
/// contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedSequence {
    sequence: String,
    auth_seq_ids: Vec<i32>,
}

impl ObservedSequence {
    /// Pair one-letter codes with residue numbers. Returns `None` if the
    /// lengths disagree or the sequence is empty.
    #[must_use]
    pub fn new(sequence: String, auth_seq_ids: Vec<i32>) -> Option<Self> {
        if sequence.is_empty() || sequence.chars().count() != auth_seq_ids.len()
        {
            return None;
        }
        Some(Self {
            sequence,
            auth_seq_ids,
        })
    }

    /// One-letter residue codes in structure order.
    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Author residue numbers, 1:1 with [`sequence`](Self::sequence).
    #[must_use]
    pub fn auth_seq_ids(&self) -> &[i32] {
        &self.auth_seq_ids
    }

    /// Number of observed residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.auth_seq_ids.len()
    }

    /// Always false for a constructed value; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auth_seq_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Renderer boundary
// ---------------------------------------------------------------------------

/// The 3D rendering collaborator, as seen by the sync layer.
///
/// Implementations wrap whatever engine actually draws the structure. Calls
/// are issued sequentially from the owning thread and must be applied in the
/// order received.
pub trait StructureViewer {
    /// Load a structure by id, coloring chains by `classification`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Viewer`] if the engine could not load it.
    fn load_structure(
        &mut self,
        id: &str,
        classification: &Classification,
    ) -> Result<(), SyncError>;

    /// Id of the currently loaded structure, if any.
    fn loaded_structure(&self) -> Option<&str>;

    /// Observed residues for a chain of the loaded structure. `None` if no
    /// structure is loaded or the chain has no residues.
    fn observed_sequence(&self, chain_id: &str) -> Option<ObservedSequence>;

    /// Turn the transient hover highlight for one residue on or off.
    fn highlight_residue(&mut self, residue: &ResidueRef, on: bool);

    /// Drop every transient highlight.
    fn clear_highlight(&mut self);

    /// Focus the camera (and isolation styling) on one residue.
    fn focus_residue(&mut self, residue: &ResidueRef);

    /// Focus the camera on an inclusive residue range of one chain.
    fn focus_residue_range(&mut self, chain: &ChainRef, start: i32, end: i32);

    /// Remove focus styling applied by the focus calls.
    fn clear_focus(&mut self);

    /// Overpaint residues with a named color scheme.
    fn apply_colorscheme(&mut self, id: &str, colors: &[ResidueColor]);

    /// Remove every overpaint and return to the default coloring.
    fn restore_default_colors(&mut self);
}
