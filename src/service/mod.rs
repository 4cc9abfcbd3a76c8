//! The remote data service: alignment, master alignment, per-chain
//! annotations, and structure profiles.
//!
//! [`DataService`] is the seam; [`HttpDataService`] talks to the real
//! backend. Implementations must be shareable with the background fetch
//! worker, hence `Send + Sync`.

mod http;
pub mod wire;

pub use http::HttpDataService;
pub use wire::{
    AlignmentRequest, AlignmentResponse, ChainAnnotationsResponse,
    InteractionRecord, MasterAlignment, MasterSequence, MutationRecord,
    NeighborhoodRecord, NeighborhoodResidue, StructureProfile,
};

use crate::error::SyncError;
use crate::structure::ChainRef;

/// Remote collaborator supplying alignments and annotation data.
///
/// Every failure (transport, status, body) is returned as an error; no
/// method retries.
pub trait DataService: Send + Sync {
    /// Align an observed sequence against the master alignment.
    ///
    /// # Errors
    ///
    /// [`SyncError::Alignment`] for any failure.
    fn align(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentResponse, SyncError>;

    /// Fetch the master alignment.
    ///
    /// # Errors
    ///
    /// [`SyncError::Fetch`] for any failure.
    fn master_alignment(&self) -> Result<MasterAlignment, SyncError>;

    /// Fetch mutations, interactions, and ligand neighborhoods of one chain.
    ///
    /// # Errors
    ///
    /// [`SyncError::Fetch`] for any failure.
    fn chain_annotations(
        &self,
        chain: &ChainRef,
    ) -> Result<ChainAnnotationsResponse, SyncError>;

    /// Fetch the profile (entity families) of a structure.
    ///
    /// # Errors
    ///
    /// [`SyncError::Fetch`] for any failure.
    fn structure_profile(
        &self,
        rcsb_id: &str,
    ) -> Result<StructureProfile, SyncError>;
}
