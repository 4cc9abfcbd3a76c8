//! Per-chain annotations: ligand binding sites and mutations, kept raw in an
//! [`AnnotationStore`] and aggregated into display records on demand.

mod aggregate;
mod store;
mod visibility;

pub use aggregate::{
    aggregate_chain_annotations, ChainAnnotations, LigandSite, Mutation,
};
pub use store::{AnnotationStatus, AnnotationStore};
pub use visibility::AnnotationVisibility;
