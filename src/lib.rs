// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Position synchronization between a tubulin multiple-sequence alignment
//! grid and a 3D structure viewer.
//!
//! Three coordinate systems meet here: positions in a chain's observed
//! sequence, columns of the master alignment, and the author residue numbers
//! (`auth_seq_id`) the viewer uses. Aligning a chain through the remote
//! service yields a [`mapping::PositionMapping`]; every lookup between the
//! two views goes through one.
//!
//! # Key entry points
//!
//! - [`session::Session`] - wires service, registry, controller, and
//!   annotations together
//! - [`registry::SequenceRegistry`] - rows of the MSA grid and their mappings
//! - [`sync::SyncController`] - hover and focus across both views
//! - [`annotations::aggregate_chain_annotations`] - ligand sites and
//!   mutations in both coordinate systems
//! - [`options::Options`] - runtime configuration (service, colors, sync)
//!
//! # Collaborators
//!
//! The viewer, the grid, and the backend are reached only through the
//! [`structure::StructureViewer`], [`sync::MsaGrid`], and
//! [`service::DataService`] traits. [`service::HttpDataService`] implements
//! the backend over HTTP.

pub mod annotations;
pub mod coloring;
pub mod error;
pub mod mapping;
pub mod options;
pub mod registry;
pub mod service;
pub mod session;
pub mod structure;
pub mod sync;
pub mod util;

#[cfg(test)]
mod testing;
