//! Crate-level error types.

use std::fmt;

use crate::structure::ChainRef;

/// Errors produced by the tubsync crate.
#[derive(Debug)]
pub enum SyncError {
    /// The alignment service call failed: network error, non-2xx status, or a
    /// malformed response body. All three are reported the same way.
    Alignment(String),
    /// A remote fetch other than alignment failed (master alignment,
    /// annotations, structure profile).
    Fetch {
        /// What was being fetched, e.g. `"annotations for 5JCO_A"`.
        what: String,
        /// Underlying failure description.
        message: String,
    },
    /// No structure is loaded in the viewer.
    NoStructure,
    /// The loaded structure has no observed residues for this chain.
    NoObservedSequence(ChainRef),
    /// The structure viewer refused or failed an operation.
    Viewer(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn the background fetch thread.
    WorkerSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alignment(msg) => write!(f, "alignment failed: {msg}"),
            Self::Fetch { what, message } => {
                write!(f, "failed to fetch {what}: {message}")
            }
            Self::NoStructure => write!(f, "no structure loaded"),
            Self::NoObservedSequence(chain) => {
                write!(f, "no observed sequence for {chain}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::WorkerSpawn(e) => {
                write!(f, "failed to spawn fetch worker: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::WorkerSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl SyncError {
    /// Whether this error came from a remote service call (as opposed to
    /// local state such as a missing structure).
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Alignment(_) | Self::Fetch { .. })
    }
}
