use rustc_hash::FxHashMap;

use super::visibility::AnnotationVisibility;
use crate::service::ChainAnnotationsResponse;
use crate::structure::ChainRef;

/// Load state of one chain's annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationStatus {
    /// Nothing has been requested yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Loaded,
    /// The last fetch failed with this message.
    Failed(String),
}

#[derive(Debug, Clone)]
struct ChainEntry {
    status: AnnotationStatus,
    response: Option<ChainAnnotationsResponse>,
    visibility: AnnotationVisibility,
    /// Generation of the fetch in flight and the status to fall back to if
    /// it is abandoned.
    pending: Option<(u64, AnnotationStatus)>,
}

impl Default for ChainEntry {
    fn default() -> Self {
        Self {
            status: AnnotationStatus::Idle,
            response: None,
            visibility: AnnotationVisibility::default(),
            pending: None,
        }
    }
}

/// Raw annotation payloads and visibility, keyed by chain.
///
/// Only backend responses are stored. Display records depend on the chain's
/// current position mapping and are rebuilt from these on demand.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    chains: FxHashMap<ChainRef, ChainEntry>,
    primary: Option<ChainRef>,
}

impl AnnotationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Mutation --

    /// Mark a fetch issued under `generation` as started. Previously loaded
    /// data is kept until the new response lands.
    pub fn set_loading(&mut self, chain: &ChainRef, generation: u64) {
        let entry = self.chains.entry(chain.clone()).or_default();
        let previous =
            std::mem::replace(&mut entry.status, AnnotationStatus::Loading);
        let previous =
            entry.pending.take().map_or(previous, |(_, earlier)| earlier);
        entry.pending = Some((generation, previous));
    }

    /// Give up on the fetch issued under `generation`. The chain returns to
    /// the status it had before that fetch. Newer fetches and chains without
    /// an entry are left alone.
    pub fn abandon(&mut self, chain: &ChainRef, generation: u64) {
        let Some(entry) = self.chains.get_mut(chain) else {
            return;
        };
        if entry.pending.as_ref().is_some_and(|(g, _)| *g == generation) {
            if let Some((_, previous)) = entry.pending.take() {
                entry.status = previous;
            }
        }
    }

    /// Store a successful response.
    pub fn set_loaded(
        &mut self,
        chain: &ChainRef,
        response: ChainAnnotationsResponse,
    ) {
        let entry = self.chains.entry(chain.clone()).or_default();
        entry.status = AnnotationStatus::Loaded;
        entry.response = Some(response);
        entry.pending = None;
    }

    /// Record a failed fetch. Earlier data for the chain is left in place.
    pub fn set_failed(&mut self, chain: &ChainRef, message: String) {
        let entry = self.chains.entry(chain.clone()).or_default();
        entry.status = AnnotationStatus::Failed(message);
        entry.pending = None;
    }

    /// Forget one chain.
    pub fn remove(&mut self, chain: &ChainRef) {
        let _ = self.chains.remove(chain);
        if self.primary.as_ref() == Some(chain) {
            self.primary = None;
        }
    }

    /// Forget every chain.
    pub fn clear(&mut self) {
        self.chains.clear();
        self.primary = None;
    }

    /// Set the chain whose annotations are in front.
    pub fn set_primary(&mut self, chain: Option<ChainRef>) {
        self.primary = chain;
    }

    /// Visibility of one chain, created with defaults on first use.
    pub fn visibility_mut(
        &mut self,
        chain: &ChainRef,
    ) -> &mut AnnotationVisibility {
        &mut self.chains.entry(chain.clone()).or_default().visibility
    }

    // -- Queries --

    /// Chain whose annotations are in front.
    #[must_use]
    pub fn primary(&self) -> Option<&ChainRef> {
        self.primary.as_ref()
    }

    /// Load state of one chain.
    #[must_use]
    pub fn status(&self, chain: &ChainRef) -> Option<&AnnotationStatus> {
        self.chains.get(chain).map(|e| &e.status)
    }

    /// Last successful response for one chain.
    #[must_use]
    pub fn response(
        &self,
        chain: &ChainRef,
    ) -> Option<&ChainAnnotationsResponse> {
        self.chains.get(chain)?.response.as_ref()
    }

    /// Visibility of one chain.
    #[must_use]
    pub fn visibility(&self, chain: &ChainRef) -> Option<&AnnotationVisibility> {
        self.chains.get(chain).map(|e| &e.visibility)
    }

    /// Chains with an entry, sorted.
    #[must_use]
    pub fn chains(&self) -> Vec<&ChainRef> {
        let mut chains: Vec<_> = self.chains.keys().collect();
        chains.sort();
        chains
    }
}
