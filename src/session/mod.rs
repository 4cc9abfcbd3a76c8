//! The session: one registry, one controller, one annotation store, and the
//! remote service, wired together.
//!
//! Remote calls run either inline ([`Session::align_chain`],
//! [`Session::fetch_annotations`]) or on the background fetch thread
//! ([`Session::request_alignment`], [`Session::request_annotations`]), whose
//! results are applied by [`Session::poll`]. Loading a structure or switching
//! the active chain bumps the session generation; background results issued
//! under an older generation, or for a chain that is no longer active, are
//! dropped.

mod worker;

use std::sync::Arc;
use std::time::Duration;

pub use worker::{FetchOutcome, RequestToken};
use worker::{FetchJob, FetchWorker};

use crate::annotations::{
    aggregate_chain_annotations, AnnotationStore, ChainAnnotations,
};
use crate::coloring::annotation_rules;
use crate::error::SyncError;
use crate::mapping::build_mapping;
use crate::options::Options;
use crate::registry::{
    chain_display_name, MsaSequence, OriginType, SequenceRegistry,
};
use crate::service::{
    AlignmentRequest, AlignmentResponse, ChainAnnotationsResponse, DataService,
};
use crate::structure::{
    ChainRef, Classification, ObservedSequence, StructureViewer,
};
use crate::sync::{GridEvent, MsaGrid, ResidueEvent, SyncController};

/// Color scheme id used for annotation overpaint in the viewer.
pub const ANNOTATION_SCHEME: &str = "annotations";

/// Application-level state for one MSA grid and one 3D viewer.
pub struct Session<V: StructureViewer, G: MsaGrid> {
    service: Arc<dyn DataService>,
    registry: SequenceRegistry,
    sync: SyncController<V, G>,
    annotations: AnnotationStore,
    options: Options,
    classification: Classification,
    active_chain: Option<ChainRef>,
    /// Bumped on structure load and active-chain change.
    generation: u64,
    custom_count: usize,
    last_error: Option<String>,
    worker: Option<FetchWorker>,
}

impl<V: StructureViewer, G: MsaGrid> Session<V, G> {
    /// Wire a session. The fetch thread is spawned on first background
    /// request.
    #[must_use]
    pub fn new(
        service: Arc<dyn DataService>,
        registry: SequenceRegistry,
        viewer: V,
        grid: G,
        options: Options,
    ) -> Self {
        Self {
            service,
            registry,
            sync: SyncController::new(viewer, grid, options.sync.clone()),
            annotations: AnnotationStore::new(),
            options,
            classification: Classification::new(),
            active_chain: None,
            generation: 0,
            custom_count: 0,
            last_error: None,
            worker: None,
        }
    }

    // -- Accessors --

    /// The sequence registry.
    #[must_use]
    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    /// The annotation store.
    #[must_use]
    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    /// The controller (and through it the viewer and grid).
    #[must_use]
    pub fn sync(&self) -> &SyncController<V, G> {
        &self.sync
    }

    /// The viewer.
    #[must_use]
    pub fn viewer(&self) -> &V {
        self.sync.viewer()
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &G {
        self.sync.grid()
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace options. Takes effect on the next call.
    pub fn set_options(&mut self, options: Options) {
        self.sync.set_options(options.sync.clone());
        self.options = options;
    }

    /// Chain classification of the loaded structure.
    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Chain whose annotations and background results are current.
    #[must_use]
    pub fn active_chain(&self) -> Option<&ChainRef> {
        self.active_chain.as_ref()
    }

    /// Session generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Message of the most recent failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Take and clear the most recent failure message.
    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    fn record(&mut self, error: SyncError) -> SyncError {
        log::warn!("{error}");
        self.last_error = Some(error.to_string());
        error
    }

    // -- Loading --

    /// Fetch the master alignment and register its rows. Returns the number
    /// of rows.
    ///
    /// # Errors
    ///
    /// [`SyncError::Fetch`] if the service call fails; the registry is left
    /// untouched.
    pub fn load_master(&mut self) -> Result<usize, SyncError> {
        let master = self
            .service
            .master_alignment()
            .map_err(|e| self.record(e))?;

        for seq in &master.sequences {
            let width = seq.sequence.chars().count();
            if master.alignment_length != 0 && width != master.alignment_length
            {
                log::warn!(
                    "master row {} has {width} columns, expected {}",
                    seq.id,
                    master.alignment_length
                );
            }
            let _ = self.registry.add_sequence(
                &seq.id,
                &seq.id,
                &seq.sequence,
                OriginType::Master,
                None,
                None,
            );
        }
        log::info!(
            "loaded master alignment: {} rows x {} columns",
            master.sequences.len(),
            master.alignment_length
        );
        Ok(master.sequences.len())
    }

    /// Load a structure into the viewer.
    ///
    /// Drops the previous structure's aligned rows, annotations, hover, and
    /// focus, and bumps the generation so in-flight background results are
    /// discarded. A missing profile is logged and the structure loads without
    /// classification.
    ///
    /// # Errors
    ///
    /// [`SyncError::Viewer`] if the viewer cannot load the structure.
    pub fn load_structure(&mut self, pdb_id: &str) -> Result<(), SyncError> {
        let pdb_id = pdb_id.to_uppercase();
        self.generation += 1;
        self.sync.reset();
        self.sync.grid_mut().clear_colors();
        self.registry.clear_pdb_sequences();
        self.annotations.clear();
        self.active_chain = None;

        let classification = match self.service.structure_profile(&pdb_id) {
            Ok(profile) => profile.classification(),
            Err(e) => {
                log::warn!("{e}; loading {pdb_id} without classification");
                Classification::new()
            }
        };
        self.sync
            .viewer_mut()
            .load_structure(&pdb_id, &classification)
            .map_err(|e| self.record(e))?;

        log::info!(
            "loaded {pdb_id} ({} classified chains)",
            classification.len()
        );
        self.classification = classification;
        Ok(())
    }

    /// Make `chain` the current chain (or none). Bumps the generation.
    pub fn set_active_chain(&mut self, chain: Option<ChainRef>) {
        self.generation += 1;
        self.sync.set_active_chain(chain.clone());
        self.annotations.set_primary(chain.clone());
        self.active_chain = chain;
    }

    // -- Alignment --

    fn observed_chain(
        &mut self,
        chain_id: &str,
    ) -> Result<(ChainRef, ObservedSequence), SyncError> {
        let Some(pdb_id) = self.sync.viewer().loaded_structure() else {
            return Err(self.record(SyncError::NoStructure));
        };
        let chain = ChainRef::new(pdb_id, chain_id);
        match self.sync.viewer().observed_sequence(chain_id) {
            Some(observed) => Ok((chain, observed)),
            None => Err(self.record(SyncError::NoObservedSequence(chain))),
        }
    }

    fn alignment_request(
        chain: &ChainRef,
        observed: &ObservedSequence,
    ) -> AlignmentRequest {
        AlignmentRequest {
            sequence: observed.sequence().to_owned(),
            sequence_id: Some(chain.key()),
            auth_seq_ids: Some(observed.auth_seq_ids().to_vec()),
            annotations: None,
        }
    }

    /// Align one chain of the loaded structure and register it with its
    /// position mapping. Returns the chain's row index.
    ///
    /// Nothing is registered unless the service response is complete and
    /// consistent with the submitted residues.
    ///
    /// # Errors
    ///
    /// [`SyncError::NoStructure`] or [`SyncError::NoObservedSequence`] when
    /// there is nothing to align; [`SyncError::Alignment`] for any service
    /// failure.
    pub fn align_chain(&mut self, chain_id: &str) -> Result<usize, SyncError> {
        let (chain, observed) = self.observed_chain(chain_id)?;
        let request = Self::alignment_request(&chain, &observed);
        let response =
            self.service.align(&request).map_err(|e| self.record(e))?;
        self.apply_alignment(&chain, &observed, &response)
    }

    fn apply_alignment(
        &mut self,
        chain: &ChainRef,
        observed: &ObservedSequence,
        response: &AlignmentResponse,
    ) -> Result<usize, SyncError> {
        let columns = response
            .column_mapping(observed.len())
            .map_err(|e| self.record(e))?;
        let mapping = build_mapping(observed.auth_seq_ids(), columns);

        let family = self.classification.get(&chain.chain_id).cloned();
        let id = chain.key();
        let row = self.registry.add_sequence(
            &id,
            &chain_display_name(chain, family.as_deref()),
            &response.aligned_sequence,
            OriginType::Pdb,
            Some(chain.clone()),
            family,
        );
        let _ = self.registry.set_position_mapping(&id, mapping);
        log::info!(
            "aligned {chain}: {} of {} residues placed",
            columns.iter().filter(|&&c| c >= 0).count(),
            observed.len()
        );
        Ok(row)
    }

    /// Align a user-supplied sequence and add it as a custom row. Custom rows
    /// have no position mapping. Whitespace is ignored and residues are
    /// upper-cased.
    ///
    /// # Errors
    ///
    /// [`SyncError::Alignment`] for an empty sequence or any service failure.
    pub fn add_custom_sequence(
        &mut self,
        name: &str,
        sequence: &str,
    ) -> Result<usize, SyncError> {
        let sequence: String = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if sequence.is_empty() {
            return Err(
                self.record(SyncError::Alignment("empty sequence".into()))
            );
        }

        let id = format!("custom_{}", self.custom_count + 1);
        let request = AlignmentRequest {
            sequence_id: Some(id.clone()),
            auth_seq_ids: None,
            annotations: None,
            sequence,
        };
        let response =
            self.service.align(&request).map_err(|e| self.record(e))?;
        let _ = response
            .column_mapping(request.sequence.chars().count())
            .map_err(|e| self.record(e))?;

        self.custom_count += 1;
        let name = if name.trim().is_empty() { id.as_str() } else { name };
        Ok(self.registry.add_sequence(
            &id,
            name,
            &response.aligned_sequence,
            OriginType::Custom,
            None,
            None,
        ))
    }

    /// Remove a row. Annotations of a removed chain are dropped, as are
    /// hover and focus (they may point into the removed row).
    pub fn remove_sequence(&mut self, id: &str) -> Option<MsaSequence> {
        let removed = self.registry.remove_sequence(id)?;
        if let Some(chain) = &removed.chain_ref {
            self.annotations.remove(chain);
        }
        self.sync.msa_leave();
        self.sync.clear_focus();
        Some(removed)
    }

    // -- Annotations --

    /// Fetch and store the annotations of one chain.
    ///
    /// # Errors
    ///
    /// [`SyncError::Fetch`] if the service call fails. Previously loaded data
    /// for the chain is kept.
    pub fn fetch_annotations(
        &mut self,
        chain: &ChainRef,
    ) -> Result<(), SyncError> {
        self.annotations.set_loading(chain, self.generation);
        match self.service.chain_annotations(chain) {
            Ok(response) => {
                self.store_annotations(chain, response);
                Ok(())
            }
            Err(e) => {
                self.annotations.set_failed(chain, e.to_string());
                Err(self.record(e))
            }
        }
    }

    fn store_annotations(
        &mut self,
        chain: &ChainRef,
        response: ChainAnnotationsResponse,
    ) {
        log::info!(
            "annotations for {chain}: {} mutations, {} neighborhoods",
            response.mutations.len(),
            response.neighborhoods.len()
        );
        self.annotations.set_loaded(chain, response);
    }

    /// Display records of one chain under its current mapping. Sites stay
    /// pending until the chain is aligned.
    #[must_use]
    pub fn chain_annotations(&self, chain: &ChainRef) -> Option<ChainAnnotations> {
        let response = self.annotations.response(chain)?;
        Some(aggregate_chain_annotations(
            chain,
            response,
            self.registry.chain_mapping(chain),
            &self.options.colors,
        ))
    }

    /// Flip one ligand site of a chain; returns the new state.
    pub fn toggle_ligand(&mut self, chain: &ChainRef, site_id: &str) -> bool {
        self.annotations.visibility_mut(chain).toggle_ligand(site_id)
    }

    /// Show or hide mutations of a chain.
    pub fn set_show_mutations(&mut self, chain: &ChainRef, show: bool) {
        self.annotations
            .visibility_mut(chain)
            .set_show_mutations(show);
    }

    /// Show every ligand site and the mutations of a chain.
    pub fn show_all_annotations(&mut self, chain: &ChainRef) {
        let site_ids: Vec<String> = self
            .chain_annotations(chain)
            .map(|a| a.ligand_sites.into_iter().map(|s| s.id).collect())
            .unwrap_or_default();
        self.annotations
            .visibility_mut(chain)
            .show_all(site_ids.iter().map(String::as_str));
    }

    /// Hide every annotation layer of a chain.
    pub fn hide_all_annotations(&mut self, chain: &ChainRef) {
        self.annotations.visibility_mut(chain).hide_all();
    }

    /// Paint the visible annotations of `chain` into both views, replacing
    /// any previous annotation colors. Returns whether anything was painted.
    pub fn apply_annotation_colors(&mut self, chain: &ChainRef) -> bool {
        self.clear_annotation_colors();
        let Some(annotations) = self.chain_annotations(chain) else {
            return false;
        };
        let visibility =
            self.annotations.visibility(chain).cloned().unwrap_or_default();
        let rules =
            annotation_rules(&annotations, &visibility, &self.options.colors);
        if rules.is_empty() {
            return false;
        }

        self.sync.grid_mut().apply_column_colors(&rules.column_colors());
        self.sync
            .viewer_mut()
            .apply_colorscheme(ANNOTATION_SCHEME, &rules.residue_colors());
        true
    }

    /// Remove annotation colors from both views.
    pub fn clear_annotation_colors(&mut self) {
        self.sync.grid_mut().clear_colors();
        self.sync.viewer_mut().restore_default_colors();
    }

    // -- Background requests --

    fn submit(&mut self, job: FetchJob) -> Result<(), SyncError> {
        if self.worker.is_none() {
            let worker = FetchWorker::new(Arc::clone(&self.service))
                .map_err(|e| self.record(SyncError::WorkerSpawn(e)))?;
            self.worker = Some(worker);
        }
        if let Some(worker) = &self.worker {
            worker.submit(job);
        }
        Ok(())
    }

    fn token(&self, chain: ChainRef) -> RequestToken {
        RequestToken {
            generation: self.generation,
            chain,
        }
    }

    /// Queue alignment of one chain on the fetch thread. The result is
    /// applied by [`poll`](Self::poll) only if `chain_id` is the active chain
    /// and the generation is unchanged by then.
    ///
    /// # Errors
    ///
    /// [`SyncError::NoStructure`], [`SyncError::NoObservedSequence`], or
    /// [`SyncError::WorkerSpawn`].
    pub fn request_alignment(
        &mut self,
        chain_id: &str,
    ) -> Result<RequestToken, SyncError> {
        let (chain, observed) = self.observed_chain(chain_id)?;
        let request = Self::alignment_request(&chain, &observed);
        let token = self.token(chain);
        self.submit(FetchJob::Align {
            token: token.clone(),
            observed,
            request,
        })?;
        Ok(token)
    }

    /// Queue an annotation fetch on the fetch thread.
    ///
    /// # Errors
    ///
    /// [`SyncError::WorkerSpawn`].
    pub fn request_annotations(
        &mut self,
        chain: &ChainRef,
    ) -> Result<RequestToken, SyncError> {
        let token = self.token(chain.clone());
        self.annotations.set_loading(chain, token.generation);
        self.submit(FetchJob::Annotations {
            token: token.clone(),
        })?;
        Ok(token)
    }

    /// Apply every finished background result. Returns how many were
    /// applied (stale and failed results are not counted).
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) =
            self.worker.as_ref().and_then(FetchWorker::try_recv)
        {
            if self.apply_outcome(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait up to `timeout` for one background result and apply it.
    /// `None` if nothing arrived; otherwise whether it was applied.
    pub fn poll_blocking(&mut self, timeout: Duration) -> Option<bool> {
        let outcome = self.worker.as_ref()?.recv_timeout(timeout)?;
        Some(self.apply_outcome(outcome))
    }

    fn is_current(&self, token: &RequestToken) -> bool {
        token.generation == self.generation
            && self.active_chain.as_ref() == Some(&token.chain)
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        if !self.is_current(outcome.token()) {
            log::debug!(
                "dropping stale result for {} (generation {}, now {})",
                outcome.token().chain,
                outcome.token().generation,
                self.generation
            );
            if let FetchOutcome::Annotations { token, .. } = &outcome {
                self.annotations.abandon(&token.chain, token.generation);
            }
            return false;
        }

        match outcome {
            FetchOutcome::Alignment {
                token,
                observed,
                result,
            } => match result {
                Ok(response) => self
                    .apply_alignment(&token.chain, &observed, &response)
                    .is_ok(),
                Err(e) => {
                    let _ = self.record(e);
                    false
                }
            },
            FetchOutcome::Annotations { token, result } => match result {
                Ok(response) => {
                    self.store_annotations(&token.chain, response);
                    true
                }
                Err(e) => {
                    self.annotations.set_failed(&token.chain, e.to_string());
                    let _ = self.record(e);
                    false
                }
            },
        }
    }

    // -- Pointer events --

    /// Forward a viewer pointer event to the controller.
    pub fn on_residue_event(&mut self, event: &ResidueEvent) {
        self.sync.on_residue_event(&self.registry, event);
    }

    /// Forward a grid pointer event to the controller.
    pub fn on_grid_event(&mut self, event: GridEvent) {
        self.sync.on_grid_event(&self.registry, event);
    }

    /// Focus an inclusive column range of one row. See
    /// [`SyncController::focus_range`].
    pub fn focus_range(
        &mut self,
        sequence_id: &str,
        start: usize,
        end: usize,
    ) -> bool {
        self.sync
            .focus_range(&self.registry, sequence_id, start, end)
    }

    /// Clear focus in both views.
    pub fn clear_focus(&mut self) {
        self.sync.clear_focus();
    }
}
