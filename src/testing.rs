//! Recording collaborators for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::error::SyncError;
use crate::service::{
    AlignmentRequest, AlignmentResponse, ChainAnnotationsResponse,
    DataService, MasterAlignment, StructureProfile,
};
use crate::structure::{
    ChainRef, Classification, ObservedSequence, ResidueColor, ResidueRef,
    StructureViewer,
};
use crate::sync::MsaGrid;

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewerCall {
    Load(String),
    Highlight(ResidueRef, bool),
    ClearHighlight,
    Focus(ResidueRef),
    FocusRange(ChainRef, i32, i32),
    ClearFocus,
    ColorScheme(String, Vec<ResidueColor>),
    RestoreColors,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingViewer {
    pub calls: Vec<ViewerCall>,
    pub loaded: Option<String>,
    pub observed: FxHashMap<String, ObservedSequence>,
}

impl RecordingViewer {
    /// A viewer with `id` loaded and the given chains observed.
    pub fn with_chains(id: &str, chains: &[(&str, &str, &[i32])]) -> Self {
        let observed = chains
            .iter()
            .map(|(chain, seq, ids)| {
                let obs =
                    ObservedSequence::new((*seq).to_owned(), ids.to_vec())
                        .unwrap();
                ((*chain).to_owned(), obs)
            })
            .collect();
        Self {
            calls: Vec::new(),
            loaded: Some(id.to_uppercase()),
            observed,
        }
    }
}

impl StructureViewer for RecordingViewer {
    fn load_structure(
        &mut self,
        id: &str,
        _classification: &Classification,
    ) -> Result<(), SyncError> {
        self.calls.push(ViewerCall::Load(id.to_owned()));
        self.loaded = Some(id.to_uppercase());
        Ok(())
    }

    fn loaded_structure(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    fn observed_sequence(&self, chain_id: &str) -> Option<ObservedSequence> {
        if self.loaded.is_none() {
            return None;
        }
        self.observed.get(chain_id).cloned()
    }

    fn highlight_residue(&mut self, residue: &ResidueRef, on: bool) {
        self.calls.push(ViewerCall::Highlight(residue.clone(), on));
    }

    fn clear_highlight(&mut self) {
        self.calls.push(ViewerCall::ClearHighlight);
    }

    fn focus_residue(&mut self, residue: &ResidueRef) {
        self.calls.push(ViewerCall::Focus(residue.clone()));
    }

    fn focus_residue_range(&mut self, chain: &ChainRef, start: i32, end: i32) {
        self.calls
            .push(ViewerCall::FocusRange(chain.clone(), start, end));
    }

    fn clear_focus(&mut self) {
        self.calls.push(ViewerCall::ClearFocus);
    }

    fn apply_colorscheme(&mut self, id: &str, colors: &[ResidueColor]) {
        self.calls
            .push(ViewerCall::ColorScheme(id.to_owned(), colors.to_vec()));
    }

    fn restore_default_colors(&mut self) {
        self.calls.push(ViewerCall::RestoreColors);
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GridCall {
    HighlightColumn(Option<usize>),
    HighlightRange(usize, usize),
    ClearHighlight,
    JumpToRange(usize, usize),
    SetActiveRow(Option<usize>),
    ColumnColors(BTreeMap<usize, [f32; 3]>),
    ClearColors,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingGrid {
    pub calls: Vec<GridCall>,
}

impl MsaGrid for RecordingGrid {
    fn highlight_column(&mut self, column: Option<usize>) {
        self.calls.push(GridCall::HighlightColumn(column));
    }

    fn highlight_range(&mut self, start: usize, end: usize) {
        self.calls.push(GridCall::HighlightRange(start, end));
    }

    fn clear_highlight(&mut self) {
        self.calls.push(GridCall::ClearHighlight);
    }

    fn jump_to_range(&mut self, start: usize, end: usize) {
        self.calls.push(GridCall::JumpToRange(start, end));
    }

    fn set_active_row(&mut self, row: Option<usize>) {
        self.calls.push(GridCall::SetActiveRow(row));
    }

    fn apply_column_colors(&mut self, colors: &BTreeMap<usize, [f32; 3]>) {
        self.calls.push(GridCall::ColumnColors(colors.clone()));
    }

    fn clear_colors(&mut self) {
        self.calls.push(GridCall::ClearColors);
    }
}

// ---------------------------------------------------------------------------
// Data service
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MockState {
    master: MasterAlignment,
    align_failure: Option<String>,
    column_offset: i64,
    annotations: FxHashMap<ChainRef, ChainAnnotationsResponse>,
    profile: Option<StructureProfile>,
    align_calls: usize,
}

/// In-memory backend. Alignment places residue `i` at column
/// `i + column_offset` and pads the aligned sequence with leading gaps.
#[derive(Debug, Default)]
pub(crate) struct MockService {
    state: Mutex<MockState>,
}

impl MockService {
    pub fn new(column_offset: i64) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().column_offset = column_offset;
        service
    }

    pub fn set_master(&self, master: MasterAlignment) {
        self.state.lock().unwrap().master = master;
    }

    pub fn fail_alignments(&self, message: Option<&str>) {
        self.state.lock().unwrap().align_failure = message.map(str::to_owned);
    }

    pub fn set_annotations(
        &self,
        chain: &ChainRef,
        response: ChainAnnotationsResponse,
    ) {
        let _ = self
            .state
            .lock()
            .unwrap()
            .annotations
            .insert(chain.clone(), response);
    }

    pub fn set_profile(&self, profile: StructureProfile) {
        self.state.lock().unwrap().profile = Some(profile);
    }

    pub fn align_calls(&self) -> usize {
        self.state.lock().unwrap().align_calls
    }
}

impl DataService for MockService {
    fn align(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentResponse, SyncError> {
        let mut state = self.state.lock().unwrap();
        state.align_calls += 1;
        if let Some(message) = &state.align_failure {
            return Err(SyncError::Alignment(message.clone()));
        }
        let n = request.sequence.chars().count();
        let offset = state.column_offset;
        let mut aligned = "-".repeat(offset.max(0) as usize);
        aligned.push_str(&request.sequence);
        Ok(AlignmentResponse {
            sequence_id: request.sequence_id.clone().unwrap_or_default(),
            aligned_sequence: aligned,
            mapping: (0..n as i64).map(|i| i + offset).collect(),
            mapped_annotations: Vec::new(),
            statistics: serde_json::Map::new(),
            original_sequence: request.sequence.clone(),
        })
    }

    fn master_alignment(&self) -> Result<MasterAlignment, SyncError> {
        Ok(self.state.lock().unwrap().master.clone())
    }

    fn chain_annotations(
        &self,
        chain: &ChainRef,
    ) -> Result<ChainAnnotationsResponse, SyncError> {
        self.state
            .lock()
            .unwrap()
            .annotations
            .get(chain)
            .cloned()
            .ok_or_else(|| SyncError::Fetch {
                what: format!("annotations for {chain}"),
                message: "HTTP 404".into(),
            })
    }

    fn structure_profile(
        &self,
        rcsb_id: &str,
    ) -> Result<StructureProfile, SyncError> {
        self.state.lock().unwrap().profile.clone().ok_or_else(|| {
            SyncError::Fetch {
                what: format!("profile for {rcsb_id}"),
                message: "HTTP 404".into(),
            }
        })
    }
}
