//! Cross-view synchronization between the MSA grid and the 3D viewer.
//!
//! [`SyncController`] turns pointer input from either view into calls on the
//! other, tracking transient hover and persistent focus separately.

use super::event::{GridEvent, ResidueEvent};
use super::grid::MsaGrid;
use crate::options::SyncOptions;
use crate::registry::{OriginType, SequenceRegistry};
use crate::structure::{ChainRef, ResidueRef, StructureViewer};

/// Transient hover state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HoverState {
    /// Nothing highlighted.
    #[default]
    Idle,
    /// A column is hovered in one view and mirrored in the other.
    Hovering {
        /// Hovered alignment column.
        column: usize,
        /// Residues currently highlighted in the viewer.
        residues: Vec<ResidueRef>,
        /// Whether the grid shows a column mark (hover came from 3D).
        grid_marked: bool,
    },
}

/// What the viewer was focused on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    /// Only the grid was focused (the column has no residue to show).
    GridOnly,
    /// One residue.
    Residue(ResidueRef),
    /// An inclusive residue range of one chain.
    Range {
        /// Focused chain.
        chain: ChainRef,
        /// First residue.
        start: i32,
        /// Last residue.
        end: i32,
    },
}

/// Persistent focus state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    /// No focus.
    #[default]
    Idle,
    /// Grid range and (maybe) 3D target are focused.
    Focused {
        /// First focused column.
        start: usize,
        /// Last focused column.
        end: usize,
        /// Active grid row.
        row: Option<usize>,
        /// What the viewer shows.
        target: FocusTarget,
    },
}

/// Keeps the grid and the viewer in step.
///
/// Owns both collaborators. Every lookup between the two views goes through
/// the [`SequenceRegistry`] position mappings passed in per call. Where a
/// call both clears and sets state, the clear is always issued first.
pub struct SyncController<V: StructureViewer, G: MsaGrid> {
    viewer: V,
    grid: G,
    options: SyncOptions,
    hover: HoverState,
    focus: FocusState,
    active_chain: Option<ChainRef>,
}

impl<V: StructureViewer, G: MsaGrid> SyncController<V, G> {
    /// Wrap a viewer and a grid.
    #[must_use]
    pub fn new(viewer: V, grid: G, options: SyncOptions) -> Self {
        Self {
            viewer,
            grid,
            options,
            hover: HoverState::Idle,
            focus: FocusState::Idle,
            active_chain: None,
        }
    }

    // -- Accessors --

    /// The viewer.
    #[must_use]
    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// The viewer, mutably.
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// The grid, mutably.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Current hover state.
    #[must_use]
    pub fn hover_state(&self) -> &HoverState {
        &self.hover
    }

    /// Current focus state.
    #[must_use]
    pub fn focus_state(&self) -> &FocusState {
        &self.focus
    }

    /// Chain that MSA hover is restricted to when
    /// [`SyncOptions::hover_follows_all_chains`] is off.
    #[must_use]
    pub fn active_chain(&self) -> Option<&ChainRef> {
        self.active_chain.as_ref()
    }

    /// Set the active chain.
    pub fn set_active_chain(&mut self, chain: Option<ChainRef>) {
        self.active_chain = chain;
    }

    /// Replace behavior options.
    pub fn set_options(&mut self, options: SyncOptions) {
        self.options = options;
    }

    /// Drop hover and focus. Viewer highlights are removed with one
    /// [`StructureViewer::clear_highlight`] call.
    pub fn reset(&mut self) {
        if let HoverState::Hovering {
            residues,
            grid_marked,
            ..
        } = std::mem::take(&mut self.hover)
        {
            if !residues.is_empty() {
                self.viewer.clear_highlight();
            }
            if grid_marked {
                self.grid.highlight_column(None);
            }
        }
        self.clear_focus();
        self.active_chain = None;
    }

    // -- Hover --

    /// Pointer over `column` in the grid: highlight the residue at that
    /// column in every aligned chain whose mapping covers it.
    pub fn msa_hover(&mut self, registry: &SequenceRegistry, column: usize) {
        let residues: Vec<ResidueRef> = registry
            .pdb_sequences()
            .into_iter()
            .filter_map(|seq| {
                let chain = seq.chain_ref.as_ref()?;
                if !self.options.hover_follows_all_chains
                    && self.active_chain.as_ref().is_some_and(|a| a != chain)
                {
                    return None;
                }
                let auth_seq_id =
                    registry.position_mapping(&seq.id)?.column_to_auth(column)?;
                Some(ResidueRef {
                    chain: chain.clone(),
                    auth_seq_id,
                })
            })
            .collect();

        if let HoverState::Hovering {
            column: current,
            residues: shown,
            grid_marked: false,
        } = &self.hover
        {
            if *current == column && *shown == residues {
                return;
            }
        }

        self.clear_hover();
        for residue in &residues {
            self.viewer.highlight_residue(residue, true);
        }
        self.hover = HoverState::Hovering {
            column,
            residues,
            grid_marked: false,
        };
    }

    /// Pointer left the grid.
    pub fn msa_leave(&mut self) {
        self.clear_hover();
    }

    /// Pointer over a residue in 3D: mark its column in the grid. Residues
    /// outside the chain's mapping clear any previous hover and nothing else.
    pub fn structure_hover(
        &mut self,
        registry: &SequenceRegistry,
        residue: &ResidueRef,
    ) {
        let Some(column) = registry
            .chain_mapping(&residue.chain)
            .and_then(|m| m.auth_to_column(residue.auth_seq_id))
        else {
            self.clear_hover();
            return;
        };

        if let HoverState::Hovering {
            residues,
            grid_marked: true,
            ..
        } = &self.hover
        {
            if residues.len() == 1 && residues[0] == *residue {
                return;
            }
        }

        self.clear_hover();
        self.viewer.highlight_residue(residue, true);
        self.grid.highlight_column(Some(column));
        self.hover = HoverState::Hovering {
            column,
            residues: vec![residue.clone()],
            grid_marked: true,
        };
    }

    /// Pointer left the structure.
    pub fn structure_leave(&mut self) {
        self.clear_hover();
    }

    fn clear_hover(&mut self) {
        if let HoverState::Hovering {
            residues,
            grid_marked,
            ..
        } = std::mem::take(&mut self.hover)
        {
            for residue in &residues {
                self.viewer.highlight_residue(residue, false);
            }
            if grid_marked {
                self.grid.highlight_column(None);
            }
        }
    }

    // -- Focus --

    /// Residue clicked in 3D: focus its column in the grid and the residue
    /// in the viewer. Clicking the focused residue again clears the focus
    /// when [`SyncOptions::toggle_focus_on_reclick`] is set.
    ///
    /// Returns `false` (and changes nothing) when the residue has no
    /// alignment column.
    pub fn structure_click(
        &mut self,
        registry: &SequenceRegistry,
        residue: &ResidueRef,
    ) -> bool {
        let Some(column) = registry
            .chain_mapping(&residue.chain)
            .and_then(|m| m.auth_to_column(residue.auth_seq_id))
        else {
            log::debug!(
                "{}:{} has no alignment column; click ignored",
                residue.chain,
                residue.auth_seq_id
            );
            return false;
        };
        let row = registry
            .sequence_by_chain(&residue.chain)
            .map(|s| s.row_index);
        self.focus_residue(column, row, Some(residue.clone()));
        true
    }

    /// Cell clicked in the grid. On an aligned chain row the residue at the
    /// column is focused in 3D as well; gaps and other rows focus the grid
    /// only. Returns `false` if `row` does not exist.
    pub fn msa_click(
        &mut self,
        registry: &SequenceRegistry,
        row: usize,
        column: usize,
    ) -> bool {
        let Some(seq) = registry.sequence_at_row(row) else {
            return false;
        };
        let residue = match (&seq.origin, &seq.chain_ref) {
            (OriginType::Pdb, Some(chain)) => registry
                .position_mapping(&seq.id)
                .and_then(|m| m.column_to_auth(column))
                .map(|auth_seq_id| ResidueRef {
                    chain: chain.clone(),
                    auth_seq_id,
                }),
            _ => None,
        };
        self.focus_residue(column, Some(row), residue);
        true
    }

    fn focus_residue(
        &mut self,
        column: usize,
        row: Option<usize>,
        residue: Option<ResidueRef>,
    ) {
        let target = residue.map_or(FocusTarget::GridOnly, FocusTarget::Residue);
        if self.options.toggle_focus_on_reclick {
            if let FocusState::Focused {
                start,
                row: current_row,
                target: current,
                ..
            } = &self.focus
            {
                if *start == column && *current_row == row && *current == target
                {
                    self.clear_focus();
                    return;
                }
            }
        }

        self.clear_focus();
        self.grid.jump_to_range(column, column);
        self.grid.highlight_range(column, column);
        self.grid.set_active_row(row);
        if let FocusTarget::Residue(residue) = &target {
            self.viewer.focus_residue(residue);
        }
        self.focus = FocusState::Focused {
            start: column,
            end: column,
            row,
            target,
        };
    }

    /// Focus an inclusive column range of one sequence. The grid always
    /// jumps; the viewer focuses the residue range only when both ends map
    /// to residues of an aligned chain.
    ///
    /// Returns whether the viewer was focused. Unknown sequence ids change
    /// nothing.
    pub fn focus_range(
        &mut self,
        registry: &SequenceRegistry,
        sequence_id: &str,
        start: usize,
        end: usize,
    ) -> bool {
        let Some(seq) = registry.sequence(sequence_id) else {
            log::warn!("focus on unknown sequence {sequence_id}");
            return false;
        };
        let (start, end) = (start.min(end), start.max(end));

        let target = seq
            .chain_ref
            .as_ref()
            .zip(registry.position_mapping(sequence_id))
            .and_then(|(chain, mapper)| {
                let first = mapper.column_to_auth(start)?;
                let last = mapper.column_to_auth(end)?;
                Some(FocusTarget::Range {
                    chain: chain.clone(),
                    start: first.min(last),
                    end: first.max(last),
                })
            })
            .unwrap_or(FocusTarget::GridOnly);

        self.clear_focus();
        self.grid.jump_to_range(start, end);
        self.grid.highlight_range(start, end);
        self.grid.set_active_row(Some(seq.row_index));
        let focused = if let FocusTarget::Range { chain, start, end } = &target
        {
            self.viewer.focus_residue_range(chain, *start, *end);
            true
        } else {
            false
        };
        self.focus = FocusState::Focused {
            start,
            end,
            row: Some(seq.row_index),
            target,
        };
        focused
    }

    /// Clear the grid highlight, the active row, and the viewer focus, in
    /// that order. No calls are issued when nothing is focused.
    pub fn clear_focus(&mut self) {
        if let FocusState::Focused { target, .. } =
            std::mem::take(&mut self.focus)
        {
            self.grid.clear_highlight();
            self.grid.set_active_row(None);
            if target != FocusTarget::GridOnly {
                self.viewer.clear_focus();
            }
        }
    }

    // -- Event entry points --

    /// Handler body for pointer events from the rendering collaborator.
    pub fn on_residue_event(
        &mut self,
        registry: &SequenceRegistry,
        event: &ResidueEvent,
    ) {
        match event {
            ResidueEvent::Hover(residue) => {
                self.structure_hover(registry, residue);
            }
            ResidueEvent::Leave => self.structure_leave(),
            ResidueEvent::Click(residue) => {
                let _ = self.structure_click(registry, residue);
            }
        }
    }

    /// Handler body for pointer events from the grid.
    pub fn on_grid_event(&mut self, registry: &SequenceRegistry, event: GridEvent) {
        match event {
            GridEvent::Hover { column } => self.msa_hover(registry, column),
            GridEvent::Leave => self.msa_leave(),
            GridEvent::Click { row, column } => {
                let _ = self.msa_click(registry, row, column);
            }
        }
    }
}
