use crate::structure::ResidueRef;

/// Pointer events reported by the 3D rendering collaborator.
///
/// The host registers one handler with its engine and forwards every event
/// to [`SyncController::on_residue_event`](super::SyncController::on_residue_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResidueEvent {
    /// Pointer entered a residue.
    Hover(ResidueRef),
    /// Pointer left the structure (or moved onto non-polymer geometry).
    Leave,
    /// A residue was clicked.
    Click(ResidueRef),
}

/// Pointer events reported by the MSA grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// Pointer over a cell.
    Hover {
        /// Alignment column under the pointer.
        column: usize,
    },
    /// Pointer left the grid.
    Leave,
    /// A cell was clicked.
    Click {
        /// Display row of the cell.
        row: usize,
        /// Alignment column of the cell.
        column: usize,
    },
}
