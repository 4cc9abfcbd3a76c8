//! Cross-view synchronization: hover and focus kept consistent between the
//! MSA grid and the 3D viewer.

mod controller;
mod event;
mod grid;

pub use controller::{FocusState, FocusTarget, HoverState, SyncController};
pub use event::{GridEvent, ResidueEvent};
pub use grid::MsaGrid;
