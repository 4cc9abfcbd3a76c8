use std::collections::BTreeMap;

/// The MSA grid collaborator, as seen by the sync layer.
///
/// Columns are 0-based master alignment columns; rows are
/// [`MsaSequence::row_index`](crate::registry::MsaSequence::row_index)
/// values.
pub trait MsaGrid {
    /// Mark the column under a pointer hovering the 3D view, or remove the
    /// mark with `None`.
    fn highlight_column(&mut self, column: Option<usize>);

    /// Highlight an inclusive column range as the focus.
    fn highlight_range(&mut self, start: usize, end: usize);

    /// Remove the focus highlight.
    fn clear_highlight(&mut self);

    /// Scroll so the inclusive column range is visible.
    fn jump_to_range(&mut self, start: usize, end: usize);

    /// Emphasize one row, or none.
    fn set_active_row(&mut self, row: Option<usize>);

    /// Paint cell backgrounds per column.
    fn apply_column_colors(&mut self, colors: &BTreeMap<usize, [f32; 3]>);

    /// Remove every column color.
    fn clear_colors(&mut self);
}
