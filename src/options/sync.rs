use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Hover and focus behavior of the cross-view controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Sync", inline)]
#[serde(default)]
pub struct SyncOptions {
    /// Highlight the hovered column in every aligned chain rather than only
    /// the active one.
    #[schemars(title = "Hover All Chains")]
    pub hover_follows_all_chains: bool,
    /// Clicking the focused residue again clears the focus.
    #[schemars(title = "Toggle Focus On Re-click")]
    pub toggle_focus_on_reclick: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            hover_follows_all_chains: true,
            toggle_focus_on_reclick: true,
        }
    }
}
