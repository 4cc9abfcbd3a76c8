//! Centralized runtime options with TOML support.
//!
//! Backend connection, annotation palette, and sync behavior are
//! consolidated here. Every section uses `#[serde(default)]` so partial TOML
//! files (e.g. only overriding `[service]`) work.

mod colors;
mod service;
mod sync;

use std::path::Path;

pub use colors::ColorOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use service::ServiceOptions;
pub use sync::SyncOptions;

use crate::error::SyncError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Backend connection.
    pub service: ServiceOptions,
    /// Annotation palette.
    #[schemars(skip)]
    pub colors: ColorOptions,
    /// Hover/focus behavior.
    pub sync: SyncOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`SyncError::Io`] if the file cannot be read,
    /// [`SyncError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = std::fs::read_to_string(path).map_err(SyncError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SyncError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`SyncError::OptionsParse`] on serialization failure,
    /// [`SyncError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SyncError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SyncError::Io)?;
        }
        std::fs::write(path, content).map_err(SyncError::Io)
    }
}
