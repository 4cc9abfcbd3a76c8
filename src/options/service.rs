use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Connection settings for the alignment / annotation backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Service", inline)]
#[serde(default)]
pub struct ServiceOptions {
    /// Base URL every endpoint path is appended to.
    #[schemars(title = "Base URL")]
    pub base_url: String,
    /// Global per-request timeout in seconds.
    #[schemars(title = "Timeout (s)", range(min = 1, max = 600), extend("step" = 1))]
    pub timeout_secs: u64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            timeout_secs: 30,
        }
    }
}
