//! Chain configuration.
//!
//! A [`ComposeConfig`] only affects diagnostics: the label that shows up in
//! tracing output and whether each run gets its own span. Dispatch semantics
//! never depend on it.
//!
//! # Example
//!
//! ```
//! use middleware_compose::ComposeConfig;
//!
//! let config = ComposeConfig::from_json(r#"{ "label": "http" }"#).unwrap();
//! assert_eq!(config.label, "http");
//! assert!(config.instrument);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};

/// Default label used in tracing output.
pub const DEFAULT_LABEL: &str = "compose";

/// Configuration for a composed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Name of the chain in logs and schemas.
    pub label: String,
    /// Wrap every run in a `compose_run` tracing span.
    pub instrument: bool,
}

impl ComposeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Enable or disable the per-run span.
    pub fn instrument(mut self, enabled: bool) -> Self {
        self.instrument = enabled;
        self
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ComposeError::TypeConstraint(format!("invalid compose config: {}", e)))
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            instrument: true,
        }
    }
}
