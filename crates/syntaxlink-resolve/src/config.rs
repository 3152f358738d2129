use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// What the linker does with a grammar that fails to build or resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop and return the first error.
    #[default]
    Abort,
    /// Remove the offending grammar(s) from the set and carry on.
    DropGrammar,
}

/// Settings for linking one grammar set.
///
/// ```toml
/// base_scope = "text.html.basic"
/// on_failure = "drop-grammar"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Scope name `$base` refers to. When unset, `$base` behaves like `$self`.
    pub base_scope: Option<String>,

    /// Failure handling for the whole set.
    pub on_failure: FailurePolicy,
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|error| LinkError::InvalidConfig {
            message: error.to_string(),
        })
    }

    pub fn with_base_scope(mut self, scope: impl Into<String>) -> Self {
        self.base_scope = Some(scope.into());
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}
