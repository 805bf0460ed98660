//! Source configuration.
//!
//! Explicit, typed replacement for duck-typed node access: the only keys a
//! source declaration may carry are `path` and `ref`, and unknown keys are
//! rejected at parse time.

use crate::error::SourceError;
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declaration of a local source: a project-relative path and an optional
/// previously tracked digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Project-relative path of the file or directory to mirror.
    pub path: String,

    /// Declared digest of the tree at `path`, if one has been tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
}

impl SourceConfig {
    /// Declaration with no tracked ref yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            r#ref: None,
        }
    }

    /// Declaration carrying a previously tracked ref.
    pub fn with_ref(path: impl Into<String>, r#ref: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            r#ref: Some(r#ref.into()),
        }
    }

    /// Parse a declaration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, SourceError> {
        let config: SourceConfig =
            toml::from_str(text).map_err(|e| SourceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a declaration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path).map_err(|e| SourceError::read(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Validate field contents: non-empty relative `path`, well-formed hex
    /// `ref`.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.path.is_empty() {
            return Err(SourceError::Config("source path must not be empty".into()));
        }
        if Path::new(&self.path).is_absolute() {
            return Err(SourceError::Config(format!(
                "source path '{}' must be project-relative",
                self.path
            )));
        }
        if let Some(r) = &self.r#ref {
            Digest::parse(r)?;
        }
        Ok(())
    }
}
