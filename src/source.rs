//! The source subject: a project-relative file or directory to mirror.

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::tree::walker::{self, Member};
use crate::types::Digest;
use std::path::{Path, PathBuf};

/// A configured local source.
///
/// Immutable apart from the declared ref, which `track` updates. The
/// subject may resolve to a single file or to a directory tree; both are
/// handled uniformly as member lists.
#[derive(Debug, Clone)]
pub struct Source {
    path: String,
    fullpath: PathBuf,
    r#ref: Option<Digest>,
}

impl Source {
    /// Resolve a configured source against the project root.
    pub fn new(project_root: &Path, config: &SourceConfig) -> Result<Self, SourceError> {
        config.validate()?;
        let joined = project_root.join(&config.path);
        let fullpath =
            dunce::canonicalize(&joined).map_err(|e| SourceError::read(&joined, e))?;
        let r#ref = match &config.r#ref {
            Some(r) => Some(Digest::parse(r)?),
            None => None,
        };
        Ok(Self {
            path: config.path.clone(),
            fullpath,
            r#ref,
        })
    }

    /// The project-relative path this source was declared with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The resolved absolute location on disk.
    pub fn fullpath(&self) -> &Path {
        &self.fullpath
    }

    /// The declared digest, if one has been tracked.
    pub fn get_ref(&self) -> Option<&Digest> {
        self.r#ref.as_ref()
    }

    /// Adopt a freshly tracked digest as the declared ref. The caller is
    /// responsible for persisting it back into configuration.
    pub fn set_ref(&mut self, digest: Digest) {
        self.r#ref = Some(digest);
    }

    /// Cache key for the surrounding build graph: the declared path plus
    /// the declared ref.
    pub fn unique_key(&self) -> (String, Option<String>) {
        (
            self.path.clone(),
            self.r#ref.as_ref().map(|d| d.as_str().to_string()),
        )
    }

    /// Whether the subject resolves to a directory tree.
    pub fn is_dir(&self) -> bool {
        self.fullpath.is_dir()
    }

    /// Enumerate the subject's members: the sorted tree walk for a
    /// directory, or the single declared member for a file.
    pub fn members(&self) -> Result<Vec<Member>, SourceError> {
        if self.is_dir() {
            walker::walk_tree(&self.fullpath)
        } else {
            walker::single_file_member(&self.path, &self.fullpath)
        }
    }
}
