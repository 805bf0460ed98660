//! Digest-keyed mirror store with atomic population.
//!
//! The store root holds one subdirectory per digest, each an immutable
//! copy of a subject tree with its original relative layout and original
//! permissions. Population goes through a private scratch directory and a
//! single atomic rename, so a concurrent reader sees either no entry or a
//! complete one, never a partial write.

use crate::error::SourceError;
use crate::source::Source;
use crate::tree::digest::compute_members_digest;
use crate::tree::walker::{self, MemberKind};
use crate::types::Digest;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Consistency of a source with respect to the mirror store.
///
/// Pure classification; transitions happen only through `fetch` and
/// `track`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// No declared ref: nothing has ever been fetched or tracked.
    Absent,
    /// A ref is declared but no mirror entry exists yet; a fetch is
    /// required.
    Resolved,
    /// A ref is declared and its mirror entry is on disk; no work needed.
    Cached,
}

/// Handle to a mirror store rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    root: PathBuf,
}

impl MirrorStore {
    /// Open (creating if needed) a mirror store at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the mirror entry for `digest`, if one exists on disk.
    pub fn lookup(&self, digest: &Digest) -> Option<PathBuf> {
        let entry = self.root.join(digest.as_str());
        entry.exists().then_some(entry)
    }

    /// Classify a source against this store.
    pub fn consistency(&self, source: &Source) -> Consistency {
        match source.get_ref() {
            None => Consistency::Absent,
            Some(r) if self.lookup(r).is_some() => Consistency::Cached,
            Some(_) => Consistency::Resolved,
        }
    }

    /// Compute the digest of the live subject and guarantee a durable
    /// mirror entry exists under it.
    ///
    /// The subject is first copied verbatim into a scratch directory and
    /// the digest is computed over the copy, so the published entry always
    /// matches its name even if the subject changes afterwards. An
    /// existing entry under the same digest is discarded and replaced; the
    /// fresh copy is trusted by construction. The scratch directory is
    /// removed on every exit path.
    pub fn ensure_mirrored(&self, source: &Source) -> Result<Digest, SourceError> {
        let scratch = tempfile::Builder::new()
            .prefix(".scratch-")
            .tempdir_in(&self.root)?;
        let staging = scratch.path().join("staging");

        let digest = if source.is_dir() {
            copy_tree(source.fullpath(), &staging)?;
            compute_members_digest(&walker::walk_tree(&staging)?)?
        } else {
            // Recreate the project-relative parent chain so staging can
            // later reproduce it.
            let copy = staging.join(source.path());
            if let Some(parent) = copy.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source.fullpath(), &copy)
                .map_err(|e| SourceError::copy(source.fullpath(), &copy, e))?;
            compute_members_digest(&walker::single_file_member(source.path(), &copy)?)?
        };

        let entry = self.root.join(digest.as_str());
        if entry.symlink_metadata().is_ok() {
            debug!(digest = %digest, "replacing existing mirror entry");
            remove_entry(&entry)?;
        }
        fs::rename(&staging, &entry)?;

        Ok(digest)
    }
}

fn remove_entry(entry: &Path) -> Result<(), SourceError> {
    if entry.symlink_metadata()?.is_dir() {
        fs::remove_dir_all(entry)?;
    } else {
        fs::remove_file(entry)?;
    }
    Ok(())
}

/// Copy a tree verbatim: relative layout, file bytes and modes, literal
/// symlink targets. No hard links.
fn copy_tree(src_root: &Path, dst_root: &Path) -> Result<(), SourceError> {
    fs::create_dir_all(dst_root)?;

    // Sorted walk order guarantees parents are created before children.
    for member in walker::walk_tree(src_root)? {
        let dst = dst_root.join(&member.relpath);
        match &member.kind {
            MemberKind::Directory => fs::create_dir_all(&dst)?,
            MemberKind::File => {
                fs::copy(&member.fullpath, &dst)
                    .map_err(|e| SourceError::copy(&member.fullpath, &dst, e))?;
            }
            MemberKind::Symlink { target } => {
                #[cfg(unix)]
                std::os::unix::fs::symlink(target, &dst)?;
                #[cfg(not(unix))]
                return Err(SourceError::InternalInvariant(format!(
                    "cannot mirror symlink {:?} on this platform",
                    target
                )));
            }
        }
    }
    Ok(())
}
