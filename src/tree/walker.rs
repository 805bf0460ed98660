//! Filesystem walker for enumerating tree members deterministically.

use crate::error::SourceError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Classification of a tree member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// A regular file.
    File,
    /// A directory. Directories contribute only their presence in the
    /// member list, never content.
    Directory,
    /// A symbolic link with its literal, undereferenced target.
    Symlink { target: PathBuf },
}

/// One member of a subject tree: a relative path, its on-disk location
/// and its kind.
#[derive(Debug, Clone)]
pub struct Member {
    /// Path relative to the tree root (or the project-relative path for
    /// a single-file subject), with `/` separators.
    pub relpath: String,
    /// Absolute location of the member on disk.
    pub fullpath: PathBuf,
    pub kind: MemberKind,
}

/// Enumerate every member under `root`, sorted lexicographically by
/// relative path.
///
/// The root itself is not listed. Symbolic links are reported with their
/// link target and never followed; filesystem enumeration order never
/// leaks into the result.
pub fn walk_tree(root: &Path) -> Result<Vec<Member>, SourceError> {
    let mut members = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            SourceError::read(path, e.into())
        })?;

        let fullpath = entry.path().to_path_buf();
        if fullpath == root {
            continue;
        }

        let rel = fullpath.strip_prefix(root).map_err(|_| {
            SourceError::InternalInvariant(format!(
                "walked path {:?} is not under root {:?}",
                fullpath, root
            ))
        })?;
        // Join components with `/` regardless of platform so the same
        // tree always feeds the same bytes into the digest.
        let relpath = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let kind = classify(&fullpath, entry.file_type())?;
        members.push(Member {
            relpath,
            fullpath,
            kind,
        });
    }

    members.sort_by(|a, b| a.relpath.cmp(&b.relpath));
    Ok(members)
}

/// Build the single-member list for a file subject, carrying the
/// project-relative path the caller declared.
pub fn single_file_member(relpath: &str, fullpath: &Path) -> Result<Vec<Member>, SourceError> {
    let file_type = fullpath
        .symlink_metadata()
        .map_err(|e| SourceError::read(fullpath, e))?
        .file_type();
    let kind = classify(fullpath, file_type)?;
    Ok(vec![Member {
        relpath: relpath.to_string(),
        fullpath: fullpath.to_path_buf(),
        kind,
    }])
}

fn classify(path: &Path, file_type: std::fs::FileType) -> Result<MemberKind, SourceError> {
    if file_type.is_symlink() {
        let target = std::fs::read_link(path).map_err(|e| SourceError::read(path, e))?;
        Ok(MemberKind::Symlink { target })
    } else if file_type.is_dir() {
        Ok(MemberKind::Directory)
    } else {
        Ok(MemberKind::File)
    }
}
