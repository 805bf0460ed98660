//! Staging a resolved tree into a destination with normalized permissions.
//!
//! Build artifacts must never inherit unpredictable permission bits from
//! the developer's working tree, so staging narrows every member down to
//! one directory mode and two file modes. The mirror itself keeps original
//! permissions; normalization happens only here.

use crate::error::SourceError;
use crate::mirror::MirrorStore;
use crate::source::Source;
use crate::tree::walker::{self, MemberKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// `rwxr-xr-x`, applied to directories and owner-executable files.
const MODE_EXECUTABLE: u32 = 0o755;
/// `rw-r--r--`, applied to all other regular files.
const MODE_PLAIN: u32 = 0o644;

/// Kind of a planned staging step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StepKind {
    Directory,
    File { src: PathBuf },
    Symlink { target: PathBuf },
}

/// One staging step: what to materialize and where. Steps are processed in
/// sorted walk order, once, so parents always precede children.
#[derive(Debug, Clone)]
struct Step {
    kind: StepKind,
    dest: PathBuf,
}

/// Copy the resolved source tree into `destination` and normalize
/// permissions.
///
/// Stages from the mirror entry when the declared ref is cached, otherwise
/// directly from the live subject. A directory subject is reproduced with
/// its relative layout; a file subject lands at
/// `destination/<basename>`. Copies never use hard links.
pub fn stage(
    source: &Source,
    store: &MirrorStore,
    destination: &Path,
) -> Result<(), SourceError> {
    info!(path = source.path(), "staging local files");
    fs::create_dir_all(destination)?;

    let steps = plan(source, store, destination)?;
    for step in &steps {
        materialize(step)?;
    }
    for step in &steps {
        normalize(step)?;
    }
    Ok(())
}

/// Build the ordered step list for the resolved tree.
fn plan(
    source: &Source,
    store: &MirrorStore,
    destination: &Path,
) -> Result<Vec<Step>, SourceError> {
    let mirror_entry = source.get_ref().and_then(|r| store.lookup(r));

    if source.is_dir() {
        let root = match &mirror_entry {
            Some(entry) => entry.clone(),
            None => source.fullpath().to_path_buf(),
        };
        let mut steps = Vec::new();
        for member in walker::walk_tree(&root)? {
            let dest = destination.join(&member.relpath);
            let kind = match member.kind {
                MemberKind::Directory => StepKind::Directory,
                MemberKind::File => StepKind::File {
                    src: member.fullpath,
                },
                MemberKind::Symlink { target } => StepKind::Symlink { target },
            };
            steps.push(Step { kind, dest });
        }
        Ok(steps)
    } else {
        // The mirror entry nests the file under its project-relative
        // path; the live subject is the file itself.
        let src = match &mirror_entry {
            Some(entry) => entry.join(source.path()),
            None => source.fullpath().to_path_buf(),
        };
        let basename = Path::new(source.path())
            .file_name()
            .ok_or_else(|| {
                SourceError::InternalInvariant(format!(
                    "source path '{}' has no basename",
                    source.path()
                ))
            })?
            .to_os_string();
        Ok(vec![Step {
            kind: StepKind::File { src },
            dest: destination.join(basename),
        }])
    }
}

fn materialize(step: &Step) -> Result<(), SourceError> {
    match &step.kind {
        StepKind::Directory => fs::create_dir_all(&step.dest)?,
        StepKind::File { src } => {
            fs::copy(src, &step.dest).map_err(|e| SourceError::copy(src, &step.dest, e))?;
        }
        StepKind::Symlink { target } => {
            #[cfg(unix)]
            std::os::unix::fs::symlink(target, &step.dest)?;
            #[cfg(not(unix))]
            return Err(SourceError::InternalInvariant(format!(
                "cannot stage symlink {:?} on this platform",
                target
            )));
        }
    }
    Ok(())
}

#[cfg(unix)]
fn normalize(step: &Step) -> Result<(), SourceError> {
    match &step.kind {
        // Permission bits on links are not meaningful to modify.
        StepKind::Symlink { .. } => Ok(()),
        StepKind::Directory => {
            let meta = step.dest.symlink_metadata()?;
            if meta.file_type().is_symlink() || !meta.is_dir() {
                return Err(SourceError::InternalInvariant(format!(
                    "staged path {:?} expected to be a real directory",
                    step.dest
                )));
            }
            fs::set_permissions(&step.dest, fs::Permissions::from_mode(MODE_EXECUTABLE))?;
            Ok(())
        }
        StepKind::File { .. } => {
            let mode = fs::metadata(&step.dest)?.permissions().mode();
            let normalized = if mode & 0o100 != 0 {
                MODE_EXECUTABLE
            } else {
                MODE_PLAIN
            };
            fs::set_permissions(&step.dest, fs::Permissions::from_mode(normalized))?;
            Ok(())
        }
    }
}

#[cfg(not(unix))]
fn normalize(_step: &Step) -> Result<(), SourceError> {
    Ok(())
}
