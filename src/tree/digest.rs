//! Digest computation over tree members using SHA-256.

use crate::error::SourceError;
use crate::tree::walker::{self, Member, MemberKind};
use crate::types::Digest;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Block size for streaming file reads during hashing.
const READ_BLOCK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 digest of a file's byte content, read in fixed-size
/// blocks to bound memory use.
pub fn sha256sum(path: &Path) -> Result<Digest, SourceError> {
    let mut file = File::open(path).map_err(|e| SourceError::read(path, e))?;
    let mut hasher = Sha256::new();
    let mut block = [0u8; READ_BLOCK_SIZE];

    loop {
        let n = file
            .read(&mut block)
            .map_err(|e| SourceError::read(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }

    Ok(Digest::from_bytes(&hasher.finalize().into()))
}

/// Fold a sorted member list into a single digest.
///
/// For each member, in order, the UTF-8 bytes of the relative path are fed
/// to the hasher followed by the UTF-8 bytes of the member's content token.
/// The strict path/token alternation is what makes the fold unambiguous;
/// there are no other separators, and the feed order must never be
/// rearranged or previously recorded refs stop matching.
pub fn compute_members_digest(members: &[Member]) -> Result<Digest, SourceError> {
    let mut hasher = Sha256::new();
    for member in members {
        hasher.update(member.relpath.as_bytes());
        hasher.update(member_token(member)?.as_bytes());
    }
    Ok(Digest::from_bytes(&hasher.finalize().into()))
}

/// Compute the content+structure digest of an arbitrary file or directory
/// on disk.
///
/// A directory is digested over its full sorted member list; a single file
/// is treated as a one-member tree named by its file name. Usable
/// standalone by callers that need a content identity outside the mirror
/// lifecycle.
pub fn compute_digest(path: &Path) -> Result<Digest, SourceError> {
    let members = if path.is_dir() {
        walker::walk_tree(path)?
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                SourceError::InternalInvariant(format!("path {:?} has no file name", path))
            })?;
        walker::single_file_member(&name, path)?
    };
    compute_members_digest(&members)
}

// Content token per member kind: directories have no content so a fixed
// sentinel marks their presence; symlinks contribute the literal link
// target rather than whatever it points at.
fn member_token(member: &Member) -> Result<String, SourceError> {
    match &member.kind {
        MemberKind::Directory => Ok("0".to_string()),
        MemberKind::Symlink { target } => Ok(target.to_string_lossy().into_owned()),
        MemberKind::File => Ok(sha256sum(&member.fullpath)?.as_str().to_string()),
    }
}
