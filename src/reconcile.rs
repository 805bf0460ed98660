//! Reconciling declared refs with freshly computed digests.
//!
//! `fetch` treats the declared ref as ground truth and any disagreement as
//! a build-stopping failure; `track` exists to overwrite the declared ref,
//! so disagreement there is only a warning.

use crate::error::SourceError;
use crate::mirror::MirrorStore;
use crate::source::Source;
use crate::types::Digest;
use tracing::{info, warn};

/// Result of a `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The mirror entry matches the declared ref.
    Fetched,
    /// The freshly computed digest disagrees with the declared ref; the
    /// referenced files have changed since the ref was recorded.
    Mismatch { expected: Digest, actual: Digest },
}

impl FetchOutcome {
    /// Convert a mismatch into the hard `RefMismatch` failure, reporting
    /// the subject path plus both digests.
    pub fn into_result(self, path: &str) -> Result<(), SourceError> {
        match self {
            FetchOutcome::Fetched => Ok(()),
            FetchOutcome::Mismatch { expected, actual } => Err(SourceError::RefMismatch {
                path: path.to_string(),
                expected,
                actual,
            }),
        }
    }
}

/// Result of a `track`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// First track, or the tree is unchanged since the last one.
    Tracked { digest: Digest },
    /// The tree has changed since the previous ref was recorded; the new
    /// digest is still adopted.
    Drifted { digest: Digest, previous: Digest },
}

impl TrackOutcome {
    /// The freshly computed digest, regardless of drift.
    pub fn digest(&self) -> &Digest {
        match self {
            TrackOutcome::Tracked { digest } | TrackOutcome::Drifted { digest, .. } => digest,
        }
    }

    pub fn into_digest(self) -> Digest {
        match self {
            TrackOutcome::Tracked { digest } | TrackOutcome::Drifted { digest, .. } => digest,
        }
    }
}

/// Populate the mirror from the live subject and check it against the
/// declared ref.
///
/// Requires a declared ref; a source that has never been tracked cannot be
/// fetched. On disagreement the mirror entry for the computed digest still
/// exists (population happened), but the outcome is a mismatch.
pub fn fetch(source: &Source, store: &MirrorStore) -> Result<FetchOutcome, SourceError> {
    let expected = source
        .get_ref()
        .cloned()
        .ok_or_else(|| SourceError::MissingRef(source.path().to_string()))?;

    info!(path = source.path(), "fetching local source");
    let actual = store.ensure_mirrored(source)?;

    if actual == expected {
        Ok(FetchOutcome::Fetched)
    } else {
        Ok(FetchOutcome::Mismatch { expected, actual })
    }
}

/// Compute and adopt a fresh digest for the subject, populating the mirror.
///
/// Tracking is always a conscious decision to accept the tree as it is now,
/// so the new digest is returned unconditionally; if a previous ref is set
/// and differs, a warning is emitted and the outcome records the drift.
/// Persisting the new ref back into configuration is the caller's job.
pub fn track(source: &Source, store: &MirrorStore) -> Result<TrackOutcome, SourceError> {
    info!(path = source.path(), "tracking local source");
    let digest = store.ensure_mirrored(source)?;

    match source.get_ref() {
        Some(previous) if *previous != digest => {
            warn!(
                path = source.path(),
                current_ref = %previous,
                new_ref = %digest,
                "local files have changed since last track"
            );
            Ok(TrackOutcome::Drifted {
                digest,
                previous: previous.clone(),
            })
        }
        _ => Ok(TrackOutcome::Tracked { digest }),
    }
}
