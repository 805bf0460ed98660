//! Treemirror: content-addressed mirroring of local file trees.
//!
//! Turns a file or directory living alongside a project into an immutable,
//! digest-keyed artifact that build steps can depend on reproducibly,
//! without committing large or license-restricted files into version
//! control. The digest is a pure function of tree content and structure;
//! mirror population is atomic and idempotent; staging normalizes
//! permissions deterministically.

pub mod config;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod reconcile;
pub mod source;
pub mod stage;
pub mod tree;
pub mod types;

pub use config::SourceConfig;
pub use error::SourceError;
pub use mirror::{Consistency, MirrorStore};
pub use reconcile::{fetch, track, FetchOutcome, TrackOutcome};
pub use source::Source;
pub use stage::stage;
pub use tree::digest::compute_digest;
pub use types::Digest;

/// Classify a source against the mirror store.
///
/// Convenience alias for [`MirrorStore::consistency`].
pub fn get_consistency(source: &Source, store: &MirrorStore) -> Consistency {
    store.consistency(source)
}
