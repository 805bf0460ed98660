//! Deterministic file tree enumeration and digest computation.
//!
//! A subject tree is reduced to a sorted list of members (files,
//! directories, symlinks) and folded into a single SHA-256 digest that is
//! a pure function of relative layout and content.

pub mod digest;
pub mod walker;
