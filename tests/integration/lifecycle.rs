//! End-to-end source lifecycle: configure, track, fetch, consistency.

use std::fs;
use tempfile::TempDir;
use treemirror::{
    fetch, get_consistency, track, Consistency, FetchOutcome, MirrorStore, Source, SourceConfig,
    SourceError,
};

fn mirror() -> (TempDir, MirrorStore) {
    let dir = TempDir::new().unwrap();
    let store = MirrorStore::new(dir.path().join("mirror")).unwrap();
    (dir, store)
}

#[test]
fn test_single_file_track_then_fetch() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("bob.txt"), "Hi bob\n").unwrap();
    let (_dir, store) = mirror();

    let mut source = Source::new(project.path(), &SourceConfig::new("bob.txt")).unwrap();
    assert_eq!(get_consistency(&source, &store), Consistency::Absent);

    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest);
    assert_eq!(get_consistency(&source, &store), Consistency::Cached);

    // Second fetch with the tracked ref succeeds silently.
    let outcome = fetch(&source, &store).unwrap();
    assert_eq!(outcome, FetchOutcome::Fetched);
    outcome.into_result(source.path()).unwrap();
}

#[test]
fn test_directory_mutation_fails_fetch() {
    let project = TempDir::new().unwrap();
    let tree = project.path().join("sally");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("sally.hello"), "Hello from Sally\n").unwrap();
    let (_dir, store) = mirror();

    let mut source = Source::new(project.path(), &SourceConfig::new("sally")).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest);

    fs::write(tree.join("sally.hello"), "Tampered\n").unwrap();

    let outcome = fetch(&source, &store).unwrap();
    let err = outcome.into_result(source.path()).unwrap_err();
    match err {
        SourceError::RefMismatch {
            path,
            expected,
            actual,
        } => {
            assert_eq!(path, "sally");
            assert_ne!(expected, actual);
        }
        other => panic!("expected RefMismatch, got {:?}", other),
    }
}

#[test]
fn test_fresh_checkout_resolves_then_caches() {
    let project = TempDir::new().unwrap();
    let tree = project.path().join("data");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("blob.bin"), vec![0u8; 4096]).unwrap();

    // First machine tracks and records the ref.
    let recorded_ref = {
        let (_dir, store) = mirror();
        let source = Source::new(project.path(), &SourceConfig::new("data")).unwrap();
        track(&source, &store).unwrap().into_digest()
    };

    // Fresh checkout: ref declared in config, mirror store empty.
    let (_dir, store) = mirror();
    let config = SourceConfig::with_ref("data", recorded_ref.as_str());
    let source = Source::new(project.path(), &config).unwrap();
    assert_eq!(get_consistency(&source, &store), Consistency::Resolved);

    let outcome = fetch(&source, &store).unwrap();
    assert_eq!(outcome, FetchOutcome::Fetched);
    assert_eq!(get_consistency(&source, &store), Consistency::Cached);
}

#[test]
fn test_config_roundtrip_drives_lifecycle() {
    let project = TempDir::new().unwrap();
    fs::create_dir(project.path().join("files")).unwrap();
    fs::write(project.path().join("files").join("big.dat"), "payload").unwrap();
    let (_dir, store) = mirror();

    let config = SourceConfig::from_toml_str("path = \"files/big.dat\"").unwrap();
    let source = Source::new(project.path(), &config).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();

    // Persist the new ref the way an external configuration writer would.
    let updated = SourceConfig::with_ref(config.path.clone(), digest.as_str());
    let text = toml::to_string(&updated).unwrap();
    let reparsed = SourceConfig::from_toml_str(&text).unwrap();
    assert_eq!(reparsed.r#ref.as_deref(), Some(digest.as_str()));

    let source = Source::new(project.path(), &reparsed).unwrap();
    assert_eq!(get_consistency(&source, &store), Consistency::Cached);
}

#[test]
fn test_digest_equal_across_identical_checkouts() {
    let make_checkout = || {
        let project = TempDir::new().unwrap();
        let tree = project.path().join("vendor");
        fs::create_dir_all(tree.join("lib")).unwrap();
        fs::write(tree.join("lib").join("a.so"), "binary-a").unwrap();
        fs::write(tree.join("README"), "docs").unwrap();
        project
    };

    let first = make_checkout();
    let second = make_checkout();
    let (_dir, store) = mirror();

    let digest_a = {
        let source = Source::new(first.path(), &SourceConfig::new("vendor")).unwrap();
        track(&source, &store).unwrap().into_digest()
    };
    let digest_b = {
        let source = Source::new(second.path(), &SourceConfig::new("vendor")).unwrap();
        track(&source, &store).unwrap().into_digest()
    };
    assert_eq!(digest_a, digest_b);
}
