//! End-to-end staging behavior against populated mirrors.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treemirror::{stage, track, MirrorStore, Source, SourceConfig};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn mirror() -> (TempDir, MirrorStore) {
    let dir = TempDir::new().unwrap();
    let store = MirrorStore::new(dir.path().join("mirror")).unwrap();
    (dir, store)
}

#[test]
fn test_checkout_directory_source() {
    let project = TempDir::new().unwrap();
    let tree = project.path().join("sally");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("sally.hello"), "Hello from Sally\n").unwrap();
    let (_dir, store) = mirror();

    let mut source = Source::new(project.path(), &SourceConfig::new("sally")).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest);

    let checkout = TempDir::new().unwrap();
    stage(&source, &store, checkout.path()).unwrap();
    assert_eq!(
        fs::read_to_string(checkout.path().join("sally.hello")).unwrap(),
        "Hello from Sally\n"
    );
}

#[test]
fn test_checkout_file_source() {
    let project = TempDir::new().unwrap();
    fs::create_dir(project.path().join("files")).unwrap();
    fs::write(project.path().join("files").join("bob.txt"), "Hi bob\n").unwrap();
    let (_dir, store) = mirror();

    let mut source =
        Source::new(project.path(), &SourceConfig::new("files/bob.txt")).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest);

    let checkout = TempDir::new().unwrap();
    stage(&source, &store, checkout.path()).unwrap();
    assert_eq!(
        fs::read_to_string(checkout.path().join("bob.txt")).unwrap(),
        "Hi bob\n"
    );
}

#[cfg(unix)]
#[test]
fn test_checkout_normalizes_modes_from_mirror() {
    let project = TempDir::new().unwrap();
    let tree = project.path().join("tools");
    fs::create_dir_all(tree.join("bin")).unwrap();
    let exe = tree.join("bin").join("helper");
    fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o741)).unwrap();
    let doc = tree.join("LICENSE");
    fs::write(&doc, "restricted").unwrap();
    fs::set_permissions(&doc, fs::Permissions::from_mode(0o600)).unwrap();
    let (_dir, store) = mirror();

    let mut source = Source::new(project.path(), &SourceConfig::new("tools")).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest.clone());

    let checkout = TempDir::new().unwrap();
    stage(&source, &store, checkout.path()).unwrap();

    let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&checkout.path().join("bin")), 0o755);
    assert_eq!(mode(&checkout.path().join("bin").join("helper")), 0o755);
    assert_eq!(mode(&checkout.path().join("LICENSE")), 0o644);

    // The mirror entry itself keeps the original modes.
    let entry = store.lookup(&digest).unwrap();
    assert_eq!(mode(&entry.join("bin").join("helper")), 0o741);
    assert_eq!(mode(&entry.join("LICENSE")), 0o600);
}

#[test]
fn test_staged_copy_does_not_alias_mirror_storage() {
    let project = TempDir::new().unwrap();
    let tree = project.path().join("data");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("shared.txt"), "immutable").unwrap();
    let (_dir, store) = mirror();

    let mut source = Source::new(project.path(), &SourceConfig::new("data")).unwrap();
    let digest = track(&source, &store).unwrap().into_digest();
    source.set_ref(digest.clone());

    let checkout = TempDir::new().unwrap();
    stage(&source, &store, checkout.path()).unwrap();

    // Writing to the staged copy must not reach into the mirror.
    fs::write(checkout.path().join("shared.txt"), "scribbled").unwrap();
    let entry = store.lookup(&digest).unwrap();
    assert_eq!(
        fs::read_to_string(entry.join("shared.txt")).unwrap(),
        "immutable"
    );
}
