//! Tests for mount-table mutation: unmount invalidation of open handles,
//! duplicate-name rejection, and remounting.

mod common;

use std::io::Read;

use common::{PackBuilder, touch};
use pakfs::{Error, FileSystem};

#[test]
fn test_unmount_invalidates_open_handles() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .deflated("maps/city.map", &b"entity ".repeat(5000))
        .write_to(dir.path(), "base.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();

    let mut file = fs.open("maps/city.map").unwrap().unwrap();
    let mut buf = [0u8; 128];
    // The handle works while the pack is mounted.
    assert!(file.read(&mut buf).unwrap() > 0);

    assert!(fs.unmount("base.pk4"));

    // The surviving handle fails cleanly, without crashing.
    let err = file.read(&mut buf).unwrap_err();
    let err = Error::from_io(err);
    assert!(
        matches!(&err, Error::Unmounted { container } if container == "base.pk4"),
        "expected Unmounted, got {err:?}"
    );

    // The path is gone from lookups.
    assert!(fs.open("maps/city.map").unwrap().is_none());
}

#[test]
fn test_unmount_leaves_other_containers_alone() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("a.txt", b"a")
        .write_to(dir.path(), "a.pk4");
    PackBuilder::new()
        .stored("z.txt", b"z")
        .write_to(dir.path(), "z.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("a.pk4")).unwrap();
    fs.mount_archive(dir.path().join("z.pk4")).unwrap();

    let mut surviving = fs.open("a.txt").unwrap().unwrap();
    assert!(fs.unmount("z.pk4"));

    // Handles from the remaining container keep working.
    let mut out = Vec::new();
    surviving.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"a");

    assert!(fs.open("z.txt").unwrap().is_none());
    assert!(fs.open("a.txt").unwrap().is_some());
}

#[test]
fn test_unmount_by_differently_cased_name() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("x.txt", b"x")
        .write_to(dir.path(), "Base.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("Base.pk4")).unwrap();

    // Container names compare with the same fold as precedence.
    assert!(fs.unmount("BASE.PK4"));
    assert_eq!(fs.mount_count(), 0);
}

#[test]
fn test_unknown_name_is_not_unmounted() {
    let mut fs = FileSystem::new();
    assert!(!fs.unmount("ghost.pk4"));
}

#[test]
fn test_equal_folded_names_conflict() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("x.txt", b"lower")
        .write_to(dir.path(), "base.pk4");

    let other = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("x.txt", b"upper")
        .write_to(other.path(), "BASE.PK4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();

    // Two containers whose names fold equal are indistinguishable for
    // precedence, so the second mount is rejected outright.
    let err = fs.mount_archive(other.path().join("BASE.PK4")).unwrap_err();
    assert!(matches!(err, Error::Mount { .. }));
    assert!(err.to_string().contains("collides"));
    assert_eq!(fs.mount_count(), 1);
    assert_eq!(fs.read("x.txt").unwrap().unwrap(), b"lower");
}

#[test]
fn test_remount_after_unmount() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("v.txt", b"one")
        .write_to(dir.path(), "mission.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("mission.pk4")).unwrap();
    assert!(fs.unmount("mission.pk4"));

    // Replace the pack on disk, then mount the same name again.
    PackBuilder::new()
        .stored("v.txt", b"two")
        .write_to(dir.path(), "mission.pk4");
    fs.mount_archive(dir.path().join("mission.pk4")).unwrap();

    assert_eq!(fs.read("v.txt").unwrap().unwrap(), b"two");
}

#[test]
fn test_unmount_directory_invalidates_loose_handles() {
    let loose = tempfile::tempdir().unwrap();
    touch(loose.path(), "notes.txt", b"loose notes");
    let name = loose.path().display().to_string();

    let mut fs = FileSystem::new();
    fs.mount_directory(loose.path()).unwrap();

    let mut file = fs.open("notes.txt").unwrap().unwrap();
    assert!(fs.unmount(&name));

    let mut buf = [0u8; 8];
    let err = Error::from_io(file.read(&mut buf).unwrap_err());
    assert!(matches!(err, Error::Unmounted { .. }));
}
