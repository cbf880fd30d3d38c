//! Tests for merged directory enumeration.

mod common;

use common::{PackBuilder, touch};
use pakfs::FileSystem;

#[test]
fn test_enumeration_deduplicates_across_containers() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("textures/x.tga", b"aa")
        .write_to(dir.path(), "a.pk4");
    PackBuilder::new()
        .stored("textures/x.tga", b"zzzz")
        .write_to(dir.path(), "z.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("a.pk4")).unwrap();
    fs.mount_archive(dir.path().join("z.pk4")).unwrap();

    let entries = fs.read_dir("textures");
    assert_eq!(entries.len(), 1, "x.tga must appear exactly once");
    assert_eq!(entries[0].name(), "x.tga");
    // Metadata comes from the winning container.
    assert_eq!(entries[0].source(), "z.pk4");
    assert_eq!(entries[0].size(), 4);
}

#[test]
fn test_enumeration_merges_distinct_names() {
    let dir = tempfile::tempdir().unwrap();
    let loose = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("def/ai.def", b"ai")
        .stored("def/weapons/bow.def", b"bow")
        .write_to(dir.path(), "base.pk4");
    touch(loose.path(), "def/custom.def", b"custom");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();
    fs.mount_directory(loose.path()).unwrap();

    let entries = fs.read_dir("def");
    let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["ai.def", "custom.def", "weapons"]);

    let weapons = entries.iter().find(|e| e.name() == "weapons").unwrap();
    assert!(weapons.is_dir());
    assert!(entries.iter().find(|e| e.name() == "ai.def").unwrap().is_file());
}

#[test]
fn test_enumeration_deduplicates_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("models/Chair.lwo", b"upper")
        .write_to(dir.path(), "z.pk4");
    PackBuilder::new()
        .stored("models/chair.lwo", b"lower")
        .write_to(dir.path(), "a.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("a.pk4")).unwrap();
    fs.mount_archive(dir.path().join("z.pk4")).unwrap();

    let entries = fs.read_dir("models");
    assert_eq!(entries.len(), 1);
    // The winner (z.pk4) supplies the reported spelling.
    assert_eq!(entries[0].name(), "Chair.lwo");
    assert_eq!(entries[0].source(), "z.pk4");
}

#[test]
fn test_root_listing() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("autoexec.cfg", b"seta com_showFPS 1")
        .stored("textures/a.tga", b"t")
        .write_to(dir.path(), "base.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();

    let names: Vec<String> = fs
        .read_dir("")
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["autoexec.cfg", "textures"]);

    // "/" is the same listing.
    let slash: Vec<String> = fs
        .read_dir("/")
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(slash, names);
}

#[test]
fn test_unknown_directory_is_empty() {
    let fs = FileSystem::new();
    assert!(fs.read_dir("no/such/place").is_empty());
}

#[test]
fn test_for_each_file_merges_and_deduplicates() {
    let dir = tempfile::tempdir().unwrap();
    let loose = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("skins/guard.skin", b"pack")
        .stored("skins/old/rusty.skin", b"pack")
        .write_to(dir.path(), "base.pk4");
    touch(loose.path(), "skins/guard.skin", b"loose");
    touch(loose.path(), "skins/extra.skin", b"loose");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();
    fs.mount_directory(loose.path()).unwrap();

    let mut visited = Vec::new();
    fs.for_each_file("skins", usize::MAX, |name| visited.push(name.to_string()));
    assert_eq!(visited, vec!["extra.skin", "guard.skin", "old/rusty.skin"]);
}

#[test]
fn test_files_with_extension_filters() {
    let dir = tempfile::tempdir().unwrap();
    PackBuilder::new()
        .stored("fonts/mason.dat", b"d")
        .stored("fonts/mason.tga", b"t")
        .stored("fonts/carleton.tga", b"t")
        .write_to(dir.path(), "base.pk4");

    let mut fs = FileSystem::new();
    fs.mount_archive(dir.path().join("base.pk4")).unwrap();

    assert_eq!(
        fs.files_with_extension("fonts", "tga", 1),
        vec!["carleton.tga", "mason.tga"]
    );
    assert_eq!(fs.files_with_extension("fonts", "*", 1).len(), 3);
    assert!(fs.files_with_extension("fonts", "ogg", 1).is_empty());
}
