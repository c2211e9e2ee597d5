use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use fs_guard::{AtomicWriter, ForcedMover, LockerRegistry, SettingsFile};
use tempfile::tempdir;

fn settings(path: &std::path::Path) -> SettingsFile {
    SettingsFile::new(path, AtomicWriter::new(ForcedMover::new(Arc::new(LockerRegistry::new()))))
}

#[test]
fn store_then_load_keeps_awkward_values() {
    let td = tempdir().unwrap();
    let file = settings(&td.path().join("app.props"));
    assert!(file.load().unwrap().is_empty());

    let mut entries = BTreeMap::new();
    entries.insert("window.size".to_string(), "800x600".to_string());
    entries.insert("key with=equals".to_string(), "line one\nline two".to_string());
    entries.insert("path".to_string(), r"C:\temp\x".to_string());
    entries.insert("empty".to_string(), String::new());
    file.store(&entries).unwrap();

    assert_eq!(file.load().unwrap(), entries);
    let text = fs::read_to_string(file.path()).unwrap();
    assert!(text.starts_with("# fs_guard settings"));
}

#[test]
fn hand_written_file_is_understood() {
    let td = tempdir().unwrap();
    let path = td.path().join("hand.props");
    fs::write(&path, "# comment\n! also a comment\n\nname = fs guard\ncolour:blue\nname=second\n").unwrap();

    let loaded = settings(&path).load().unwrap();
    assert_eq!(loaded.get("name").map(String::as_str), Some("second"));
    assert_eq!(loaded.get("colour").map(String::as_str), Some("blue"));
    assert_eq!(loaded.len(), 2);
}

#[test]
fn store_into_missing_directory_fails() {
    let td = tempdir().unwrap();
    let file = settings(&td.path().join("nope/app.props"));
    let mut entries = BTreeMap::new();
    entries.insert("k".to_string(), "v".to_string());
    assert!(file.store(&entries).is_err());
}
