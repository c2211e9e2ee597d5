use std::fs;

use fs_guard::FsGuardError;
use fs_guard::fs_ops::{canonicalize, is_immediate_parent, is_prefix_contained, resolve_special_path};
use tempfile::tempdir;

#[test]
fn climbing_out_and_back_in_is_contained_but_not_immediate() {
    let td = tempdir().unwrap();
    let d = td.path().join("d");
    fs::create_dir_all(d.join("x")).unwrap();
    let child = d.join("x").join("..").join("x").join("f");

    assert!(is_prefix_contained(&d, &child).unwrap());
    assert!(!is_immediate_parent(&d, &child).unwrap());
    assert!(is_immediate_parent(&d.join("x"), &child).unwrap());
}

#[test]
fn sibling_with_shared_name_prefix_passes_string_containment() {
    let td = tempdir().unwrap();
    let foo = td.path().join("foo");
    let foobar = td.path().join("foobar");
    fs::create_dir_all(&foo).unwrap();
    fs::create_dir_all(&foobar).unwrap();

    assert!(is_prefix_contained(&foo, &foobar.join("f")).unwrap());
    assert!(!is_immediate_parent(&foo, &foobar.join("f")).unwrap());
}

#[cfg(unix)]
#[test]
fn symlinked_directory_resolves_to_target() {
    let td = tempdir().unwrap();
    let real = td.path().join("real");
    fs::create_dir(&real).unwrap();
    let link = td.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    assert_eq!(canonicalize(&link).unwrap(), canonicalize(&real).unwrap());
    assert!(is_immediate_parent(&real, &link.join("f")).unwrap());
    assert!(!is_prefix_contained(&link, &td.path().join("elsewhere").join("f")).unwrap());
}

#[test]
fn unknown_special_folder_is_a_typed_error() {
    match resolve_special_path("Attic>junk") {
        Err(FsGuardError::UnknownSpecialFolder(tag)) => assert_eq!(tag, "Attic"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn plain_text_resolves_against_working_dir() {
    let resolved = resolve_special_path("not-there-yet.txt").unwrap();
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("not-there-yet.txt"));
}
