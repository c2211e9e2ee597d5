use assert_fs::TempDir;
use fs_guard::fs_ops::{conflicts, copy_tree, delete_tree, enumerate, total_size};
use std::fs;
use std::path::PathBuf;

fn sorted(mut v: Vec<PathBuf>) -> Vec<PathBuf> {
    v.sort();
    v
}

#[test]
fn enumerate_filters_by_extension_case_insensitively() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("a.txt"), b"a").unwrap();
    fs::write(root.join("b.log"), b"b").unwrap();
    fs::write(root.join("sub/c.TXT"), b"c").unwrap();
    fs::write(root.join("sub/deeper/d.md"), b"d").unwrap();

    let txt = sorted(enumerate(&root, &["txt"]));
    assert_eq!(txt, sorted(vec![root.join("a.txt"), root.join("sub/c.TXT")]));

    let none: [&str; 0] = [];
    assert_eq!(enumerate(&root, &none).len(), 4);
    assert!(enumerate(&root.join("a.txt"), &none).is_empty());
}

#[test]
fn enumerate_lists_shallow_files_first() {
    let td = TempDir::new().unwrap();
    let root = td.path();
    fs::create_dir_all(root.join("z")).unwrap();
    fs::write(root.join("z/deep.txt"), b"1").unwrap();
    fs::write(root.join("top.txt"), b"2").unwrap();

    let files = enumerate(root, &["txt"]);
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("top.txt"));
    assert!(files[1].ends_with("deep.txt"));
}

#[test]
fn copy_then_size_then_delete() {
    let td = TempDir::new().unwrap();
    let src = td.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("one.bin"), [0u8; 10]).unwrap();
    fs::write(src.join("nested/two.bin"), [1u8; 32]).unwrap();
    let dst = td.path().join("dst");

    copy_tree(&src, &dst).unwrap();
    assert_eq!(fs::read(dst.join("one.bin")).unwrap(), [0u8; 10]);
    assert_eq!(fs::read(dst.join("nested/two.bin")).unwrap(), [1u8; 32]);
    assert!(dst.join("empty").is_dir());
    assert_eq!(total_size(&dst), 42);

    let err = copy_tree(&src, &dst).unwrap_err();
    assert!(format!("{err:#}").contains("exists"), "got: {err:#}");

    assert!(delete_tree(&dst));
    assert!(!dst.exists());
    assert_eq!(total_size(&src), 42);
}

#[test]
fn copy_of_a_file_is_refused() {
    let td = TempDir::new().unwrap();
    let f = td.path().join("f");
    fs::write(&f, b"x").unwrap();
    assert!(copy_tree(&f, &td.path().join("out")).is_err());
    assert!(!td.path().join("out").exists());
}

#[cfg(unix)]
#[test]
fn delete_never_reaches_outside_through_symlinks() {
    let td = TempDir::new().unwrap();
    let outside = td.path().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("precious"), b"keep").unwrap();

    let root = td.path().join("root");
    fs::create_dir_all(root.join("inner")).unwrap();
    fs::write(root.join("inner/junk"), b"x").unwrap();
    std::os::unix::fs::symlink(&outside, root.join("inner/escape")).unwrap();

    // The escaping link is skipped, so the root cannot be emptied.
    assert!(!delete_tree(&root));
    assert_eq!(fs::read(outside.join("precious")).unwrap(), b"keep");
    assert!(!root.join("inner/junk").exists());
    assert!(root.exists());
}

#[cfg(unix)]
#[test]
fn delete_unlinks_dangling_reference() {
    let td = TempDir::new().unwrap();
    let root = td.path().join("root");
    fs::create_dir_all(root.join("inner")).unwrap();
    let gone = td.path().join("outside-never-created");
    std::os::unix::fs::symlink(&gone, root.join("inner/dangling")).unwrap();

    assert!(delete_tree(&root));
    assert!(!root.exists());
    assert!(!gone.exists());
}

#[cfg(unix)]
#[test]
fn copy_skips_link_back_into_source() {
    let td = TempDir::new().unwrap();
    let src = td.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("f"), b"x").unwrap();
    std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();
    let dst = td.path().join("dst");

    copy_tree(&src, &dst).unwrap();
    let none: [&str; 0] = [];
    assert_eq!(enumerate(&dst, &none), vec![dst.join("f")]);
}

#[test]
fn delete_of_missing_path_fails() {
    let td = TempDir::new().unwrap();
    assert!(!delete_tree(&td.path().join("nothing/here")));
}

#[test]
fn overlap_detection() {
    let td = TempDir::new().unwrap();
    let root = td.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::create_dir_all(root.join("c")).unwrap();
    fs::write(root.join("a/b/f"), b"x").unwrap();
    fs::write(root.join("c/g"), b"y").unwrap();

    assert!(conflicts(&root.join("a"), &root.join("a")));
    assert!(conflicts(&root.join("a"), &root.join("a/b/f")));
    assert!(conflicts(&root.join("a/b/f"), &root.join("a")));
    assert!(!conflicts(&root.join("a"), &root.join("c")));
}
