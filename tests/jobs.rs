use std::fs;
use std::sync::mpsc::channel;
use std::time::Duration;

use fs_guard::FsGuardError;
use fs_guard::fs_ops::{JobOutcome, spawn_copy_tree, spawn_delete_tree, spawn_job, spawn_total_size};
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(10);

#[test]
fn copy_then_measure_then_delete_in_background() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    fs::create_dir_all(src.join("n")).unwrap();
    fs::write(src.join("a"), [7u8; 5]).unwrap();
    fs::write(src.join("n/b"), [7u8; 6]).unwrap();
    let dst = td.path().join("dst");

    let (tx, rx) = channel();
    let h = spawn_copy_tree(src.clone(), dst.clone(), tx);
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), JobOutcome::Success(())));
    h.wait();
    assert!(h.is_finished());
    assert!(!h.cancel());

    let (tx, rx) = channel();
    spawn_total_size(dst.clone(), tx);
    match rx.recv_timeout(WAIT).unwrap() {
        JobOutcome::Success(n) => assert_eq!(n, 11),
        other => panic!("unexpected {other:?}"),
    }

    let (tx, rx) = channel();
    spawn_delete_tree(dst.clone(), tx);
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), JobOutcome::Success(true)));
    assert!(!dst.exists());
}

#[test]
fn copy_onto_existing_destination_fails() {
    let td = tempdir().unwrap();
    let (tx, rx) = channel();
    spawn_copy_tree(td.path().to_path_buf(), td.path().to_path_buf(), tx);
    match rx.recv_timeout(WAIT).unwrap() {
        JobOutcome::Failure(e) => assert!(format!("{e:#}").contains("already exists")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn typed_errors_and_panics_map_to_their_callbacks() {
    let (tx, rx) = channel::<JobOutcome<u8>>();
    spawn_job(|| Err(FsGuardError::Cancelled.into()), tx.clone());
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), JobOutcome::Cancelled));

    spawn_job(|| Err(FsGuardError::Interrupted.into()), tx.clone());
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), JobOutcome::Interrupted));

    let h = spawn_job(|| -> anyhow::Result<u8> { panic!("boom") }, tx);
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), JobOutcome::Interrupted));
    h.wait();
}
