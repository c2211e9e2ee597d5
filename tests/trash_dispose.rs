use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs_guard::{FsGuardError, TrashBackend, TrashDisposer};
use tempfile::tempdir;

/// Moves items into a local "bin" directory and remembers what it was given.
struct LocalBin {
    bin: PathBuf,
    seen: Arc<Mutex<Vec<PathBuf>>>,
}

impl TrashBackend for LocalBin {
    fn name(&self) -> &'static str {
        "local-bin"
    }

    fn move_to_trash(&self, path: &Path) -> io::Result<bool> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        let name = path.file_name().ok_or_else(|| io::Error::other("no name"))?;
        fs::rename(path, self.bin.join(name))?;
        Ok(true)
    }
}

#[test]
fn trash_receives_resolved_path() {
    let td = tempdir().unwrap();
    let bin = td.path().join("bin");
    fs::create_dir(&bin).unwrap();
    let victim = td.path().join("victim");
    fs::create_dir(&victim).unwrap();
    fs::write(victim.join("f"), b"x").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let disposer = TrashDisposer::new(Some(Box::new(LocalBin {
        bin: bin.clone(),
        seen: Arc::clone(&seen),
    })));

    // Go through a `..` so the resolution step is visible.
    let indirect = td.path().join("bin").join("..").join("victim");
    assert!(disposer.supports_trash());
    assert!(disposer.dispose(&indirect, true).unwrap());
    assert!(!victim.exists());
    assert!(bin.join("victim/f").exists());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], dunce::canonicalize(&bin).unwrap().parent().unwrap().join("victim"));
}

#[test]
fn permanent_delete_ignores_backend() {
    let td = tempdir().unwrap();
    let victim = td.path().join("gone");
    fs::create_dir_all(victim.join("deep")).unwrap();
    fs::write(victim.join("deep/f"), b"x").unwrap();

    let disposer = TrashDisposer::new(None);
    assert!(disposer.dispose(&victim, false).unwrap());
    assert!(!victim.exists());
}

#[test]
fn trash_without_backend_is_unsupported() {
    let td = tempdir().unwrap();
    let f = td.path().join("f");
    fs::write(&f, b"x").unwrap();

    let disposer = TrashDisposer::new(None);
    assert!(!disposer.supports_trash());
    let err = disposer.dispose(&f, true).unwrap_err();
    assert!(matches!(err, FsGuardError::TrashUnsupported));
    assert_eq!(err.code(), 20);
    assert!(f.exists());
}

#[test]
fn missing_path_is_false_not_error() {
    let td = tempdir().unwrap();
    let disposer = TrashDisposer::new(None);
    assert!(!disposer.dispose(&td.path().join("absent"), true).unwrap());
    assert!(!disposer.dispose(&td.path().join("absent"), false).unwrap());
}
