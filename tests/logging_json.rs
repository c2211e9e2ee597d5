use assert_cmd::cargo;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(base: &Path, args: &[&str]) -> Output {
    let me = cargo::cargo_bin!("fs_guard");
    Command::new(me)
        .env("FS_GUARD_CONFIG", base.join("no-config.xml"))
        .args(args)
        .output()
        .expect("spawn binary")
}

/// JSON objects among the stderr lines; plain `error:` lines are skipped.
fn json_lines(out: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&out.stderr)
        .lines()
        .filter(|l| l.trim_start().starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("valid json log line"))
        .collect()
}

#[test]
fn failure_is_logged_as_json_error() {
    let td = tempdir().unwrap();
    let missing = td.path().join("missing");
    let out = run(td.path(), &["--json", "size", missing.to_str().unwrap()]);
    assert!(!out.status.success());

    let lines = json_lines(&out);
    let err = lines
        .iter()
        .find(|v| v["level"] == "ERROR")
        .unwrap_or_else(|| panic!("no ERROR line in {lines:?}"));
    assert_eq!(err["fields"]["message"], "command failed");
    assert!(err["fields"]["error"].as_str().unwrap().contains("nothing at"));
}

#[test]
fn debug_level_emits_debug_lines() {
    let td = tempdir().unwrap();
    let f = td.path().join("f");
    fs::write(&f, b"abc").unwrap();
    let out = run(td.path(), &["--json", "-d", "size", f.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(json_lines(&out).iter().any(|v| v["level"] == "DEBUG"));
}

#[test]
fn quiet_level_suppresses_info() {
    let td = tempdir().unwrap();
    let src = td.path().join("a");
    fs::write(&src, b"abc").unwrap();
    let out = run(
        td.path(),
        &["--json", "--log-level", "quiet", "move", src.to_str().unwrap(), td.path().join("b").to_str().unwrap()],
    );
    assert!(out.status.success());
    assert!(json_lines(&out).iter().all(|v| v["level"] == "ERROR"));
}

#[cfg(target_os = "linux")]
#[test]
fn typed_error_carries_code_and_kind() {
    let td = tempdir().unwrap();
    let f = td.path().join("f");
    fs::write(&f, b"x").unwrap();
    let out = run(td.path(), &["--json", "delete", "--trash", f.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(20));

    let lines = json_lines(&out);
    let err = lines.iter().find(|v| v["level"] == "ERROR").expect("error line");
    assert_eq!(err["fields"]["code"], 20);
    assert_eq!(err["fields"]["kind"], "trash_unsupported");
}

#[test]
fn log_file_receives_lines() {
    let td = tempdir().unwrap();
    let log = dunce::canonicalize(td.path()).unwrap().join("run.log");
    let f = td.path().join("f");
    fs::write(&f, b"abc").unwrap();
    let out = run(
        td.path(),
        &["-d", "--log-file", log.to_str().unwrap(), "size", f.to_str().unwrap()],
    );
    assert!(out.status.success());
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("starting fs_guard"));
}
