use fs_guard::config::{create_template_config, load_config};
use fs_guard::{CONFIG_ENV, Durability, LogLevel, default_config_path};
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

struct EnvGuard;

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe { std::env::remove_var(CONFIG_ENV) };
    }
}

fn set_config_env(value: &std::path::Path) -> EnvGuard {
    unsafe { std::env::set_var(CONFIG_ENV, value) };
    EnvGuard
}

#[test]
#[serial]
fn env_var_names_the_config_file() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("custom.xml");
    fs::write(
        &cfg_path,
        "<config><log_level>info</log_level><durability>data</durability></config>",
    )
    .unwrap();
    let _g = set_config_env(&cfg_path);

    assert_eq!(default_config_path().unwrap(), cfg_path);
    let loaded = load_config(None).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(cfg_path.as_path()));
    assert_eq!(loaded.config.log_level, LogLevel::Info);
    assert_eq!(loaded.config.durability, Durability::Data);
}

#[test]
#[serial]
fn env_var_naming_a_directory_means_config_xml_inside() {
    let td = tempdir().unwrap();
    let _g = set_config_env(td.path());
    assert_eq!(default_config_path().unwrap(), td.path().join("config.xml"));

    // Nothing there yet: defaults, no source.
    let loaded = load_config(None).unwrap();
    assert!(loaded.source.is_none());
    assert_eq!(loaded.config, fs_guard::Config::default());
}

#[test]
#[serial]
fn template_written_to_env_location_loads_back() {
    let td = tempdir().unwrap();
    let base = dunce::canonicalize(td.path()).unwrap();
    let _g = set_config_env(&base);
    let path = default_config_path().unwrap();

    create_template_config(&path).unwrap();
    assert!(create_template_config(&path).is_err(), "must not overwrite");

    let loaded = load_config(None).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.config.log_level, LogLevel::Normal);
    assert!(!loaded.config.use_trash);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

#[test]
#[serial]
fn explicit_missing_config_is_an_error() {
    let td = tempdir().unwrap();
    assert!(load_config(Some(&td.path().join("absent.xml"))).is_err());
}

#[test]
#[serial]
fn malformed_config_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("bad.xml");
    fs::write(&cfg_path, "<config><use_trash>maybe</use_trash></config>").unwrap();
    let _g = set_config_env(&cfg_path);
    assert!(load_config(None).is_err());
}
