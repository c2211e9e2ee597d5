//! Application orchestrator.
//! Loads and merges config, initializes logging, builds the services, and runs the
//! requested command.

use anyhow::{Context, Result, anyhow, bail};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc::channel;
use tracing::{debug, error, info};

use fs_guard::config::{create_template_config, load_config};
use fs_guard::fs_ops::{
    AtomicWriter, ForcedMover, JobOutcome, LockerRegistry, TrashDisposer, enumerate,
    is_ancestor, is_immediate_parent, is_prefix_contained, spawn_copy_tree, total_size,
};
use fs_guard::output as out;
use fs_guard::{CONFIG_ENV, Config, FsGuardError, default_config_path};

use crate::cli::{Args, Command, wants_trash};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    // Config housekeeping happens before logging is set up.
    if args.print_config {
        print_config(&args)?;
        return Ok(ExitCode::SUCCESS);
    }
    if args.init_config {
        let path = match args.config.clone().or_else(default_config_path) {
            Some(p) => p,
            None => bail!("cannot determine a config location; pass --config FILE"),
        };
        create_template_config(&path)?;
        out::print_success(&format!("template config written to {}", path.display()));
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = load_config(args.config.as_deref())?;
    let mut cfg = loaded.config;
    args.apply_overrides(&mut cfg);
    cfg.validate()?;

    let _guard = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json)?;
    debug!(config = ?cfg, source = ?loaded.source, "starting fs_guard");

    let Some(command) = args.command.clone() else {
        bail!("no command given (try --help)");
    };

    match run_command(&cfg, command) {
        Ok(code) => Ok(code),
        Err(e) => {
            match e.downcast_ref::<FsGuardError>() {
                Some(fe) => error!(code = fe.code(), kind = fe.kind(), error = %fe, "command failed"),
                None => error!(error = %format!("{e:#}"), "command failed"),
            }
            Err(e)
        }
    }
}

fn print_config(args: &Args) -> Result<()> {
    match (&args.config, std::env::var_os(CONFIG_ENV)) {
        (Some(p), _) => out::print_info(&format!("config (from --config): {}", p.display())),
        (None, Some(v)) => out::print_info(&format!("config (from {CONFIG_ENV}): {}", Path::new(&v).display())),
        (None, None) => match default_config_path() {
            Some(p) => out::print_info(&format!("config (default): {}", p.display())),
            None => out::print_warn("no default config location on this system"),
        },
    }
    let loaded = load_config(args.config.as_deref())?;
    if loaded.source.is_none() {
        out::print_info("no config file found; using defaults (create one with --init-config)");
    }
    let mut cfg = loaded.config;
    args.apply_overrides(&mut cfg);
    describe(&cfg);
    Ok(())
}

fn describe(cfg: &Config) {
    out::print_user(&format!("log_level = {}", cfg.log_level));
    out::print_user(&format!(
        "log_file = {}",
        cfg.log_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".into())
    ));
    out::print_user(&format!("use_trash = {}", cfg.use_trash));
    out::print_user(&format!("durability = {}", cfg.durability));
}

fn run_command(cfg: &Config, command: Command) -> Result<ExitCode> {
    let lockers = Arc::new(LockerRegistry::new());
    let mover = ForcedMover::new(lockers).with_durability(cfg.durability);

    match command {
        Command::Move { src, dst } => {
            if std::fs::symlink_metadata(&src).is_err() {
                bail!("source '{}' does not exist", src.display());
            }
            if !mover.force_move(&src, &dst) {
                bail!("could not move '{}' to '{}'", src.display(), dst.display());
            }
            info!(src = %src.display(), dst = %dst.display(), "move completed");
            out::print_success(&format!("moved {} -> {}", src.display(), dst.display()));
        }
        Command::Save { dir, name, input } => {
            let data = match &input {
                Some(p) => std::fs::read(p).with_context(|| format!("read input '{}'", p.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf).context("read stdin")?;
                    buf
                }
            };
            let writer = AtomicWriter::new(mover);
            if !writer.save_verified(&dir, &name, &data) {
                bail!("could not save verified data to '{}'", dir.join(&name).display());
            }
            out::print_success(&format!("saved {} bytes to {}", data.len(), dir.join(&name).display()));
        }
        Command::CopyTree { src, dst } => {
            let (tx, rx) = channel();
            let handle = spawn_copy_tree(src.clone(), dst.clone(), tx);
            let outcome = rx.recv().context("copy job vanished without reporting")?;
            handle.wait();
            match outcome {
                JobOutcome::Success(()) => {}
                JobOutcome::Failure(e) => return Err(e),
                JobOutcome::Cancelled => return Err(FsGuardError::Cancelled.into()),
                JobOutcome::Interrupted => return Err(FsGuardError::Interrupted.into()),
            }
            out::print_success(&format!("copied {} -> {}", src.display(), dst.display()));
        }
        Command::Delete { path, trash, no_trash } => {
            let use_trash = wants_trash(trash, no_trash, cfg);
            if std::fs::symlink_metadata(&path).is_err() {
                bail!("nothing at '{}'", path.display());
            }
            let disposer = TrashDisposer::detect();
            if !disposer.dispose(&path, use_trash)? {
                return Err(anyhow!("could not fully remove '{}'", path.display()));
            }
            let how = if use_trash { "trashed" } else { "deleted" };
            out::print_success(&format!("{how} {}", path.display()));
        }
        Command::Size { path } => {
            if !path.exists() {
                bail!("nothing at '{}'", path.display());
            }
            out::print_user(&total_size(&path).to_string());
        }
        Command::List { root, ext } => {
            if !root.is_dir() {
                bail!("'{}' is not a directory", root.display());
            }
            for f in enumerate(&root, ext.as_slice()) {
                out::print_user(&f.display().to_string());
            }
        }
        Command::Conflicts { a, b } => {
            let overlap = fs_guard::fs_ops::conflicts(&a, &b);
            out::print_user(if overlap { "conflict" } else { "no conflict" });
            if !overlap {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Check { parent, child } => {
            out::print_user(&format!("ancestor = {}", is_ancestor(&parent, &child)));
            out::print_user(&format!("immediate_parent = {}", is_immediate_parent(&parent, &child)?));
            out::print_user(&format!("contained = {}", is_prefix_contained(&parent, &child)?));
        }
    }
    Ok(ExitCode::SUCCESS)
}
