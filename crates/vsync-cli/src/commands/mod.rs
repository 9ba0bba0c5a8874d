//! Command handler modules for vsync-cli.
//!
//! Shared bootstrap (config loading, tracing) lives here; command-specific
//! logic lives in the submodules.

pub mod run;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, warn};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use vsync_config::{
    report_unused_keys, ConfigMode, LoadedConfig, SyncConfig, UnusedKeyPolicy,
    DEFAULT_CONFIG_PATH,
};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// Install the global subscriber: stderr always, plus `log_file` when given.
///
/// A log file that cannot be opened is reported on stderr and skipped.
pub fn init_tracing(log_file: Option<&Path>) {
    let file = log_file.map(|path| (path, open_log_file(path)));

    match file {
        Some((_, Ok(file))) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        Some((path, Err(e))) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
            warn!("log file {} disabled: {:#}", path.display(), e);
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Append-mode handle, creating parent directories as needed.
fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log dir failed: {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file failed: {}", path.display()))
}

fn read_config(config_paths: &[String]) -> Result<(LoadedConfig, SyncConfig)> {
    let path_refs: Vec<&str> = if config_paths.is_empty() {
        vec![DEFAULT_CONFIG_PATH]
    } else {
        config_paths.iter().map(|s| s.as_str()).collect()
    };

    let loaded = vsync_config::load_layered_yaml(&path_refs)?;
    let cfg = loaded.typed()?;
    Ok((loaded, cfg))
}

/// Load layered config (falling back to `config.yaml`) and start tracing.
///
/// Failures are logged to stderr before being returned so the operator sees
/// them even with stdout redirected.
pub fn load_config(config_paths: &[String], mode: ConfigMode) -> Result<(LoadedConfig, SyncConfig)> {
    let (loaded, cfg) = match read_config(config_paths) {
        Ok(pair) => pair,
        Err(e) => {
            init_tracing(None);
            error!("configuration error: {:#}", e);
            return Err(e);
        }
    };
    init_tracing(cfg.log.file.as_deref());

    let report = report_unused_keys(mode, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !report.is_clean() {
        warn!(
            mode = mode.as_str(),
            "CONFIG_UNUSED_KEYS unused_leaf_keys={}",
            report.unused_leaf_pointers.len()
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            warn!("  unused={}", p);
        }
    }

    Ok((loaded, cfg))
}
