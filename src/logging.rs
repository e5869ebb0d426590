use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Env, Target};

/// Route `log` output to an append-only file. Writing to stderr would tear
/// through the alternate screen while the TUI is up. `RUST_LOG` still
/// overrides the default `info` filter.
pub fn init(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    env_logger::Builder::from_env(Env::new().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")
}
