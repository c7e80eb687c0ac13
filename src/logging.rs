use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MARKSYNC_LOG";

pub fn log_path() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    Ok(base.join("marksync").join("marksync.log"))
}

/// `MARKSYNC_LOG` wins over the configured level.
fn filter(default_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log_level {default_level:?}")),
    }
}

/// Send tracing output to the log file. The terminal belongs to the UI.
pub fn init(default_level: &str) -> Result<PathBuf> {
    let path = log_path()?;
    init_at(&path, default_level)?;
    Ok(path)
}

pub fn init_at(path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install logger: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_reported() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        assert!(filter("info").is_ok());
        assert!(filter("marksync=bogus").is_err());
    }
}
