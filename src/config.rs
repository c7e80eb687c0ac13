use crate::anchor::AnchorSettings;
use crate::sync::SyncSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub split_percent: u16,
    pub wrap: bool,
    pub search_case_sensitive: bool,
    pub tab_width: usize,
    pub log_level: String,
    pub red_highlight_style: String,
    pub sync: SyncConfig,
    pub anchor: AnchorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            split_percent: 50,
            wrap: true,
            search_case_sensitive: false,
            tab_width: 4,
            log_level: "info".to_string(),
            red_highlight_style: "background:#ff6b6b;color:#fff".to_string(),
            sync: SyncConfig::default(),
            anchor: AnchorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub throttle_ms: u64,
    pub suppression_ms: u64,
    pub echo_window_ms: u64,
    pub watchdog_ms: u64,
    pub smoothing: f64,
    pub frame_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 50,
            suppression_ms: 500,
            echo_window_ms: 500,
            watchdog_ms: 3000,
            smoothing: 0.2,
            frame_ms: 16,
        }
    }
}

impl SyncConfig {
    pub fn settings(&self) -> SyncSettings {
        SyncSettings {
            throttle: Duration::from_millis(self.throttle_ms),
            suppression: Duration::from_millis(self.suppression_ms),
            echo_window: Duration::from_millis(self.echo_window_ms),
            watchdog: Duration::from_millis(self.watchdog_ms.max(1)),
            smoothing: self.smoothing,
            frame: Duration::from_millis(self.frame_ms.max(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub lookahead: usize,
    pub min_score: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        let defaults = AnchorSettings::default();
        Self {
            lookahead: defaults.lookahead,
            min_score: defaults.min_score,
        }
    }
}

impl AnchorConfig {
    pub fn settings(&self) -> AnchorSettings {
        AnchorSettings {
            lookahead: self.lookahead.max(1),
            min_score: self.min_score,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    theme: Option<String>,
    split_percent: Option<u16>,
    wrap: Option<bool>,
    search_case_sensitive: Option<bool>,
    tab_width: Option<usize>,
    log_level: Option<String>,
    red_highlight_style: Option<String>,
    sync: Option<PartialSyncConfig>,
    anchor: Option<PartialAnchorConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialSyncConfig {
    throttle_ms: Option<u64>,
    suppression_ms: Option<u64>,
    echo_window_ms: Option<u64>,
    watchdog_ms: Option<u64>,
    smoothing: Option<f64>,
    frame_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialAnchorConfig {
    lookahead: Option<usize>,
    min_score: Option<usize>,
}

/// Take the user's value or fall back to the default, noting the gap.
fn or_default<T>(value: Option<T>, default: T, changed: &mut bool) -> T {
    match value {
        Some(v) => v,
        None => {
            *changed = true;
            default
        }
    }
}

impl PartialConfig {
    fn apply_defaults(self) -> (Config, bool) {
        let defaults = Config::default();
        let mut changed = false;

        let sync = match self.sync {
            Some(partial) => partial.apply_defaults(defaults.sync, &mut changed),
            None => {
                changed = true;
                defaults.sync
            }
        };
        let anchor = match self.anchor {
            Some(partial) => partial.apply_defaults(defaults.anchor, &mut changed),
            None => {
                changed = true;
                defaults.anchor
            }
        };
        let split_percent = or_default(self.split_percent, defaults.split_percent, &mut changed);

        (
            Config {
                theme: or_default(self.theme, defaults.theme, &mut changed),
                split_percent: split_percent.clamp(10, 90),
                wrap: or_default(self.wrap, defaults.wrap, &mut changed),
                search_case_sensitive: or_default(
                    self.search_case_sensitive,
                    defaults.search_case_sensitive,
                    &mut changed,
                ),
                tab_width: or_default(self.tab_width, defaults.tab_width, &mut changed),
                log_level: or_default(self.log_level, defaults.log_level, &mut changed),
                red_highlight_style: or_default(
                    self.red_highlight_style,
                    defaults.red_highlight_style,
                    &mut changed,
                ),
                sync,
                anchor,
            },
            changed,
        )
    }
}

impl PartialSyncConfig {
    fn apply_defaults(self, defaults: SyncConfig, changed: &mut bool) -> SyncConfig {
        SyncConfig {
            throttle_ms: or_default(self.throttle_ms, defaults.throttle_ms, changed),
            suppression_ms: or_default(self.suppression_ms, defaults.suppression_ms, changed),
            echo_window_ms: or_default(self.echo_window_ms, defaults.echo_window_ms, changed),
            watchdog_ms: or_default(self.watchdog_ms, defaults.watchdog_ms, changed),
            smoothing: or_default(self.smoothing, defaults.smoothing, changed),
            frame_ms: or_default(self.frame_ms, defaults.frame_ms, changed),
        }
    }
}

impl PartialAnchorConfig {
    fn apply_defaults(self, defaults: AnchorConfig, changed: &mut bool) -> AnchorConfig {
        AnchorConfig {
            lookahead: or_default(self.lookahead, defaults.lookahead, changed),
            min_score: or_default(self.min_score, defaults.min_score, changed),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("marksync").join("config.toml"))
}

pub fn ensure_config_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Read the config at `path`, creating it or filling in missing keys on disk.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        write_config_to(path, &cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let partial: PartialConfig =
        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
    let (cfg, changed) = partial.apply_defaults();
    if changed {
        write_config_to(path, &cfg)?;
    }
    Ok(cfg)
}

pub fn write_config_to(path: &Path, cfg: &Config) -> Result<()> {
    ensure_config_dir(path)?;
    let text = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn open_config_in_editor() -> Result<()> {
    let path = config_path()?;
    if !path.exists() {
        write_config_to(&path, &Config::default())?;
    }

    let editor = env::var("EDITOR").unwrap_or_else(|_| "nvim".to_string());
    let mut parts = match shell_words::split(&editor) {
        Ok(p) if !p.is_empty() => p,
        _ => vec![editor],
    };
    let cmd = parts.remove(0);
    let status = Command::new(cmd)
        .args(parts)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor for {}", path.display()))?;
    if !status.success() {
        anyhow::bail!("Editor exited with status {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[sync]"));
        assert!(written.contains("throttle_ms = 50"));
    }

    #[test]
    fn partial_file_keeps_user_values_and_fills_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"InspiredGitHub\"\n\n[sync]\nthrottle_ms = 80\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.theme, "InspiredGitHub");
        assert_eq!(cfg.sync.throttle_ms, 80);
        assert_eq!(cfg.sync.suppression_ms, 500);
        assert_eq!(cfg.anchor.lookahead, 20);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("suppression_ms = 500"));
        assert!(rewritten.contains("[anchor]"));
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn complete_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_config_to(&path, &Config::default()).unwrap();
        let custom = fs::read_to_string(&path).unwrap().replace("split_percent = 50", "split_percent = 60");
        fs::write(&path, &custom).unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.split_percent, 60);
        assert_eq!(fs::read_to_string(&path).unwrap(), custom);
    }

    #[test]
    fn invalid_toml_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = [").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn settings_convert_to_durations() {
        let cfg = Config::default();
        let sync = cfg.sync.settings();
        assert_eq!(sync, SyncSettings::default());
        assert_eq!(cfg.anchor.settings(), AnchorSettings::default());
    }
}
