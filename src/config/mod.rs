use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::schedule::{default_schedule, parse_blocks, Schedule};

pub mod themes;

pub use themes::Palette;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "DeepworkTui";
const APP_NAME: &str = "deepwork";

pub const CONFIG_ENV: &str = "DEEPWORK_CONFIG";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let default_cfg = AppConfig::default();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        tracing::info!(path = %self.paths.config_file.display(), "wrote default config");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_dirs.data_local_dir().join("state"));

        Ok(Self::rooted(config_dir, config_file, state_dir))
    }

    /// Lays out the log directory under `state_dir`.
    pub fn rooted(config_dir: PathBuf, config_file: PathBuf, state_dir: PathBuf) -> Self {
        let log_dir = state_dir.join("logs");
        Self {
            config_dir,
            config_file,
            state_dir,
            log_dir,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("deepwork.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.state_dir, &self.log_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeName,
    /// Scale of the schedule column: one rendered line per this many minutes.
    pub minutes_per_line: u32,
    pub clock_refresh_secs: u64,
    pub poll_interval_ms: u64,
    pub nudge_minutes: u32,
    /// Seed used when no `--blocks` is passed, e.g. `"07:00-09:00 Deep Work;09:00-09:30 Email"`.
    pub default_blocks: Option<String>,
}

const DEFAULT_MINUTES_PER_LINE: u32 = 30;
const DEFAULT_CLOCK_REFRESH_SECS: u64 = 60;
const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
const DEFAULT_NUDGE_MINUTES: u32 = 15;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            minutes_per_line: DEFAULT_MINUTES_PER_LINE,
            clock_refresh_secs: DEFAULT_CLOCK_REFRESH_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            nudge_minutes: DEFAULT_NUDGE_MINUTES,
            default_blocks: None,
        }
    }
}

impl AppConfig {
    fn post_load(&mut self) {
        if self.minutes_per_line == 0 {
            tracing::warn!("minutes_per_line must be positive, falling back to {DEFAULT_MINUTES_PER_LINE}");
            self.minutes_per_line = DEFAULT_MINUTES_PER_LINE;
        }
        if self.clock_refresh_secs == 0 {
            tracing::warn!("clock_refresh_secs must be positive, falling back to {DEFAULT_CLOCK_REFRESH_SECS}");
            self.clock_refresh_secs = DEFAULT_CLOCK_REFRESH_SECS;
        }
        if self.poll_interval_ms == 0 {
            tracing::warn!("poll_interval_ms must be positive, falling back to {DEFAULT_POLL_INTERVAL_MS}");
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }
    }

    pub fn clock_refresh(&self) -> Duration {
        Duration::from_secs(self.clock_refresh_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(&self.theme)
    }

    /// Resolves the opening schedule: explicit seed text first, then the
    /// configured default, then the built-in day. Blank seed text counts as absent.
    pub fn initial_schedule(&self, blocks_arg: Option<&str>) -> Result<Schedule> {
        if let Some(raw) = blocks_arg.filter(|raw| !raw.trim().is_empty()) {
            let blocks = parse_blocks(raw).context("parsing --blocks")?;
            return Ok(Schedule::new(blocks));
        }
        if let Some(raw) = self
            .default_blocks
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            let blocks = parse_blocks(raw).context("parsing default_blocks from config")?;
            return Ok(Schedule::new(blocks));
        }
        Ok(default_schedule())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    HighContrast,
}
