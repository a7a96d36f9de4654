//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! core crates never see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (applied at the call-site, not here)
//! 2. Environment variables prefixed `PROPVAL__`, e.g.
//!    `PROPVAL__PRESENTER__FALLBACK_MESSAGE`
//! 3. Config file (`--config FILE`, else the platform config directory)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use config::{Config, Environment, File, FileFormat};
use propval_core::domain::DEFAULT_FALLBACK_MESSAGE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::ReplayFormat;

const ENV_PREFIX: &str = "PROPVAL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub presenter: PresenterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Shown for invalid fields that have no server message.
    pub fallback_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Default transcript format for `replay`: `human` or `json`.
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            presenter: PresenterConfig {
                fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            },
            output: OutputConfig {
                no_color: false,
                format: "human".into(),
            },
        }
    }
}

impl AppConfig {
    /// Layer defaults, the config file and the environment.
    ///
    /// An explicit `--config` file must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        debug!(path = %path.display(), required, "loading configuration");

        let settings = Config::builder()
            .add_source(
                Config::try_from(&Self::default()).context("Failed to encode default settings")?,
            )
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("Configuration has invalid values")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.presenter.fallback_message.trim().is_empty() {
            bail!("presenter.fallback_message must not be blank");
        }
        self.replay_format()?;
        Ok(())
    }

    /// `output.format` as a replay format.
    pub fn replay_format(&self) -> anyhow::Result<ReplayFormat> {
        self.output
            .format
            .parse()
            .map_err(|e| anyhow::anyhow!("output.format: {e}"))
    }

    /// Path to the default configuration file.
    ///
    /// Falls back to `.propval.toml` in the current directory when no home
    /// directory can be determined.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "propval", "propval")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".propval.toml"))
    }
}
