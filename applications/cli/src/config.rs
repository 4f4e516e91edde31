/// CLI configuration
use crate::error::{CliError, Result};
use neri_core::QualitySettings;
use neri_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "neri.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NeriConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub quality: QualitySettings,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Saved queue; unset disables persistence
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Where downloaded songs and lyrics live
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl NeriConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "config file {:?} not found",
                    path
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (NERI_PLAYBACK__STATE_FILE, ...)
        settings = settings.add_source(
            config::Environment::with_prefix("NERI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.max_consecutive_failures == 0 {
            return Err(CliError::Config(
                "playback.max_consecutive_failures must be at least 1".to_string(),
            ));
        }
        if self.playback.progress_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.progress_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime settings for the playback manager
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            max_consecutive_failures: self.playback.max_consecutive_failures,
            progress_interval: Duration::from_millis(self.playback.progress_interval_ms),
            state_file: self.playback.state_file.clone(),
            shuffle_seed: self.playback.shuffle_seed,
        }
    }
}

// Default values
impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            state_file: None,
            max_consecutive_failures: default_max_consecutive_failures(),
            progress_interval_ms: default_progress_interval_ms(),
            shuffle_seed: None,
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_max_consecutive_failures() -> u32 {
    neri_playback::DEFAULT_MAX_CONSECUTIVE_FAILURES
}

fn default_progress_interval_ms() -> u64 {
    neri_playback::DEFAULT_PROGRESS_INTERVAL.as_millis() as u64
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_log_filter() -> String {
    "neri_cli=info,neri_playback=info,neri_core=info".to_string()
}
