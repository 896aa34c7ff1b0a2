//! Experiment configuration.
//!
//! Values are layered, highest precedence first:
//! 1. Command-line flags
//! 2. Environment variables (`QCHANNELS_` prefix)
//! 3. The YAML file given with `--config`, or `~/.qchannels/config.yaml`
//! 4. Defaults

use std::path::{Path, PathBuf};

use qchannels_hal::BackendConfig;
use qchannels_tomography::LauncherConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings shared by every experiment subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Registered backend name.
    pub backend: String,

    /// Shots per circuit.
    pub shots: u32,

    /// Credit cap forwarded to hardware backends.
    pub max_credits: Option<u32>,

    /// Chunk size override; the backend's limit is used when unset.
    pub max_jobs_per_chunk: Option<usize>,

    /// Seed for simulator sampling.
    pub seed: Option<u64>,

    /// Deterministic simulator counts.
    pub exact: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let launcher = LauncherConfig::default();
        Self {
            backend: "simulator".into(),
            shots: launcher.shots,
            max_credits: launcher.max_credits,
            max_jobs_per_chunk: launcher.max_jobs_per_chunk,
            seed: None,
            exact: false,
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let config: ExperimentConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// `~/.qchannels/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qchannels").join("config.yaml"))
    }

    /// File (explicit, else the default path when it exists, else
    /// defaults), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };

        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QCHANNELS_*` variables from the process environment.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Variables that are absent leave the
    /// corresponding fields unchanged.
    pub fn merge_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("QCHANNELS_BACKEND") {
            self.backend = v;
        }
        if let Some(v) = lookup("QCHANNELS_SHOTS") {
            self.shots = parse_var("QCHANNELS_SHOTS", &v)?;
        }
        if let Some(v) = lookup("QCHANNELS_MAX_CREDITS") {
            self.max_credits = match v.as_str() {
                "" | "none" => None,
                _ => Some(parse_var("QCHANNELS_MAX_CREDITS", &v)?),
            };
        }
        if let Some(v) = lookup("QCHANNELS_MAX_JOBS_PER_CHUNK") {
            self.max_jobs_per_chunk = Some(parse_var("QCHANNELS_MAX_JOBS_PER_CHUNK", &v)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.trim().is_empty() {
            return Err(ConfigError::ValidationError("backend name is empty".into()));
        }
        if self.shots == 0 {
            return Err(ConfigError::ValidationError("shots must be positive".into()));
        }
        if self.max_jobs_per_chunk == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_jobs_per_chunk must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Launcher settings for this configuration.
    pub fn launcher_config(&self) -> LauncherConfig {
        LauncherConfig {
            shots: self.shots,
            max_credits: self.max_credits,
            max_jobs_per_chunk: self.max_jobs_per_chunk,
        }
    }

    /// Backend construction settings. Simulator options travel as extras.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new(&self.backend);
        if let Some(seed) = self.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        if self.exact {
            config = config.with_extra("exact", serde_json::json!(true));
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvError {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value '{value}' for {key}")]
    EnvError { key: String, value: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}
