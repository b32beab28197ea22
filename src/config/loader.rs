// src/config/loader.rs
//! Layered settings loader
//!
//! Defaults are overlaid by each existing TOML file in order, then by
//! `SPECTRAL_*` environment variables. The merged result is validated
//! before it is handed out.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{constants::paths, DspSettings};
use crate::error::{DspError, DspErrorBuilder};

/// Settings loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl ConfigError {
    /// Short machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound(_) => "file_not_found",
            ConfigError::ParseError(_) => "parse",
            ConfigError::ValidationError(_) => "validation",
            ConfigError::IoError(_) => "io",
        }
    }
}

impl From<ConfigError> for DspError {
    fn from(err: ConfigError) -> Self {
        DspErrorBuilder::new("config_loader", "load")
            .info("kind", err.kind())
            .configuration(&err.to_string())
    }
}

/// Settings loader over an ordered list of candidate files
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader over the default file locations
    pub fn new() -> Self {
        Self::with_paths(vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ])
    }

    /// Create loader with custom paths; later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment variable prefix (default `SPECTRAL_`)
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate settings
    pub fn load(&self) -> Result<DspSettings, ConfigError> {
        let mut merged = toml::Value::try_from(DspSettings::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            match self.load_config_file(config_path) {
                Ok(file_config) => {
                    debug!(path = %config_path.display(), "merging settings file");
                    merge_toml_values(&mut merged, file_config);
                }
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged);

        let settings: DspSettings = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;

        settings.validate().map_err(ConfigError::ValidationError)?;

        info!(
            sample_rate_hz = settings.sample_rate_hz,
            sample_size = settings.sample_size,
            window = ?settings.window,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Validate a single settings file without merging it
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> Result<DspSettings, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: DspSettings = toml::from_str(&content)?;
        settings.validate().map_err(ConfigError::ValidationError)?;
        Ok(settings)
    }

    /// Write settings to a file as pretty TOML
    pub fn export<P: AsRef<Path>>(&self, settings: &DspSettings, path: P) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_config_file(&self, path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;

        Ok(config)
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        let toml::Value::Table(table) = config else {
            return;
        };

        for (key, value) in std::env::vars() {
            if let Some(field) = key.strip_prefix(&self.env_prefix) {
                let field = field.to_lowercase();
                debug!(%field, "environment override");
                table.insert(field, parse_env_value(&value));
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}
