//! Loading, validating and writing [`PipelineConfig`] TOML files.

use std::path::{Path, PathBuf};

use locum_map_analytics_models::PipelineConfig;

/// Errors that can occur while reading or writing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly typed keys.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values parse but make no sense together.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Checks that ranges are ordered, steps are positive and bands ascend.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first problem found.
pub fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
    let bbox = &config.bounding_box;
    if !bbox.latitude.is_valid() {
        return Err(invalid(format!(
            "latitude range {}..{} is not ordered",
            bbox.latitude.min, bbox.latitude.max
        )));
    }
    if !bbox.longitude.is_valid() {
        return Err(invalid(format!(
            "longitude range {}..{} is not ordered",
            bbox.longitude.min, bbox.longitude.max
        )));
    }

    if config.histogram_step == 0 {
        return Err(invalid("histogram_step must be positive"));
    }
    if config.zoomed_histogram_step == 0 {
        return Err(invalid("zoomed_histogram_step must be positive"));
    }

    if !config.scatter_max_travel_radius.is_finite() || config.scatter_max_travel_radius < 0.0 {
        return Err(invalid("scatter_max_travel_radius must be a non-negative number"));
    }

    if config.bands.catch_all.is_empty() || config.bands.bands.iter().any(|b| b.label.is_empty()) {
        return Err(invalid("band labels cannot be empty"));
    }
    if config
        .bands
        .bands
        .windows(2)
        .any(|w| w[0].upper_bound >= w[1].upper_bound)
    {
        return Err(invalid("band upper bounds must be strictly ascending"));
    }

    Ok(())
}

/// Parses and validates a TOML config. Missing keys take their default.
///
/// # Errors
///
/// Returns [`ConfigError`] if the TOML is malformed or fails validation.
pub fn parse_config(toml_str: &str) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = toml::from_str(toml_str)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and validates the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Serializes `config` as pretty TOML.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn to_toml(config: &PipelineConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}
