use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading a [`FilterConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Blur configuration: diffusion strength, step count and output precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Fraction of each cell's mass spread to its neighbours per step.
    pub blurring: f64,
    /// Number of blur steps applied per run.
    pub steps: usize,
    /// Decimal places used when printing grids.
    pub precision: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blurring: 0.12,
            steps: 1,
            precision: 2,
        }
    }
}

impl FilterConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading filter config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Warn about settings that are accepted but degrade the filter.
    /// Returns true when the blur factor lies in `[0, 1]`.
    pub fn validate(&self) -> bool {
        let in_range = (0.0..=1.0).contains(&self.blurring);
        if !in_range {
            tracing::warn!(
                blurring = self.blurring,
                "blur factor outside [0, 1]; kernel will have negative weights"
            );
        }
        in_range
    }
}
