//! Configuration parsing and management for mustachio

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, MustachioError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub overlay: OverlayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MustachioError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, MustachioError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, MustachioError> {
        // Try config paths in order
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MustachioError> {
        if self.tracking.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracking.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        if self.tracking.lost_grace_frames == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracking.lost_grace_frames".to_string(),
                message: "Grace period must be at least one frame".to_string(),
            }
            .into());
        }

        if self.overlay.offset_distance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "overlay.offset_distance".to_string(),
                message: "Offset distance must be greater than 0".to_string(),
            }
            .into());
        }

        if self.overlay.plane_size <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "overlay.plane_size".to_string(),
                message: "Plane size must be greater than 0".to_string(),
            }
            .into());
        }

        if self.overlay.features.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "overlay.features".to_string(),
                message: "At least one feature must be configured".to_string(),
            }
            .into());
        }

        for feature in &self.overlay.features {
            if feature.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "overlay.features.name".to_string(),
                    message: "Feature name must not be empty".to_string(),
                }
                .into());
            }

            if feature.indices.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("overlay.features.{}.indices", feature.name),
                    message: "Feature must reference at least one mesh vertex".to_string(),
                }
                .into());
            }

            if feature.options.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("overlay.features.{}.options", feature.name),
                    message: "Feature must list at least one overlay option".to_string(),
                }
                .into());
            }
        }

        if !self.overlay.assets_dir.exists() {
            tracing::warn!(
                "Assets directory does not exist: {}",
                self.overlay.assets_dir.display()
            );
        }

        Ok(())
    }
}

/// Mesh tracking ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// UDP port to receive mesh packets on
    pub port: u16,
    /// Listen address for UDP socket
    pub listen_address: String,
    /// Consecutive no-face packets before the session is dropped
    pub lost_grace_frames: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            port: 12347,
            listen_address: "127.0.0.1".to_string(),
            lost_grace_frames: 30,
        }
    }
}

/// Overlay placement and selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Distance to push the overlay outward from the feature centroid, in mesh units
    pub offset_distance: f32,
    /// Edge length of the overlay plane, in mesh units
    pub plane_size: f32,
    /// Directory containing overlay image assets
    pub assets_dir: PathBuf,
    /// Tracked features and their overlay options
    pub features: Vec<FeatureConfig>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            offset_distance: 0.01,
            plane_size: 0.06,
            assets_dir: PathBuf::from("./assets"),
            features: vec![FeatureConfig::default()],
        }
    }
}

/// One tracked feature: a named vertex group plus its overlay option list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Feature name, e.g. "nose"
    pub name: String,
    /// Mesh vertex indices defining the feature's location
    pub indices: Vec<usize>,
    /// Ordered overlay image identifiers to cycle through
    pub options: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            name: "nose".to_string(),
            indices: vec![6],
            options: vec![
                "nose01".to_string(),
                "nose02".to_string(),
                "nose03".to_string(),
            ],
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("mustachio");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/mustachio");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/mustachio");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mustachio");
        }
    }

    PathBuf::from(".")
}
