//! Overlay asset resolution

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::OverlayConfig;
use crate::error::{MustachioError, OverlayError};

/// File extensions probed for each overlay identifier, in order.
const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Resolves overlay image identifiers to files on disk.
///
/// Identifiers come from feature option lists; a consumer receiving an
/// `AnchorFrame` asks this manager for the bytes to texture the overlay with.
#[derive(Debug)]
pub struct AssetManager {
    /// Base directory for assets
    base_dir: PathBuf,
    /// Cached asset paths (identifier -> absolute path)
    assets: HashMap<String, PathBuf>,
}

impl AssetManager {
    /// Create a new asset manager from configuration
    pub fn new(config: &OverlayConfig) -> Result<Self, MustachioError> {
        let base_dir = if config.assets_dir.is_absolute() {
            config.assets_dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&config.assets_dir)
        };

        let mut manager = Self {
            base_dir,
            assets: HashMap::new(),
        };

        let identifiers: Vec<String> = config
            .features
            .iter()
            .flat_map(|f| f.options.iter().cloned())
            .collect();
        manager.scan_assets(&identifiers);

        Ok(manager)
    }

    /// Scan the assets directory and cache paths for the given identifiers
    fn scan_assets(&mut self, identifiers: &[String]) {
        if !self.base_dir.exists() {
            tracing::warn!(
                "Assets directory does not exist: {}",
                self.base_dir.display()
            );
            return;
        }

        for id in identifiers {
            match self.probe(id) {
                Some(path) => {
                    tracing::debug!("Resolved overlay asset: {} -> {}", id, path.display());
                    self.assets.insert(id.clone(), path);
                }
                None => {
                    tracing::warn!("Overlay asset not found: {}", id);
                }
            }
        }
    }

    /// Try each known extension for an identifier
    fn probe(&self, id: &str) -> Option<PathBuf> {
        EXTENSIONS.iter().find_map(|ext| {
            let path = self.base_dir.join(format!("{}.{}", id, ext));
            path.exists().then_some(path)
        })
    }

    /// Get the path for an overlay identifier
    pub fn get_path(&self, id: &str) -> Option<&Path> {
        self.assets.get(id).map(|p| p.as_path())
    }

    /// Check if an identifier resolved to a file
    pub fn has_asset(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    /// All resolved identifiers
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(|s| s.as_str())
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get asset data (read file contents)
    pub fn get_data(&self, id: &str) -> Result<Vec<u8>, MustachioError> {
        let path = self
            .get_path(id)
            .ok_or_else(|| OverlayError::AssetNotFound(id.to_string()))?;

        std::fs::read(path)
            .map_err(|e| OverlayError::ImageLoad(format!("{}: {}", path.display(), e)).into())
    }

    /// Get the MIME type for an asset based on extension
    pub fn get_mime_type(&self, id: &str) -> Option<&'static str> {
        let path = self.get_path(id)?;
        let extension = path.extension()?.to_str()?;

        Some(match extension.to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use tempfile::TempDir;

    fn create_test_assets() -> (TempDir, OverlayConfig) {
        let dir = TempDir::new().unwrap();

        std::fs::write(dir.path().join("nose01.png"), b"fake png data").unwrap();
        std::fs::write(dir.path().join("nose02.jpg"), b"fake jpg data").unwrap();

        let mut config = OverlayConfig::default();
        config.assets_dir = dir.path().to_path_buf();
        config.features = vec![FeatureConfig::default()];

        (dir, config)
    }

    #[test]
    fn test_asset_resolution() {
        let (_dir, config) = create_test_assets();
        let manager = AssetManager::new(&config).unwrap();

        assert!(manager.has_asset("nose01"));
        assert!(manager.has_asset("nose02"));
        // Listed in config but no file on disk
        assert!(!manager.has_asset("nose03"));
    }

    #[test]
    fn test_extension_probe_order() {
        let (_dir, config) = create_test_assets();
        let manager = AssetManager::new(&config).unwrap();

        assert!(manager.get_path("nose01").unwrap().ends_with("nose01.png"));
        assert!(manager.get_path("nose02").unwrap().ends_with("nose02.jpg"));
    }

    #[test]
    fn test_get_data_and_mime() {
        let (_dir, config) = create_test_assets();
        let manager = AssetManager::new(&config).unwrap();

        assert_eq!(manager.get_data("nose01").unwrap(), b"fake png data");
        assert_eq!(manager.get_mime_type("nose01"), Some("image/png"));
        assert_eq!(manager.get_mime_type("nose02"), Some("image/jpeg"));
        assert!(manager.get_data("nose03").is_err());
    }
}
