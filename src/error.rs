//! Error types for mustachio

use thiserror::Error;

/// Main error type for mustachio
#[derive(Error, Debug)]
pub enum MustachioError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anchor computation errors
///
/// Both variants indicate a caller contract violation, not a transient
/// condition; there is nothing to retry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Cannot compute an anchor from an empty vertex list")]
    EmptyVertexList,

    #[error("Centroid coincides with the origin, outward direction is undefined")]
    DegenerateCentroid,
}

/// Overlay selection and asset errors
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Overlay option list is empty")]
    NoOptions,

    #[error("No overlay is bound to feature: {0}")]
    UnknownFeature(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),
}

/// Mesh receiver errors
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Mesh receiver error: {0}")]
    Receiver(String),

    #[error("Mesh parse error: {0}")]
    Parse(String),

    #[error("Vertex index {index} out of range for mesh with {vertex_count} vertices")]
    VertexIndexOutOfRange { index: usize, vertex_count: usize },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for mustachio operations
pub type Result<T> = std::result::Result<T, MustachioError>;
