//! Per-face tracking session

use std::collections::HashMap;

use serde::Serialize;

use crate::config::OverlayConfig;
use crate::error::{MustachioError, OverlayError};
use crate::overlay::OverlayNode;
use crate::tracking::mesh::FaceMesh;

/// Anchor and overlay choice for one feature, one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorUpdate {
    /// Anchor position in mesh space [x, y, z]
    pub position: [f32; 3],
    /// Overlay image identifier currently selected for the feature
    pub overlay: String,
}

/// Computed overlay placements for one frame
///
/// Broadcast to consumers after every applied mesh packet. Features whose
/// geometry could not be resolved this frame are absent from the map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchorFrame {
    /// Feature name -> placement
    pub anchors: HashMap<String, AnchorUpdate>,
}

/// State for one tracked face instance.
///
/// Owns an [`OverlayNode`] per configured feature. Created when the tracker
/// first reports a face, dropped when tracking of that face ends; selector
/// state does not survive the session.
#[derive(Debug)]
pub struct FaceSession {
    nodes: Vec<OverlayNode>,
    offset_distance: f32,
}

impl FaceSession {
    /// Build a session from the overlay configuration.
    pub fn new(config: &OverlayConfig) -> Result<Self, MustachioError> {
        let nodes = config
            .features
            .iter()
            .map(|f| OverlayNode::new(&f.name, f.indices.clone(), f.options.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            nodes,
            offset_distance: config.offset_distance,
        })
    }

    /// Apply one frame of mesh data and compute overlay placements.
    ///
    /// A feature whose vertices are missing from the packet or whose centroid
    /// is degenerate is skipped for this frame rather than failing the whole
    /// frame; the consumer simply does not place that overlay.
    pub fn apply_mesh(&mut self, mesh: &FaceMesh<'_>) -> AnchorFrame {
        let mut frame = AnchorFrame::default();

        for node in &mut self.nodes {
            let vertices = match mesh.positions(node.indices()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Skipping feature {}: {}", node.name(), e);
                    continue;
                }
            };

            match node.update_position(&vertices, self.offset_distance) {
                Ok(anchor) => {
                    frame.anchors.insert(
                        node.name().to_string(),
                        AnchorUpdate {
                            position: anchor.to_array(),
                            overlay: node.current_overlay().to_string(),
                        },
                    );
                }
                Err(e) => {
                    tracing::debug!("Skipping feature {} this frame: {}", node.name(), e);
                }
            }
        }

        frame
    }

    /// Cycle the overlay for a feature and return the new identifier.
    pub fn advance(&mut self, feature: &str) -> Result<String, MustachioError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.name() == feature)
            .ok_or_else(|| OverlayError::UnknownFeature(feature.to_string()))?;

        Ok(node.next_overlay().to_string())
    }

    /// Names of all configured features.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name())
    }

    /// Currently selected overlay for a feature.
    pub fn current_overlay(&self, feature: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.name() == feature)
            .map(|n| n.current_overlay())
    }
}
