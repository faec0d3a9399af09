//! Per-feature overlay node

use glam::Vec3;

use crate::error::{GeometryError, OverlayError};
use crate::geometry;
use crate::overlay::OverlaySelector;

/// One overlay attached to a tracked facial feature.
///
/// Owns the feature's vertex binding and selector state for as long as the
/// face session that created it is alive. The anchor is recomputed from mesh
/// data every frame; only the selector index survives between frames.
#[derive(Debug, Clone)]
pub struct OverlayNode {
    /// Feature name, e.g. "nose"
    name: String,
    /// Mesh vertex indices defining the feature's location
    indices: Vec<usize>,
    /// Overlay image cycle
    selector: OverlaySelector,
    /// Anchor computed from the most recent frame, if any
    anchor: Option<Vec3>,
}

impl OverlayNode {
    /// Create a node for a named feature.
    ///
    /// Fails if the option list is empty; an empty index binding is rejected
    /// at config validation, before any node exists.
    pub fn new(name: &str, indices: Vec<usize>, options: Vec<String>) -> Result<Self, OverlayError> {
        Ok(Self {
            name: name.to_string(),
            indices,
            selector: OverlaySelector::new(options)?,
            anchor: None,
        })
    }

    /// Feature name this node is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mesh vertex indices this node reads each frame.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Currently selected overlay identifier.
    pub fn current_overlay(&self) -> &str {
        self.selector.current()
    }

    /// Cycle to the next overlay option and return it.
    pub fn next_overlay(&mut self) -> &str {
        self.selector.advance()
    }

    /// Anchor from the most recent successfully applied frame.
    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Recompute the anchor from this frame's feature vertices.
    pub fn update_position(
        &mut self,
        vertices: &[Vec3],
        offset_distance: f32,
    ) -> Result<Vec3, GeometryError> {
        let anchor = geometry::compute_anchor(vertices, offset_distance)?;
        self.anchor = Some(anchor);
        Ok(anchor)
    }

    /// Clear per-frame state when tracking is lost.
    pub fn reset_anchor(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> OverlayNode {
        OverlayNode::new(
            "nose",
            vec![6],
            vec!["nose01".to_string(), "nose02".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_node_cycles_options() {
        let mut node = node();
        assert_eq!(node.current_overlay(), "nose01");
        assert_eq!(node.next_overlay(), "nose02");
        assert_eq!(node.next_overlay(), "nose01");
    }

    #[test]
    fn test_update_position_sets_anchor() {
        let mut node = node();
        assert!(node.anchor().is_none());

        let anchor = node
            .update_position(&[Vec3::new(0.0, 0.0, 0.1)], 0.01)
            .unwrap();
        assert_eq!(node.anchor(), Some(anchor));
        assert!((anchor.z - 0.11).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_frame_keeps_last_anchor() {
        let mut node = node();
        let anchor = node
            .update_position(&[Vec3::new(0.0, 0.0, 0.1)], 0.01)
            .unwrap();

        assert!(node.update_position(&[Vec3::ZERO], 0.01).is_err());
        assert_eq!(node.anchor(), Some(anchor));
    }

    #[test]
    fn test_reset_anchor() {
        let mut node = node();
        node.update_position(&[Vec3::new(0.0, 0.0, 0.1)], 0.01)
            .unwrap();
        node.reset_anchor();
        assert!(node.anchor().is_none());
    }
}
