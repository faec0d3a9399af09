//! Face mesh packets from the external tracker

use glam::Vec3;
use serde::Deserialize;

use crate::error::TrackingError;

/// A single JSON packet from the face tracker
///
/// The tracker sends the full mesh every frame; feature bindings pick the
/// vertices they care about by index.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshPacket {
    /// Whether a face was detected this frame
    pub face_detected: bool,
    /// Mesh-space vertex positions [x, y, z] for the whole face mesh
    #[serde(default)]
    pub vertices: Vec<[f32; 3]>,
}

impl MeshPacket {
    /// View this packet's vertices as a face mesh, if a face was detected.
    pub fn mesh(&self) -> Option<FaceMesh<'_>> {
        self.face_detected.then(|| FaceMesh {
            vertices: &self.vertices,
        })
    }
}

/// Indexed access to one frame's mesh vertices
#[derive(Debug, Clone, Copy)]
pub struct FaceMesh<'a> {
    vertices: &'a [[f32; 3]],
}

impl<'a> FaceMesh<'a> {
    /// Number of vertices in the mesh
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Gather the positions for a feature's vertex indices.
    ///
    /// The tracker is an external process, so indices are validated against
    /// the packet rather than trusted.
    pub fn positions(&self, indices: &[usize]) -> Result<Vec<Vec3>, TrackingError> {
        indices
            .iter()
            .map(|&index| {
                self.vertices
                    .get(index)
                    .map(|&[x, y, z]| Vec3::new(x, y, z))
                    .ok_or(TrackingError::VertexIndexOutOfRange {
                        index,
                        vertex_count: self.vertices.len(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(face_detected: bool) -> String {
        serde_json::json!({
            "face_detected": face_detected,
            "vertices": [
                [0.0, -0.02, 0.05],
                [0.01, 0.0, 0.06],
                [0.0, 0.03, 0.08]
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_packet() {
        let pkt: MeshPacket = serde_json::from_str(&sample_json(true)).unwrap();

        assert!(pkt.face_detected);
        assert_eq!(pkt.vertices.len(), 3);
        assert!((pkt.vertices[2][1] - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_parse_no_face() {
        let json = r#"{"face_detected":false}"#;
        let pkt: MeshPacket = serde_json::from_str(json).unwrap();
        assert!(!pkt.face_detected);
        assert!(pkt.vertices.is_empty());
        assert!(pkt.mesh().is_none());
    }

    #[test]
    fn test_positions_by_index() {
        let pkt: MeshPacket = serde_json::from_str(&sample_json(true)).unwrap();
        let mesh = pkt.mesh().unwrap();

        let positions = mesh.positions(&[2, 0]).unwrap();
        assert_eq!(positions[0], Vec3::new(0.0, 0.03, 0.08));
        assert_eq!(positions[1], Vec3::new(0.0, -0.02, 0.05));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let pkt: MeshPacket = serde_json::from_str(&sample_json(true)).unwrap();
        let mesh = pkt.mesh().unwrap();

        let err = mesh.positions(&[0, 7]).unwrap_err();
        assert!(matches!(
            err,
            TrackingError::VertexIndexOutOfRange {
                index: 7,
                vertex_count: 3
            }
        ));
    }
}
