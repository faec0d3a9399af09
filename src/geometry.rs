//! Anchor placement math
//!
//! Places an overlay just outside the face mesh: average the feature's
//! vertices, then push the centroid outward along its own direction from the
//! mesh origin. Mesh coordinates are centered inside the head, so "away from
//! the origin" is "out of the face".

use glam::Vec3;

use crate::error::GeometryError;

/// Component-wise arithmetic mean of a vertex group.
///
/// Fails on an empty slice; a single vertex is its own centroid.
pub fn centroid(vertices: &[Vec3]) -> Result<Vec3, GeometryError> {
    if vertices.is_empty() {
        return Err(GeometryError::EmptyVertexList);
    }

    let sum: Vec3 = vertices.iter().copied().sum();
    Ok(sum / vertices.len() as f32)
}

/// Compute the overlay anchor position for a vertex group.
///
/// Returns `centroid + offset_distance * normalize(centroid)`. A centroid
/// exactly at the origin has no outward direction and is rejected as
/// [`GeometryError::DegenerateCentroid`] rather than normalized into NaN.
pub fn compute_anchor(vertices: &[Vec3], offset_distance: f32) -> Result<Vec3, GeometryError> {
    let center = centroid(vertices)?;

    let length = center.length();
    if length == 0.0 {
        return Err(GeometryError::DegenerateCentroid);
    }

    let direction = center / length;
    Ok(center + direction * offset_distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_centroid_single_vertex() {
        let v = Vec3::new(0.1, -0.2, 0.3);
        assert_eq!(centroid(&[v]).unwrap(), v);
    }

    #[test]
    fn test_centroid_average() {
        let c = centroid(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ])
        .unwrap();
        assert!(approx_eq(c, Vec3::splat(1.0 / 3.0)));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(centroid(&[]), Err(GeometryError::EmptyVertexList));
        assert_eq!(
            compute_anchor(&[], 0.01),
            Err(GeometryError::EmptyVertexList)
        );
    }

    #[test]
    fn test_origin_centroid_rejected() {
        assert_eq!(
            compute_anchor(&[Vec3::ZERO], 0.01),
            Err(GeometryError::DegenerateCentroid)
        );

        // Two vertices averaging to the origin
        assert_eq!(
            compute_anchor(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0)], 0.01),
            Err(GeometryError::DegenerateCentroid)
        );
    }

    #[test]
    fn test_single_vertex_anchor() {
        let v = Vec3::new(0.0, 0.03, 0.08);
        let d = 0.01;
        let anchor = compute_anchor(&[v], d).unwrap();
        assert!(approx_eq(anchor, v + v.normalize() * d));
    }

    #[test]
    fn test_anchor_offset_distance() {
        let vertices = [
            Vec3::new(0.01, 0.02, 0.08),
            Vec3::new(-0.01, 0.025, 0.081),
            Vec3::new(0.0, 0.03, 0.079),
        ];
        let d = 0.01;
        let anchor = compute_anchor(&vertices, d).unwrap();
        let center = centroid(&vertices).unwrap();
        assert!(((anchor - center).length() - d).abs() < EPS);
    }

    #[test]
    fn test_unit_diagonal_example() {
        let anchor = compute_anchor(
            &[
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            0.01,
        )
        .unwrap();
        // centroid (1/3, 1/3, 1/3), length ~0.577, direction ~(0.577, 0.577, 0.577)
        assert!(approx_eq(anchor, Vec3::splat(0.339_106_8)));
    }
}
