//! Surface normal estimation for region aggregates.
//!
//! Normals are estimated by principal component analysis of the point
//! covariance: the eigenvector of the smallest eigenvalue is the normal of the
//! best-fit plane, and the ratio of that eigenvalue to the eigenvalue sum is the
//! surface curvature.

use nalgebra::{Matrix3, Vector3};

/// Estimate the plane normal and curvature of a point set.
///
/// Returns `None` when fewer than three points are given or the covariance is
/// degenerate (all points coincide).
pub fn estimate_normal(positions: &[[f32; 3]]) -> Option<(Vector3<f32>, f32)> {
    if positions.len() < 3 {
        return None;
    }

    let centroid = mean_position(positions);
    let mut covariance = Matrix3::<f32>::zeros();
    for p in positions {
        let d = Vector3::from(*p) - centroid;
        covariance += d * d.transpose();
    }
    covariance /= positions.len() as f32;

    let eigen = covariance.symmetric_eigen();
    let sum: f32 = eigen.eigenvalues.iter().sum();
    if !sum.is_finite() || sum <= f32::EPSILON {
        return None;
    }

    let (min_idx, min_value) = eigen
        .eigenvalues
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let normal = eigen.eigenvectors.column(min_idx).into_owned();
    let norm = normal.norm();
    if norm <= f32::EPSILON {
        return None;
    }

    Some((normal / norm, (min_value / sum).max(0.0)))
}

/// Flip `normal` so that it faces `viewpoint` as seen from `point`.
pub fn flip_towards_viewpoint(
    point: &Vector3<f32>,
    viewpoint: &Vector3<f32>,
    normal: Vector3<f32>,
) -> Vector3<f32> {
    if (viewpoint - point).dot(&normal) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// Arithmetic mean of a set of positions (origin when empty).
pub fn mean_position(positions: &[[f32; 3]]) -> Vector3<f32> {
    if positions.is_empty() {
        return Vector3::zeros();
    }
    let mut sum = Vector3::<f64>::zeros();
    for p in positions {
        sum += Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64);
    }
    let mean = sum / positions.len() as f64;
    Vector3::new(mean.x as f32, mean.y as f32, mean.z as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_points_have_axis_normal_and_zero_curvature() {
        let points = [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let (normal, curvature) = estimate_normal(&points).expect("plane normal");
        assert!((normal.z.abs() - 1.0).abs() < 1e-5, "normal {normal:?}");
        assert!(curvature.abs() < 1e-5);
    }

    #[test]
    fn too_few_points_yield_none() {
        assert!(estimate_normal(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).is_none());
    }

    #[test]
    fn coincident_points_yield_none() {
        let points = [[2.0, 2.0, 2.0]; 5];
        assert!(estimate_normal(&points).is_none());
    }

    #[test]
    fn flip_faces_viewpoint() {
        let point = Vector3::new(0.0, 0.0, 2.0);
        let origin = Vector3::zeros();
        let away = Vector3::new(0.0, 0.0, 1.0);
        let flipped = flip_towards_viewpoint(&point, &origin, away);
        assert_eq!(flipped, Vector3::new(0.0, 0.0, -1.0));

        let facing = Vector3::new(0.0, 0.0, -1.0);
        assert_eq!(flip_towards_viewpoint(&point, &origin, facing), facing);
    }

    #[test]
    fn mean_position_averages_coordinates() {
        let mean = mean_position(&[[0.0, 0.0, 0.0], [2.0, 4.0, -2.0]]);
        assert_eq!(mean, Vector3::new(1.0, 2.0, -1.0));
        assert_eq!(mean_position(&[]), Vector3::zeros());
    }
}
