use nalgebra::Vector3;

use crate::types::Region;

/// Scale applied to the normals difference of convex junctions.
pub const CONVEX_DISCOUNT: f32 = 0.5;

/// Normals difference between two oriented surfaces.
///
/// With `C` the unit vector from the first centroid to the second, the score is
/// the mean of `|n1 x n2|`, `|n1 . C|` and `|n2 . C|`. Coplanar, parallel
/// patches score 0.
pub fn normals_diff(a: &Region, b: &Region) -> f32 {
    let n1 = a.normal_vec();
    let n2 = b.normal_vec();
    let c = centroid_direction(a, b);

    let cross = n1.cross(&n2).norm();
    let n1_c = n1.dot(&c).abs();
    let n2_c = n2.dot(&c).abs();

    (cross + n1_c + n2_c) / 3.0
}

/// Normals difference discounted for convex junctions.
///
/// The pair is convex when the normals open away from each other, i.e. when
/// `n1 . d > n2 . d` with `d` the unit vector from the second centroid to the
/// first. Concave junctions keep the full score.
pub fn convex_normals_diff(a: &Region, b: &Region) -> f32 {
    let score = normals_diff(a, b);
    if is_convex(a, b) {
        score * CONVEX_DISCOUNT
    } else {
        score
    }
}

pub fn is_convex(a: &Region, b: &Region) -> bool {
    let d = -centroid_direction(a, b);
    a.normal_vec().dot(&d) > b.normal_vec().dot(&d)
}

// Coincident centroids give a zero direction.
fn centroid_direction(a: &Region, b: &Region) -> Vector3<f32> {
    let c = b.centroid_vec() - a.centroid_vec();
    let norm = c.norm();
    if norm > f32::EPSILON {
        c / norm
    } else {
        Vector3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(centroid: [f32; 3], normal: [f32; 3]) -> Region {
        Region::with_descriptors(Vec::new(), [0.0; 3], centroid, normal, 0.0)
    }

    #[test]
    fn coplanar_patches_score_zero() {
        let a = patch([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let b = patch([1.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        assert!(normals_diff(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn perpendicular_patches_score_two_thirds() {
        // floor and wall meeting along x = 1
        let floor = patch([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let wall = patch([1.0, 0.0, 1.0], [-1.0, 0.0, 0.0]);
        let expected = (1.0 + 1.0 / 2f32.sqrt() + 1.0 / 2f32.sqrt()) / 3.0;
        assert!((normals_diff(&floor, &wall) - expected).abs() < 1e-5);
    }

    #[test]
    fn stacked_parallel_patches_are_penalized() {
        let a = patch([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let b = patch([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]);
        assert!((normals_diff(&a, &b) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn coincident_centroids_only_use_cross_term() {
        let a = patch([0.0; 3], [0.0, 0.0, 1.0]);
        let b = patch([0.0; 3], [1.0, 0.0, 0.0]);
        assert!((normals_diff(&a, &b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn convex_edge_is_discounted() {
        // roof ridge below the viewpoint: normals open away from each other
        let left = patch([-1.0, 0.0, -5.0], [-1.0, 0.0, 1.0]);
        let right = patch([1.0, 0.0, -5.0], [1.0, 0.0, 1.0]);
        assert!(is_convex(&left, &right));
        let full = normals_diff(&left, &right);
        assert!((convex_normals_diff(&left, &right) - full * CONVEX_DISCOUNT).abs() < 1e-6);
    }

    #[test]
    fn concave_edge_keeps_full_score() {
        // valley below the viewpoint: normals face each other
        let left = patch([-1.0, 0.0, -5.0], [1.0, 0.0, 1.0]);
        let right = patch([1.0, 0.0, -5.0], [-1.0, 0.0, 1.0]);
        assert!(!is_convex(&left, &right));
        assert_eq!(convex_normals_diff(&left, &right), normals_diff(&left, &right));
    }
}
