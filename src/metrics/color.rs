use palette::{color_difference::Ciede2000, FromColor, Lab, Srgb};

use crate::types::Region;

/// Normalization range of CIEDE2000 differences (black vs. white).
pub const LAB_RANGE: f32 = 100.0;
/// Diagonal of the unit RGB cube.
pub const RGB_RANGE: f32 = 1.732_050_8;

/// Perceptual distance between mean colors: CIEDE2000 over Lab, in [0, 1].
pub fn lab_ciede2000_distance(a: &Region, b: &Region) -> f32 {
    let delta = mean_lab(a).difference(mean_lab(b));
    (delta / LAB_RANGE).clamp(0.0, 1.0)
}

/// Euclidean distance between mean colors in the unit RGB cube, in [0, 1].
pub fn rgb_euclidean_distance(a: &Region, b: &Region) -> f32 {
    let ca = unit_rgb(a.mean_color);
    let cb = unit_rgb(b.mean_color);
    let dr = ca[0] - cb[0];
    let dg = ca[1] - cb[1];
    let db = ca[2] - cb[2];
    ((dr * dr + dg * dg + db * db).sqrt() / RGB_RANGE).clamp(0.0, 1.0)
}

fn unit_rgb(color: [f32; 3]) -> [f32; 3] {
    color.map(|c| (c / 255.0).clamp(0.0, 1.0))
}

fn mean_lab(region: &Region) -> Lab {
    let [r, g, b] = unit_rgb(region.mean_color);
    Lab::from_color(Srgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored(color: [f32; 3]) -> Region {
        Region::with_descriptors(Vec::new(), color, [0.0; 3], [0.0, 0.0, 1.0], 0.0)
    }

    #[test]
    fn identical_colors_have_zero_distance() {
        let a = colored([120.0, 30.0, 200.0]);
        assert!(lab_ciede2000_distance(&a, &a).abs() < 1e-4);
        assert_eq!(rgb_euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn black_and_white_span_the_range() {
        let black = colored([0.0; 3]);
        let white = colored([255.0; 3]);
        assert!((rgb_euclidean_distance(&black, &white) - 1.0).abs() < 1e-5);
        let lab = lab_ciede2000_distance(&black, &white);
        assert!(lab > 0.95 && lab <= 1.0, "lab distance {lab}");
    }

    #[test]
    fn distances_are_symmetric() {
        let a = colored([10.0, 200.0, 40.0]);
        let b = colored([90.0, 20.0, 140.0]);
        assert!((rgb_euclidean_distance(&a, &b) - rgb_euclidean_distance(&b, &a)).abs() < 1e-6);
        assert!((lab_ciede2000_distance(&a, &b) - lab_ciede2000_distance(&b, &a)).abs() < 1e-4);
    }

    #[test]
    fn single_channel_step_is_scaled_by_cube_diagonal() {
        let a = colored([0.0; 3]);
        let b = colored([255.0, 0.0, 0.0]);
        let expected = 1.0 / RGB_RANGE;
        assert!((rgb_euclidean_distance(&a, &b) - expected).abs() < 1e-5);
    }
}
