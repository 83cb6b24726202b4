//! Dissimilarity measures between two regions' aggregate descriptors.
//!
//! Two independent axes are measured, each normalized to roughly [0, 1]:
//! - Color distance (CIEDE2000 over Lab, or Euclidean over RGB)
//! - Geometric distance (normals difference, optionally convexity-aware)
//!
//! Both are pure functions of the region descriptors.

mod color;
mod geometric;

pub use color::{lab_ciede2000_distance, rgb_euclidean_distance, LAB_RANGE, RGB_RANGE};
pub use geometric::{convex_normals_diff, is_convex, normals_diff, CONVEX_DISCOUNT};

use crate::config::{ColorDistance, ClusteringConfig, GeometricDistance};
use crate::types::Region;

/// Color and geometric dissimilarity between two regions.
pub trait RegionDistance {
    fn color(&self, a: &Region, b: &Region) -> f32;
    fn geometric(&self, a: &Region, b: &Region) -> f32;

    /// `(color, geometric)` for a pair.
    fn deltas(&self, a: &Region, b: &Region) -> (f32, f32) {
        (self.color(a, b), self.geometric(a, b))
    }
}

type DistanceFn = fn(&Region, &Region) -> f32;

/// Distance computed from region descriptors, with the variants resolved once.
#[derive(Clone, Copy)]
pub struct DescriptorDistance {
    color_kind: ColorDistance,
    geometric_kind: GeometricDistance,
    color_fn: DistanceFn,
    geometric_fn: DistanceFn,
}

impl DescriptorDistance {
    pub fn new(color: ColorDistance, geometric: GeometricDistance) -> Self {
        let color_fn: DistanceFn = match color {
            ColorDistance::LabCiede2000 => lab_ciede2000_distance,
            ColorDistance::RgbEuclidean => rgb_euclidean_distance,
        };
        let geometric_fn: DistanceFn = match geometric {
            GeometricDistance::NormalsDiff => normals_diff,
            GeometricDistance::ConvexNormalsDiff => convex_normals_diff,
        };
        Self {
            color_kind: color,
            geometric_kind: geometric,
            color_fn,
            geometric_fn,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.color_distance(), config.geometric_distance())
    }

    pub fn color_kind(&self) -> ColorDistance {
        self.color_kind
    }

    pub fn geometric_kind(&self) -> GeometricDistance {
        self.geometric_kind
    }
}

impl Default for DescriptorDistance {
    fn default() -> Self {
        Self::new(ColorDistance::default(), GeometricDistance::default())
    }
}

impl std::fmt::Debug for DescriptorDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorDistance")
            .field("color", &self.color_kind)
            .field("geometric", &self.geometric_kind)
            .finish()
    }
}

impl RegionDistance for DescriptorDistance {
    fn color(&self, a: &Region, b: &Region) -> f32 {
        (self.color_fn)(a, b)
    }

    fn geometric(&self, a: &Region, b: &Region) -> f32 {
        (self.geometric_fn)(a, b)
    }
}
