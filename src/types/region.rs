use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::Point;
use crate::error::{Result, SvcError};
use crate::geometry::{estimate_normal, flip_towards_viewpoint, mean_position};

/// Viewpoint that recomputed normals are oriented towards.
pub const VIEWPOINT: [f32; 3] = [0.0, 0.0, 0.0];

/// A contiguous set of points treated as one clustering unit.
///
/// The aggregate descriptors are kept in sync with `points` by the
/// constructors and by [`Region::absorb`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub points: Vec<Point>,
    /// Mean RGB color, 0.0-255.0 per channel
    pub mean_color: [f32; 3],
    pub centroid: [f32; 3],
    /// Unit normal facing [`VIEWPOINT`]
    pub normal: [f32; 3],
    pub curvature: f32,
}

impl Region {
    /// Build a region and compute every aggregate from its points.
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        if points.is_empty() {
            return Err(SvcError::config("a region needs at least one point"));
        }
        let mut region = Self {
            points,
            mean_color: [0.0; 3],
            centroid: [0.0; 3],
            normal: [0.0, 0.0, 1.0],
            curvature: 0.0,
        };
        let fallback = Vector3::new(0.0, 0.0, 1.0);
        region.recompute(fallback);
        Ok(region)
    }

    /// Build a region whose descriptors were computed by an external builder.
    ///
    /// The normal is normalized and turned to face [`VIEWPOINT`], the same
    /// convention merged regions follow; everything else is taken as is.
    pub fn with_descriptors(
        points: Vec<Point>,
        mean_color: [f32; 3],
        centroid: [f32; 3],
        normal: [f32; 3],
        curvature: f32,
    ) -> Self {
        let n = Vector3::from(normal);
        let norm = n.norm();
        let normal = if norm > f32::EPSILON {
            let oriented = flip_towards_viewpoint(
                &Vector3::from(centroid),
                &Vector3::from(VIEWPOINT),
                n / norm,
            );
            oriented.into()
        } else {
            normal
        };
        Self {
            points,
            mean_color,
            centroid,
            normal,
            curvature,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid_vec(&self) -> Vector3<f32> {
        Vector3::from(self.centroid)
    }

    pub fn normal_vec(&self) -> Vector3<f32> {
        Vector3::from(self.normal)
    }

    /// Take over `other`'s points and recompute all aggregates over the union.
    pub fn absorb(&mut self, other: Region) {
        let own = self.normal_vec() * self.points.len() as f32;
        let theirs = other.normal_vec() * other.points.len() as f32;
        self.points.extend(other.points);
        self.recompute(own + theirs);
    }

    fn recompute(&mut self, fallback_normal: Vector3<f32>) {
        // point-less regions keep their supplied descriptors
        if self.points.is_empty() {
            return;
        }
        let n = self.points.len() as f64;
        let mut color = [0.0f64; 3];
        for p in &self.points {
            for (acc, c) in color.iter_mut().zip(p.color) {
                *acc += c as f64;
            }
        }
        self.mean_color = color.map(|c| (c / n) as f32);

        let positions: Vec<[f32; 3]> = self.points.iter().map(|p| p.position).collect();
        let centroid = mean_position(&positions);
        self.centroid = centroid.into();

        let (normal, curvature) = match estimate_normal(&positions) {
            Some(found) => found,
            None => {
                let norm = fallback_normal.norm();
                let normal = if norm > f32::EPSILON {
                    fallback_normal / norm
                } else {
                    self.normal_vec()
                };
                (normal, 0.0)
            }
        };
        let viewpoint = Vector3::from(VIEWPOINT);
        let oriented = flip_towards_viewpoint(&centroid, &viewpoint, normal);
        self.normal = oriented.into();
        self.curvature = curvature;
    }
}
