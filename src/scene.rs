//! JSON scene and labeling files consumed by the CLI.
//!
//! ```json
//! {
//!   "regions": [
//!     { "id": 0, "points": [{ "position": [0, 0, 1], "color": [200, 10, 10] }] },
//!     { "id": 1, "points": [...], "normal": [0, 0, -1], "curvature": 0.01 }
//!   ],
//!   "adjacency": [[0, 1]]
//! }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvcError};
use crate::types::{Labeling, Point, Region, RegionId};

/// One pre-built region as stored on disk.
///
/// Descriptors are computed from the points; a stored `normal` (and
/// `curvature`) takes precedence over the estimated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    pub id: RegionId,
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<f32>,
}

impl RegionSpec {
    pub fn into_region(self) -> Result<Region> {
        let id = self.id;
        let estimated = Region::from_points(self.points)
            .map_err(|_| SvcError::config(format!("region {id} has no points")))?;
        Ok(match self.normal {
            Some(normal) => Region::with_descriptors(
                estimated.points,
                estimated.mean_color,
                estimated.centroid,
                normal,
                self.curvature.unwrap_or(estimated.curvature),
            ),
            None => Region {
                curvature: self.curvature.unwrap_or(estimated.curvature),
                ..estimated
            },
        })
    }
}

/// Initial partition: regions plus unordered adjacency pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub regions: Vec<RegionSpec>,
    #[serde(default)]
    pub adjacency: Vec<(RegionId, RegionId)>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn point_count(&self) -> usize {
        self.regions.iter().map(|r| r.points.len()).sum()
    }

    /// Build regions, rejecting empty scenes and repeated ids.
    pub fn into_parts(self) -> Result<(Vec<(RegionId, Region)>, Vec<(RegionId, RegionId)>)> {
        if self.regions.is_empty() {
            return Err(SvcError::config("scene contains no regions"));
        }
        let mut seen = BTreeSet::new();
        let mut regions = Vec::with_capacity(self.regions.len());
        for spec in self.regions {
            if !seen.insert(spec.id) {
                return Err(SvcError::config(format!("region id {} appears twice", spec.id)));
            }
            let id = spec.id;
            regions.push((id, spec.into_region()?));
        }
        Ok((regions, self.adjacency))
    }
}

pub fn load_labeling(path: &Path) -> Result<Labeling> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_labeling(path: &Path, labeling: &Labeling) -> Result<()> {
    let content = serde_json::to_string(labeling)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::convex_normals_diff;
    use tempfile::TempDir;

    const SCENE: &str = r#"{
        "regions": [
            { "id": 3, "points": [
                { "position": [0.0, 0.0, 1.0], "color": [10, 10, 10] },
                { "position": [1.0, 0.0, 1.0], "color": [30, 30, 30] }
            ] },
            { "id": 8, "points": [
                { "position": [2.0, 0.0, 1.0], "color": [200, 0, 0] }
            ], "normal": [1.0, 0.0, 0.0], "curvature": 0.25 }
        ],
        "adjacency": [[8, 3]]
    }"#;

    #[test]
    fn parses_regions_and_adjacency() {
        let scene = Scene::from_json_str(SCENE).expect("scene");
        assert_eq!(scene.point_count(), 3);
        let (regions, adjacency) = scene.into_parts().expect("parts");
        assert_eq!(adjacency, vec![(8, 3)]);

        let (id, first) = &regions[0];
        assert_eq!(*id, 3);
        assert_eq!(first.mean_color, [20.0, 20.0, 20.0]);

        // stored normal faces away from the origin and is turned around
        let (_, second) = &regions[1];
        assert_eq!(second.normal, [-1.0, 0.0, 0.0]);
        assert_eq!(second.curvature, 0.25);
    }

    fn two_patch_scene(stored_normal: [f32; 3]) -> (Region, Region) {
        let json = format!(
            r#"{{
                "regions": [
                    {{ "id": 0, "points": [
                        {{ "position": [0.0, 0.0, 2.0], "color": [90, 90, 90] }},
                        {{ "position": [1.0, 0.0, 2.0], "color": [90, 90, 90] }},
                        {{ "position": [0.0, 1.0, 2.0], "color": [90, 90, 90] }}
                    ] }},
                    {{ "id": 1, "points": [
                        {{ "position": [2.0, 0.0, 2.0], "color": [90, 90, 90] }}
                    ], "normal": [{}, {}, {}] }}
                ],
                "adjacency": [[0, 1]]
            }}"#,
            stored_normal[0], stored_normal[1], stored_normal[2]
        );
        let (mut regions, _) = Scene::from_json_str(&json)
            .expect("scene")
            .into_parts()
            .expect("parts");
        let (_, second) = regions.pop().expect("second");
        let (_, first) = regions.pop().expect("first");
        (first, second)
    }

    #[test]
    fn stored_normal_orientation_does_not_change_convexity() {
        let (a, away) = two_patch_scene([-1.0, 0.0, 2.0]);
        let (_, towards) = two_patch_scene([1.0, 0.0, -2.0]);

        assert_eq!(away.normal, towards.normal);
        assert_eq!(
            convex_normals_diff(&a, &away),
            convex_normals_diff(&a, &towards)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let scene = Scene {
            regions: vec![
                RegionSpec {
                    id: 1,
                    points: vec![Point::new([0.0; 3], [0; 3])],
                    normal: None,
                    curvature: None,
                },
                RegionSpec {
                    id: 1,
                    points: vec![Point::new([1.0; 3], [0; 3])],
                    normal: None,
                    curvature: None,
                },
            ],
            adjacency: Vec::new(),
        };
        assert!(matches!(scene.into_parts(), Err(SvcError::Config(_))));
    }

    #[test]
    fn region_without_points_is_rejected() {
        let scene = Scene::from_json_str(r#"{"regions":[{"id":0,"points":[]}]}"#).expect("scene");
        let err = scene.into_parts().unwrap_err();
        assert!(err.to_string().contains("region 0"), "{err}");
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            Scene::from_json_str("{\"regions\": 5}"),
            Err(SvcError::Serialization(_))
        ));
    }

    #[test]
    fn labeling_survives_a_file_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("labels.json");
        let labeling: Labeling = vec![crate::types::LabeledPoint::new([1.0, 2.0, 3.0], 4)]
            .into_iter()
            .collect();
        save_labeling(&path, &labeling).expect("save");
        assert_eq!(load_labeling(&path).expect("load"), labeling);
    }
}
