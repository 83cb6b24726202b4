use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::Labeling;

/// Exact spatial identity of a point: the bit patterns of its coordinates.
pub(crate) type PointKey = [u32; 3];

pub(crate) fn point_key(position: [f32; 3]) -> PointKey {
    // -0.0 and 0.0 are the same location
    position.map(|c| if c == 0.0 { 0.0f32.to_bits() } else { c.to_bits() })
}

/// Points grouped by label, re-indexed 0..k in ascending label order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: Vec<u32>,
    clusters: Vec<Vec<PointKey>>,
    total: usize,
}

impl LabelMap {
    pub fn from_labeling(labeling: &Labeling) -> Self {
        let mut grouped: HashMap<u32, Vec<PointKey>> = HashMap::new();
        for p in &labeling.points {
            grouped.entry(p.label).or_default().push(point_key(p.position));
        }

        let mut entries: Vec<(u32, Vec<PointKey>)> = grouped.into_iter().collect();
        entries.sort_unstable_by_key(|(label, _)| *label);

        let (labels, clusters) = entries
            .into_iter()
            .map(|(label, mut keys)| {
                keys.sort_unstable();
                (label, keys)
            })
            .unzip();

        Self {
            labels,
            clusters,
            total: labeling.len(),
        }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of points over all clusters.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Original label of cluster `index`.
    pub fn label(&self, index: usize) -> Option<u32> {
        self.labels.get(index).copied()
    }

    pub fn size(&self, index: usize) -> usize {
        self.clusters[index].len()
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.clusters.iter().map(Vec::len)
    }

    pub(crate) fn cluster(&self, index: usize) -> &[PointKey] {
        &self.clusters[index]
    }

    pub(crate) fn clusters(&self) -> impl Iterator<Item = (usize, &[PointKey])> + '_ {
        self.clusters.iter().map(Vec::as_slice).enumerate()
    }
}

/// Size of the multiset union of two sorted key lists.
pub(crate) fn union_size(a: &[PointKey], b: &[PointKey]) -> usize {
    let (mut i, mut j, mut size) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
        size += 1;
    }
    size + (a.len() - i) + (b.len() - j)
}
