//! Weighted region adjacency graph with edge contraction.
//!
//! The graph owns every region; everything else refers to regions by id only.
//! Edges are kept in an ordered set keyed by `(weight, low id, high id)` so the
//! cheapest merge is found in logarithmic time and ties break deterministically.
//!
//! Invariants kept by every operation:
//! - each edge joins two distinct regions present in the graph
//! - at most one edge exists per unordered pair
//! - the edge set is exactly the current adjacency

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MergingCriterion;
use crate::error::{Result, SvcError};
use crate::metrics::RegionDistance;
use crate::normalization::NormalizationPolicy;
use crate::types::{LabeledPoint, Labeling, Region, RegionId};

/// Weight carried by edges before the first pricing pass.
pub const PLACEHOLDER_WEIGHT: f32 = -1.0;

/// Unordered pair of region ids, stored with the lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionPair {
    low: RegionId,
    high: RegionId,
}

impl RegionPair {
    /// Canonical pair, or `None` for a self-pair.
    pub fn new(a: RegionId, b: RegionId) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self { low: a, high: b }),
            Ordering::Greater => Some(Self { low: b, high: a }),
            Ordering::Equal => None,
        }
    }

    /// The id that survives a contraction of this pair.
    pub fn low(&self) -> RegionId {
        self.low
    }

    pub fn high(&self) -> RegionId {
        self.high
    }

    pub fn as_tuple(&self) -> (RegionId, RegionId) {
        (self.low, self.high)
    }
}

/// An adjacency entry with its merge weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub weight: f32,
    pub pair: RegionPair,
}

#[derive(Debug, Clone, Copy)]
struct OrderedEdge(Edge);

impl PartialEq for OrderedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedEdge {}

impl PartialOrd for OrderedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .weight
            .total_cmp(&other.0.weight)
            .then_with(|| self.0.pair.cmp(&other.0.pair))
    }
}

/// Merge weight of a pair under a frozen policy.
pub fn edge_weight<D: RegionDistance + ?Sized>(
    distance: &D,
    policy: &NormalizationPolicy,
    a: &Region,
    b: &Region,
) -> f32 {
    let (delta_c, delta_g) = distance.deltas(a, b);
    policy.weight(delta_c, delta_g)
}

/// Region set plus ordered weighted adjacency.
#[derive(Debug, Clone, Default)]
pub struct ClusteringGraph {
    regions: BTreeMap<RegionId, Region>,
    edges: BTreeSet<OrderedEdge>,
    weights: HashMap<RegionPair, f32>,
    neighbors: BTreeMap<RegionId, BTreeSet<RegionId>>,
    priced: bool,
}

impl ClusteringGraph {
    /// Build an unpriced graph from externally built regions and adjacency.
    ///
    /// Adjacency is treated as unordered: `(a, b)` and `(b, a)` collapse into
    /// one edge whichever orientation (or both) the input lists. Self-pairs are
    /// dropped. Pairs naming unknown regions are rejected.
    pub fn initialize(
        regions: impl IntoIterator<Item = (RegionId, Region)>,
        adjacency: impl IntoIterator<Item = (RegionId, RegionId)>,
    ) -> Result<Self> {
        let mut graph = Self {
            regions: regions.into_iter().collect(),
            ..Self::default()
        };

        for (a, b) in adjacency {
            for id in [a, b] {
                if !graph.regions.contains_key(&id) {
                    return Err(SvcError::dangling_region(id));
                }
            }
            if let Some(pair) = RegionPair::new(a, b) {
                if !graph.weights.contains_key(&pair) {
                    graph.insert_edge(pair, PLACEHOLDER_WEIGHT);
                }
            }
        }

        Ok(graph)
    }

    /// Compute every edge weight from scratch and return the fitted policy.
    ///
    /// The policy is fitted on the distance populations of all current edges,
    /// then every weight is replaced. Calling this again on unchanged regions
    /// yields identical weights. An invalid criterion leaves the graph as is.
    pub fn price_all_edges<D: RegionDistance + ?Sized>(
        &mut self,
        distance: &D,
        criterion: MergingCriterion,
    ) -> Result<NormalizationPolicy> {
        criterion.validate()?;
        let pairs: Vec<RegionPair> = {
            let mut pairs: Vec<RegionPair> = self.weights.keys().copied().collect();
            pairs.sort_unstable();
            pairs
        };

        let deltas: Vec<(f32, f32)> = pairs
            .iter()
            .map(|pair| distance.deltas(&self.regions[&pair.low], &self.regions[&pair.high]))
            .collect();
        let deltas_c: Vec<f32> = deltas.iter().map(|d| d.0).collect();
        let deltas_g: Vec<f32> = deltas.iter().map(|d| d.1).collect();

        let policy = NormalizationPolicy::fit(criterion, &deltas_c, &deltas_g)?;

        self.edges.clear();
        for (pair, (delta_c, delta_g)) in pairs.into_iter().zip(deltas) {
            let weight = policy.weight(delta_c, delta_g);
            self.weights.insert(pair, weight);
            self.edges.insert(OrderedEdge(Edge { weight, pair }));
        }
        self.priced = true;

        Ok(policy)
    }

    /// The cheapest edge, `None` when no edges remain.
    pub fn min_weight_edge(&self) -> Option<Edge> {
        self.edges.first().map(|e| e.0)
    }

    /// Merge the two regions joined by `pair`.
    ///
    /// The lower id survives and absorbs the other region. The contracted edge
    /// disappears, and every other edge touching either endpoint is replaced
    /// by a single edge to the survivor, priced afresh from the merged region.
    /// Returns the survivor id.
    ///
    /// Fails without touching the graph when an endpoint, the edge itself, or
    /// a neighbor is missing.
    pub fn contract<D: RegionDistance + ?Sized>(
        &mut self,
        pair: RegionPair,
        distance: &D,
        policy: &NormalizationPolicy,
    ) -> Result<RegionId> {
        let (survivor, absorbed) = pair.as_tuple();
        for id in [survivor, absorbed] {
            if !self.regions.contains_key(&id) {
                return Err(SvcError::dangling_region(id));
            }
        }
        if !self.weights.contains_key(&pair) {
            return Err(SvcError::missing_edge(survivor, absorbed));
        }

        let touched: BTreeSet<RegionId> = self
            .neighbors_of(survivor)
            .chain(self.neighbors_of(absorbed))
            .filter(|&n| n != survivor && n != absorbed)
            .collect();
        if let Some(&missing) = touched.iter().find(|n| !self.regions.contains_key(n)) {
            return Err(SvcError::dangling_region(missing));
        }

        for end in [survivor, absorbed] {
            let around: Vec<RegionId> = self.neighbors_of(end).collect();
            for n in around {
                if let Some(p) = RegionPair::new(end, n) {
                    self.remove_edge(p);
                }
            }
        }
        self.neighbors.remove(&absorbed);

        let Some(other) = self.regions.remove(&absorbed) else {
            return Err(SvcError::dangling_region(absorbed));
        };
        let Some(merged) = self.regions.get_mut(&survivor) else {
            return Err(SvcError::dangling_region(survivor));
        };
        merged.absorb(other);

        for n in touched {
            let weight = edge_weight(distance, policy, &self.regions[&survivor], &self.regions[&n]);
            if let Some(p) = RegionPair::new(survivor, n) {
                self.insert_edge(p, weight);
            }
        }

        debug!(
            survivor,
            absorbed,
            regions = self.regions.len(),
            edges = self.edges.len(),
            "contracted edge"
        );

        Ok(survivor)
    }

    pub fn is_priced(&self) -> bool {
        self.priced
    }

    pub fn regions(&self) -> &BTreeMap<RegionId, Region> {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn weight_of(&self, a: RegionId, b: RegionId) -> Option<f32> {
        RegionPair::new(a, b).and_then(|p| self.weights.get(&p).copied())
    }

    /// Edges in ascending weight order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|e| e.0)
    }

    /// Current adjacency as canonical `(low, high)` pairs in ascending order.
    pub fn adjacency(&self) -> Vec<(RegionId, RegionId)> {
        let mut pairs: Vec<(RegionId, RegionId)> =
            self.weights.keys().map(RegionPair::as_tuple).collect();
        pairs.sort_unstable();
        pairs
    }

    /// Flatten the current regions into a point labeling.
    pub fn labeling(&self) -> Labeling {
        labeling_of(&self.regions)
    }

    fn neighbors_of(&self, id: RegionId) -> impl Iterator<Item = RegionId> + '_ {
        self.neighbors.get(&id).into_iter().flatten().copied()
    }

    fn insert_edge(&mut self, pair: RegionPair, weight: f32) {
        self.weights.insert(pair, weight);
        self.edges.insert(OrderedEdge(Edge { weight, pair }));
        self.neighbors.entry(pair.low).or_default().insert(pair.high);
        self.neighbors.entry(pair.high).or_default().insert(pair.low);
    }

    fn remove_edge(&mut self, pair: RegionPair) {
        if let Some(weight) = self.weights.remove(&pair) {
            self.edges.remove(&OrderedEdge(Edge { weight, pair }));
        }
        if let Some(set) = self.neighbors.get_mut(&pair.low) {
            set.remove(&pair.high);
        }
        if let Some(set) = self.neighbors.get_mut(&pair.high) {
            set.remove(&pair.low);
        }
    }
}

/// Flatten regions into a labeling: regions in ascending id order receive
/// consecutive labels 0, 1, 2, ...
pub fn labeling_of(regions: &BTreeMap<RegionId, Region>) -> Labeling {
    regions
        .values()
        .enumerate()
        .flat_map(|(label, region)| {
            region
                .points
                .iter()
                .map(move |p| LabeledPoint::new(p.position, label as u32))
        })
        .collect()
}
