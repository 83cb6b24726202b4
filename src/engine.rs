//! Greedy best-first agglomeration over a [`ClusteringGraph`].
//!
//! The engine keeps the initial graph next to the working one so a run can be
//! restarted without rebuilding regions. Pricing happens lazily on the first
//! `cluster` call and again after any configuration change.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{ClusteringConfig, CriterionKind};
use crate::error::{Result, SvcError};
use crate::graph::ClusteringGraph;
use crate::metrics::{DescriptorDistance, RegionDistance};
use crate::normalization::NormalizationPolicy;
use crate::types::{Labeling, Region, RegionId};

pub use crate::graph::labeling_of;

#[derive(Debug, Clone)]
enum EngineState {
    Uninitialized,
    /// Edges carry placeholder weights, or weights from an outdated config.
    Unpriced { initial: ClusteringGraph },
    Ready {
        initial: ClusteringGraph,
        current: ClusteringGraph,
        policy: NormalizationPolicy,
    },
}

/// Regions and canonical adjacency of the working graph.
#[derive(Debug, Clone, Copy)]
pub struct Partition<'a> {
    pub regions: &'a BTreeMap<RegionId, Region>,
    graph: &'a ClusteringGraph,
}

impl<'a> Partition<'a> {
    pub fn adjacency(&self) -> Vec<(RegionId, RegionId)> {
        self.graph.adjacency()
    }

    pub fn labeling(&self) -> Labeling {
        labeling_of(self.regions)
    }

    pub fn graph(&self) -> &'a ClusteringGraph {
        self.graph
    }
}

#[derive(Debug, Clone)]
pub struct ClusteringEngine<D = DescriptorDistance> {
    config: ClusteringConfig,
    distance: D,
    state: EngineState,
}

impl ClusteringEngine<DescriptorDistance> {
    pub fn new(config: ClusteringConfig) -> Self {
        Self::with_distance(config, DescriptorDistance::from_config(&config))
    }

    /// Replace the whole configuration, including the distance variants.
    pub fn reconfigure(&mut self, config: ClusteringConfig) {
        self.distance = DescriptorDistance::from_config(&config);
        self.apply_config(config);
    }
}

impl<D: RegionDistance> ClusteringEngine<D> {
    /// Engine using a caller-supplied distance. Only the merging criterion
    /// of `config` applies to it.
    pub fn with_distance(config: ClusteringConfig, distance: D) -> Self {
        Self {
            config,
            distance,
            state: EngineState::Uninitialized,
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn distance(&self) -> &D {
        &self.distance
    }

    /// Install a new initial partition, discarding any previous run.
    pub fn set_initial_state(
        &mut self,
        regions: impl IntoIterator<Item = (RegionId, Region)>,
        adjacency: impl IntoIterator<Item = (RegionId, RegionId)>,
    ) -> Result<()> {
        let initial = ClusteringGraph::initialize(regions, adjacency)?;
        self.state = EngineState::Unpriced { initial };
        Ok(())
    }

    pub fn set_lambda(&mut self, lambda: f32) -> Result<()> {
        let config = self.config.with_lambda(lambda)?;
        self.apply_config(config);
        Ok(())
    }

    pub fn set_bins_num(&mut self, bins_num: u16) -> Result<()> {
        let config = self.config.with_bins_num(bins_num)?;
        self.apply_config(config);
        Ok(())
    }

    pub fn set_merging(&mut self, kind: CriterionKind) {
        let config = self.config.with_merging(kind);
        self.apply_config(config);
    }

    /// Merge while the cheapest edge weighs strictly less than `threshold`.
    ///
    /// Resumes from the current working graph; call [`reset`](Self::reset)
    /// to start again from the initial partition. Returns the number of
    /// merges performed.
    pub fn cluster(&mut self, threshold: f32) -> Result<usize> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SvcError::config(format!(
                "threshold {threshold} outside range [0, 1]"
            )));
        }
        self.ensure_priced()?;

        let EngineState::Ready {
            current, policy, ..
        } = &mut self.state
        else {
            return Err(SvcError::state("clustering graph is not priced"));
        };

        let mut merges = 0;
        while let Some(edge) = current.min_weight_edge() {
            if edge.weight >= threshold {
                break;
            }
            current.contract(edge.pair, &self.distance, policy)?;
            merges += 1;
            debug!(
                edges_left = current.edge_count(),
                regions_left = current.region_count(),
                weight = edge.weight,
                pair = ?edge.pair.as_tuple(),
                "merge"
            );
        }

        Ok(merges)
    }

    /// Return to the initial partition, keeping the fitted policy.
    pub fn reset(&mut self) -> Result<()> {
        match &mut self.state {
            EngineState::Uninitialized => Err(SvcError::state(
                "cannot reset before an initial state is set",
            )),
            EngineState::Unpriced { .. } => Ok(()),
            EngineState::Ready {
                initial, current, ..
            } => {
                *current = initial.clone();
                Ok(())
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, EngineState::Uninitialized)
    }

    pub fn is_priced(&self) -> bool {
        matches!(self.state, EngineState::Ready { .. })
    }

    /// Normalization fitted for the current run, if pricing has happened.
    pub fn policy(&self) -> Option<&NormalizationPolicy> {
        match &self.state {
            EngineState::Ready { policy, .. } => Some(policy),
            _ => None,
        }
    }

    pub fn current_partition(&self) -> Result<Partition<'_>> {
        let graph = match &self.state {
            EngineState::Uninitialized => {
                return Err(SvcError::state("no initial state has been set"))
            }
            EngineState::Unpriced { initial } => initial,
            EngineState::Ready { current, .. } => current,
        };
        Ok(Partition {
            regions: graph.regions(),
            graph,
        })
    }

    pub fn labeling(&self) -> Result<Labeling> {
        Ok(self.current_partition()?.labeling())
    }

    fn apply_config(&mut self, config: ClusteringConfig) {
        self.config = config;
        self.state = match std::mem::replace(&mut self.state, EngineState::Uninitialized) {
            EngineState::Ready { initial, .. } => EngineState::Unpriced { initial },
            other => other,
        };
    }

    fn ensure_priced(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, EngineState::Uninitialized) {
            EngineState::Uninitialized => Err(SvcError::state(
                "cluster called before an initial state was set",
            )),
            EngineState::Unpriced { mut initial } => {
                let policy = match initial.price_all_edges(&self.distance, self.config.merging()) {
                    Ok(policy) => policy,
                    Err(err) => {
                        self.state = EngineState::Unpriced { initial };
                        return Err(err);
                    }
                };
                debug!(edges = initial.edge_count(), ?policy, "priced initial edges");
                self.state = EngineState::Ready {
                    current: initial.clone(),
                    initial,
                    policy,
                };
                Ok(())
            }
            ready => {
                self.state = ready;
                Ok(())
            }
        }
    }
}
