//! Threshold sweep: cluster progressively and score every operating point.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::engine::ClusteringEngine;
use crate::error::Result;
use crate::evaluation::PartitionEvaluator;
use crate::metrics::RegionDistance;
use crate::types::{Labeling, PerformanceRecord};

const END_TOLERANCE: f64 = 1e-6;

/// Performance of the partition obtained at one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRecord {
    pub threshold: f32,
    pub performance: PerformanceRecord,
}

/// Records in ascending threshold order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepResults {
    records: Vec<ThresholdRecord>,
}

impl SweepResults {
    pub fn records(&self) -> &[ThresholdRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, threshold: f32) -> Option<&PerformanceRecord> {
        self.records
            .iter()
            .find(|r| (r.threshold - threshold).abs() < END_TOLERANCE as f32)
            .map(|r| &r.performance)
    }

    /// Highest f-score; the lowest threshold wins ties.
    pub fn best(&self) -> Option<&ThresholdRecord> {
        let mut iter = self.records.iter();
        let first = iter.next()?;
        Some(iter.fold(first, |best, r| {
            if r.performance.fscore > best.performance.fscore {
                r
            } else {
                best
            }
        }))
    }
}

impl<'a> IntoIterator for &'a SweepResults {
    type Item = &'a ThresholdRecord;
    type IntoIter = std::slice::Iter<'a, ThresholdRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A validated threshold range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSweep {
    config: SweepConfig,
}

impl ThresholdSweep {
    /// Validate the range; an inverted range is swapped with a warning.
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        let mut config = config;
        if config.start > config.end {
            warn!(
                start = config.start,
                end = config.end,
                "start threshold greater than end threshold, inverting"
            );
            std::mem::swap(&mut config.start, &mut config.end);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// `start + k * step` for every k keeping the value within `end`.
    pub fn thresholds(&self) -> Vec<f32> {
        let SweepConfig { start, end, step } = self.config;
        let (start, end, step) = (start as f64, end as f64, step as f64);
        let mut thresholds = Vec::new();
        let mut k = 0u32;
        loop {
            let t = start + f64::from(k) * step;
            if t > end + END_TOLERANCE {
                break;
            }
            thresholds.push(t.min(end) as f32);
            k += 1;
        }
        thresholds
    }

    /// Cluster to each threshold in turn and evaluate against `truth`.
    ///
    /// The engine is reset to its initial partition first, then contracted
    /// progressively: each threshold resumes from the previous result.
    pub fn run<D: RegionDistance>(
        &self,
        engine: &mut ClusteringEngine<D>,
        truth: &Labeling,
    ) -> Result<SweepResults> {
        let mut evaluator = PartitionEvaluator::new();
        evaluator.set_truth(truth)?;
        engine.reset()?;

        let mut records = Vec::new();
        for threshold in self.thresholds() {
            engine.cluster(threshold)?;
            evaluator.set_segm(&engine.labeling()?)?;
            let performance = evaluator.performance()?;
            info!(
                threshold,
                fscore = performance.fscore,
                voi = performance.voi,
                wov = performance.wov,
                "sweep step"
            );
            records.push(ThresholdRecord {
                threshold,
                performance,
            });
        }

        Ok(SweepResults { records })
    }
}

/// Sweep `config`'s range and return every record.
pub fn sweep<D: RegionDistance>(
    engine: &mut ClusteringEngine<D>,
    truth: &Labeling,
    config: SweepConfig,
) -> Result<SweepResults> {
    ThresholdSweep::new(config)?.run(engine, truth)
}

/// Sweep and return the threshold with the highest f-score.
pub fn best_threshold<D: RegionDistance>(
    engine: &mut ClusteringEngine<D>,
    truth: &Labeling,
    config: SweepConfig,
) -> Result<Option<ThresholdRecord>> {
    Ok(sweep(engine, truth, config)?.best().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(threshold: f32, fscore: f32) -> ThresholdRecord {
        ThresholdRecord {
            threshold,
            performance: PerformanceRecord {
                fscore,
                ..Default::default()
            },
        }
    }

    #[test]
    fn thresholds_cover_range_without_drift() {
        let sweep = ThresholdSweep::new(SweepConfig::default()).expect("sweep");
        let thresholds = sweep.thresholds();
        assert_eq!(thresholds.len(), 21);
        assert_eq!(thresholds[0], 0.0);
        assert_eq!(*thresholds.last().expect("last"), 1.0);
        assert!((thresholds[7] - 0.35).abs() < 1e-6);
    }

    #[test]
    fn step_larger_than_range_yields_start_only() {
        let sweep = ThresholdSweep::new(SweepConfig {
            start: 0.3,
            end: 0.4,
            step: 0.5,
        })
        .expect("sweep");
        assert_eq!(sweep.thresholds(), vec![0.3]);
    }

    #[test]
    fn inverted_range_is_swapped() {
        let sweep = ThresholdSweep::new(SweepConfig {
            start: 1.0,
            end: 0.0,
            step: 0.5,
        })
        .expect("sweep");
        assert_eq!(sweep.thresholds(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(ThresholdSweep::new(SweepConfig {
            start: 0.0,
            end: 1.0,
            step: 0.0,
        })
        .is_err());
        assert!(ThresholdSweep::new(SweepConfig {
            start: 0.0,
            end: 1.2,
            step: 0.1,
        })
        .is_err());
    }

    #[test]
    fn best_prefers_lowest_threshold_on_ties() {
        let results = SweepResults {
            records: vec![record(0.0, 0.4), record(0.5, 0.9), record(1.0, 0.9)],
        };
        let best = results.best().expect("best");
        assert_eq!(best.threshold, 0.5);
        assert!(SweepResults::default().best().is_none());
        assert_eq!(results.get(1.0).map(|p| p.fscore), Some(0.9));
    }
}
