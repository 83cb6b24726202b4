use std::collections::BTreeSet;

use proptest::prelude::*;
use svclust_lib::graph::edge_weight;
use svclust_lib::{
    compute_cdf, ClusteringConfig, ClusteringEngine, ClusteringGraph, CriterionKind,
    DescriptorDistance, LabeledPoint, Labeling, MergingCriterion, PartitionEvaluator, Point,
    Region, RegionId,
};

type Parts = (Vec<(RegionId, Region)>, Vec<(RegionId, RegionId)>);

/// A strip of flat patches, chained left to right, plus arbitrary extra links.
fn strip(grays: &[u8], extra: &[(usize, usize)]) -> Parts {
    let n = grays.len();
    let regions = grays
        .iter()
        .enumerate()
        .map(|(i, &gray)| {
            let x = i as f32;
            let points = (0..4)
                .map(|k| {
                    let (dx, dy) = ((k % 2) as f32 * 0.4, (k / 2) as f32 * 0.4);
                    Point::new([x + dx, dy, 1.0 + 0.1 * (i % 3) as f32], [gray, gray / 2, 255 - gray])
                })
                .collect();
            (i as RegionId, Region::from_points(points).expect("patch"))
        })
        .collect();
    let mut adjacency: Vec<(RegionId, RegionId)> =
        (1..n).map(|i| ((i - 1) as RegionId, i as RegionId)).collect();
    adjacency.extend(
        extra
            .iter()
            .map(|&(a, b)| ((a % n) as RegionId, (b % n) as RegionId)),
    );
    (regions, adjacency)
}

fn criterion_kind() -> impl Strategy<Value = CriterionKind> {
    prop_oneof![
        Just(CriterionKind::ManualLambda),
        Just(CriterionKind::AdaptiveLambda),
        Just(CriterionKind::Equalization),
    ]
}

fn labeling(labels: &[u32]) -> Labeling {
    labels
        .iter()
        .enumerate()
        .map(|(i, &l)| LabeledPoint::new([i as f32, (i % 5) as f32, 0.0], l))
        .collect()
}

proptest! {
    #[test]
    fn prop_contraction_keeps_weights_fresh(
        grays in prop::collection::vec(any::<u8>(), 2..10),
        extra in prop::collection::vec((0usize..10, 0usize..10), 0..8),
        kind in criterion_kind(),
    ) {
        let (regions, adjacency) = strip(&grays, &extra);
        let distance = DescriptorDistance::default();
        let mut graph = ClusteringGraph::initialize(regions, adjacency).unwrap();
        let policy = graph
            .price_all_edges(&distance, MergingCriterion::with_defaults(kind))
            .unwrap();

        let before = graph.region_count();
        let edge = graph.min_weight_edge().unwrap();
        let (low, high) = edge.pair.as_tuple();
        let survivor = graph.contract(edge.pair, &distance, &policy).unwrap();

        prop_assert_eq!(survivor, low);
        prop_assert_eq!(graph.region_count(), before - 1);
        prop_assert!(graph.region(high).is_none());

        let mut seen = BTreeSet::new();
        for e in graph.edges() {
            let (a, b) = e.pair.as_tuple();
            prop_assert!(a != high && b != high);
            prop_assert!(seen.insert((a, b)));
            let expected = edge_weight(
                &distance,
                &policy,
                graph.region(a).unwrap(),
                graph.region(b).unwrap(),
            );
            prop_assert!((e.weight - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_clustering_is_monotone_in_threshold(
        grays in prop::collection::vec(any::<u8>(), 2..10),
        extra in prop::collection::vec((0usize..10, 0usize..10), 0..6),
        kind in criterion_kind(),
        t1 in 0.0f32..=1.0,
        t2 in 0.0f32..=1.0,
    ) {
        let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let config = ClusteringConfig::default().with_merging(kind);
        let (regions, adjacency) = strip(&grays, &extra);

        let mut stepped = ClusteringEngine::new(config);
        stepped.set_initial_state(regions.clone(), adjacency.clone()).unwrap();
        stepped.cluster(low).unwrap();
        stepped.cluster(high).unwrap();

        let mut direct = ClusteringEngine::new(config);
        direct.set_initial_state(regions, adjacency).unwrap();
        direct.cluster(high).unwrap();

        let a = stepped.current_partition().unwrap();
        let b = direct.current_partition().unwrap();
        prop_assert_eq!(a.adjacency(), b.adjacency());
        prop_assert_eq!(a.labeling(), b.labeling());
    }

    #[test]
    fn prop_evaluation_scores_stay_in_range(
        pairs in prop::collection::vec((0u32..5, 0u32..5), 1..40),
    ) {
        let segm_labels: Vec<u32> = pairs.iter().map(|p| p.0).collect();
        let truth_labels: Vec<u32> = pairs.iter().map(|p| p.1).collect();
        let evaluator =
            PartitionEvaluator::with_labelings(&labeling(&segm_labels), &labeling(&truth_labels))
                .unwrap();
        let record = evaluator.performance().unwrap();

        prop_assert!(record.voi >= 0.0);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&record.fscore));
        prop_assert!((0.0..=1.0 + 1e-6).contains(&record.precision));
        prop_assert!((0.0..=1.0 + 1e-6).contains(&record.recall));
        prop_assert!((0.0..=1.0 + 1e-6).contains(&record.wov));

        let claimed: Vec<usize> = evaluator.matches().unwrap().iter().flatten().copied().collect();
        let unique: BTreeSet<usize> = claimed.iter().copied().collect();
        prop_assert_eq!(claimed.len(), unique.len());
    }

    #[test]
    fn prop_self_evaluation_has_zero_voi(
        labels in prop::collection::vec(0u32..6, 1..40),
    ) {
        let l = labeling(&labels);
        let record = PartitionEvaluator::with_labelings(&l, &l).unwrap().performance().unwrap();
        prop_assert!(record.voi.abs() < 1e-5);
        prop_assert!((record.fscore - 1.0).abs() < 1e-5);
    }

    #[test]
    fn prop_cdf_is_monotone_and_complete(
        population in prop::collection::vec(0.0f32..=1.0, 1..200),
        bins_num in 1u16..600,
    ) {
        let cdf = compute_cdf(&population, bins_num).unwrap();
        prop_assert_eq!(cdf.bins_num(), usize::from(bins_num));
        for w in cdf.values().windows(2) {
            prop_assert!(w[0] <= w[1]);
        }
        prop_assert_eq!(cdf.at_bin(cdf.bins_num() - 1), 1.0);
    }
}
