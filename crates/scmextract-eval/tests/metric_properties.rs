use proptest::prelude::*;
use scmextract_core::CausalGraph;
use scmextract_eval::{evaluate_graph, EdgeComparison};

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn arb_graph() -> impl Strategy<Value = CausalGraph> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..20).prop_map(|edges| {
        let variables = NAMES.iter().map(|n| n.to_string()).collect();
        CausalGraph::from_edges(variables, edges.into_iter().map(|(i, j)| (NAMES[i], NAMES[j])))
            .unwrap()
    })
}

proptest! {
    #[test]
    fn a_graph_agrees_with_itself(graph in arb_graph()) {
        let metrics = evaluate_graph(&graph, &graph);
        prop_assert_eq!(metrics.precision, 1.0);
        prop_assert_eq!(metrics.recall, 1.0);
        prop_assert_eq!(metrics.f1, 1.0);
        prop_assert_eq!(metrics.shd, 0);
    }

    #[test]
    fn scores_stay_in_unit_interval(predicted in arb_graph(), truth in arb_graph()) {
        let metrics = evaluate_graph(&predicted, &truth);
        for score in [metrics.precision, metrics.recall, metrics.f1] {
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn shd_counts_false_positives_and_negatives(predicted in arb_graph(), truth in arb_graph()) {
        let comparison = EdgeComparison::new(&predicted, &truth);
        prop_assert_eq!(
            comparison.shd(),
            comparison.false_positives.len() + comparison.false_negatives.len()
        );
        prop_assert_eq!(comparison.num_predicted(), predicted.num_edges());
        prop_assert_eq!(comparison.num_truth(), truth.num_edges());
        prop_assert_eq!(
            evaluate_graph(&predicted, &truth).shd,
            evaluate_graph(&truth, &predicted).shd
        );
    }
}
