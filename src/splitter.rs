//! Splitter
//!
//! Exhaustive search for the Gini-optimal binary split of a leaf.
//! Each feature is projected, sorted, and swept once from left to right,
//! moving one sample at a time from the right partition into the left.
use crate::data::{Example, ExampleSource, Label};
use crate::errors::TreeError;
use crate::node::Node;
use crate::utils::{gini, midpoint, weighted_gini};
use log::warn;
use std::collections::BTreeMap;

/// The best split found for a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    /// Feature index to split on.
    pub split_feature: usize,
    /// Threshold, values `>=` go right.
    pub split_value: f64,
    /// Sample weighted impurity of the two partitions.
    pub split_impurity: f64,
    /// Number of samples that end up in the left partition.
    pub left_count: usize,
    /// Number of samples that end up in the right partition.
    pub right_count: usize,
}

/// Find the split of `node` with the lowest weighted Gini impurity.
///
/// Returns `Ok(None)` when the node should stay a leaf: it has seen no
/// samples this epoch, it is already internal, or no candidate threshold
/// is strictly better than the node's own impurity. Only thresholds
/// between two distinct adjacent values are candidates.
///
/// * `node` - The leaf to split, its statistics must be from a complete epoch.
/// * `source` - The example source the node's samples were routed from.
pub fn best_split<S>(node: &mut Node<S::Label>, source: &S) -> Result<Option<SplitInfo>, TreeError>
where
    S: ExampleSource,
{
    if node.sample_count() == 0 {
        warn!("Tried to split node {} which has no samples, skipping.", node.id());
        return Ok(None);
    }
    if !node.is_leaf() {
        return Ok(None);
    }

    let samples = node
        .sample_ids()
        .iter()
        .map(|id| source.get_by_id(*id).ok_or(TreeError::UnknownExample(*id)))
        .collect::<Result<Vec<&Example<S::Label>>, TreeError>>()?;

    let node_impurity = node.impurity();
    let class_counts = node.class_counts();
    let n_samples = node.sample_count();

    let mut best_impurity = node_impurity;
    let mut best_split = None;
    let mut feature_labels: Vec<(f64, &S::Label)> = Vec::with_capacity(samples.len());

    for feature in 0..source.n_features() {
        feature_labels.clear();
        feature_labels.extend(samples.iter().map(|e| (e.features[feature], &e.label)));
        feature_labels.sort_by(|a, b| a.0.total_cmp(&b.0));

        if let Some(split) = sweep_feature(feature, &feature_labels, class_counts, n_samples) {
            if split.split_impurity < best_impurity {
                best_impurity = split.split_impurity;
                best_split = Some(split);
            }
        }
    }

    Ok(best_split)
}

/// Sweep the sorted `(value, label)` pairs of a single feature, returning
/// the candidate with the lowest weighted impurity, the leftmost on ties.
fn sweep_feature<L: Label>(
    feature: usize,
    feature_labels: &[(f64, &L)],
    class_counts: &BTreeMap<L, usize>,
    n_samples: usize,
) -> Option<SplitInfo> {
    let mut left_counts: BTreeMap<&L, usize> = BTreeMap::new();
    let mut right_counts: BTreeMap<&L, usize> = class_counts.iter().map(|(l, c)| (l, *c)).collect();
    let mut left_total = 0;
    let mut right_total = n_samples;

    let mut best: Option<SplitInfo> = None;
    for pair in feature_labels.windows(2) {
        let (value, label) = pair[0];
        let next_value = pair[1].0;

        // Move the sample from right to left.
        if let Some(c) = right_counts.get_mut(label) {
            *c -= 1;
        }
        *left_counts.entry(label).or_insert(0) += 1;
        left_total += 1;
        right_total -= 1;

        // No threshold separates equal values.
        if value == next_value {
            continue;
        }

        let gini_left = gini(left_counts.values().copied(), left_total);
        let gini_right = gini(right_counts.values().copied(), right_total);
        let split_impurity = weighted_gini(gini_left, left_total, gini_right, right_total);

        if best.map_or(true, |b| split_impurity < b.split_impurity) {
            best = Some(SplitInfo {
                split_feature: feature,
                split_value: midpoint(value, next_value),
                split_impurity,
                left_count: left_total,
                right_count: right_total,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::tree::tree::{FitStopper, Tree};

    fn routed_leaf<S: ExampleSource>(source: &S) -> Node<S::Label> {
        let mut node = Node::new(0, 0);
        for i in 0..source.count() {
            node.route(source.get(i));
        }
        node
    }

    #[test]
    fn test_best_split_pure_children() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let data = Dataset::from_rows(rows, vec!["A", "A", "B", "B"]).unwrap();
        let mut node = routed_leaf(&data);
        assert_eq!(0.5, node.impurity());
        let split = best_split(&mut node, &data).unwrap().unwrap();
        assert_eq!(
            SplitInfo {
                split_feature: 0,
                split_value: 2.5,
                split_impurity: 0.0,
                left_count: 2,
                right_count: 2,
            },
            split
        );
    }

    #[test]
    fn test_best_split_identical_values() {
        let data = Dataset::from_rows(vec![vec![1.0], vec![1.0]], vec!["A", "B"]).unwrap();
        let mut node = routed_leaf(&data);
        assert_eq!(0.5, node.impurity());
        assert_eq!(None, best_split(&mut node, &data).unwrap());
    }

    #[test]
    fn test_best_split_empty_leaf() {
        let data = Dataset::from_rows(vec![vec![1.0], vec![2.0]], vec!["A", "B"]).unwrap();
        let mut node = Node::new(3, 1);
        assert_eq!(None, best_split(&mut node, &data).unwrap());
        assert!(node.is_leaf());
    }

    #[test]
    fn test_best_split_pure_leaf() {
        let data = Dataset::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]], vec![1, 1, 1]).unwrap();
        let mut node = routed_leaf(&data);
        assert_eq!(None, best_split(&mut node, &data).unwrap());
    }

    #[test]
    fn test_best_split_picks_informative_feature() {
        // Feature 0 is noise, feature 1 separates the labels.
        let rows = vec![
            vec![5.0, 1.0],
            vec![1.0, 2.0],
            vec![5.0, 9.0],
            vec![1.0, 8.0],
            vec![3.0, 7.0],
            vec![3.0, 3.0],
        ];
        let labels = vec!['a', 'a', 'b', 'b', 'b', 'a'];
        let data = Dataset::from_rows(rows, labels).unwrap();
        let mut node = routed_leaf(&data);
        let split = best_split(&mut node, &data).unwrap().unwrap();
        assert_eq!(1, split.split_feature);
        assert_eq!(5.0, split.split_value);
        assert_eq!(0.0, split.split_impurity);
        assert_eq!((3, 3), (split.left_count, split.right_count));
    }

    #[test]
    fn test_best_split_skips_tied_values() {
        // The only distinct boundary lies between 1.0 and 2.0.
        let data = Dataset::from_rows(
            vec![vec![2.0], vec![1.0], vec![2.0], vec![1.0], vec![2.0]],
            vec!["y", "x", "x", "x", "y"],
        )
        .unwrap();
        let mut node = routed_leaf(&data);
        let split = best_split(&mut node, &data).unwrap().unwrap();
        assert_eq!(1.5, split.split_value);
        assert_eq!((2, 3), (split.left_count, split.right_count));
        // Left is pure, right holds {x: 1, y: 2}.
        let expected = 0.6 * (1.0 - (1.0_f64 / 3.0).powi(2) - (2.0_f64 / 3.0).powi(2));
        assert!((split.split_impurity - expected).abs() < 1e-12);
        assert!(split.split_impurity < node.impurity());
    }

    #[test]
    fn test_best_split_internal_node() {
        let data = Dataset::from_rows(vec![vec![1.0], vec![2.0]], vec!["A", "B"]).unwrap();
        let mut node = Node::new(0, 0);
        node.make_parent_node(crate::node::Branch {
            split_feature: 0,
            split_value: 1.5,
            left_child: 1,
            right_child: 2,
        })
        .unwrap();
        node.route(data.get(0));
        node.route(data.get(1));
        assert_eq!(None, best_split(&mut node, &data).unwrap());
    }

    #[test]
    fn test_best_split_adjacent_floats() {
        let next = f64::from_bits(1.0f64.to_bits() + 1);
        for (lower, upper) in [(1.0, next), (1e308, f64::MAX)] {
            let data = Dataset::from_rows(vec![vec![lower], vec![upper]], vec!["A", "B"]).unwrap();
            let mut node = routed_leaf(&data);
            let split = best_split(&mut node, &data).unwrap().unwrap();
            assert!(split.split_value.is_finite());
            assert!(lower < split.split_value && split.split_value <= upper);
            assert_eq!((1, 1), (split.left_count, split.right_count));

            let mut tree = Tree::new(&data);
            let report = tree.fit().unwrap();
            assert_eq!(FitStopper::FixedPoint, report.stopper);
            assert_eq!(1, report.rounds);
            assert_eq!(3, report.n_nodes);
            assert_eq!(0.0, report.impurity);
            assert_eq!(&[1, 2], tree.leaf_assignments());
        }
    }

    #[test]
    fn test_best_split_unknown_example() {
        let data = Dataset::from_rows(vec![vec![1.0], vec![2.0]], vec!["A", "B"]).unwrap();
        let other = Dataset::from_examples(vec![crate::data::Example::new(0, vec![1.0], "A")]).unwrap();
        let mut node = routed_leaf(&data);
        assert_eq!(Err(TreeError::UnknownExample(1)), best_split(&mut node, &other));
    }
}
