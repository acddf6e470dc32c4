use crate::config::{ImpurityAverage, TreeConfig};
use crate::constants::EMPTY_IMPURITY;
use crate::data::{Example, ExampleSource};
use crate::errors::TreeError;
use crate::node::{Branch, Node};
use crate::splitter::best_split;
use hashbrown::HashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Why `Tree::fit` stopped growing the tree.
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Debug)]
pub enum FitStopper {
    /// No leaf had a split that improves its impurity.
    FixedPoint,
    /// The configured number of rounds was reached while a leaf
    /// still had an improving split.
    RoundLimit,
}

/// Summary of a `Tree::fit` call.
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
pub struct FitReport {
    /// Growth rounds that split at least one leaf.
    pub rounds: usize,
    pub stopper: FitStopper,
    pub n_nodes: usize,
    pub n_leaves: usize,
    pub depth: usize,
    /// Forward impurity after the final epoch.
    pub impurity: f64,
}

/// A binary classification tree grown epoch by epoch over an example source.
///
/// The tree owns its nodes, keyed by id, and borrows the source it trains on.
/// Node ids come from a counter owned by the tree, they increase
/// monotonically and are never reused, not even after `rebuild`.
pub struct Tree<'a, S: ExampleSource> {
    source: &'a S,
    config: TreeConfig,
    pub(crate) nodes: HashMap<usize, Node<S::Label>>,
    pub(crate) root: usize,
    next_id: usize,
    leaf_assignments: Vec<usize>,
}

impl<'a, S: ExampleSource> Tree<'a, S> {
    /// Create a tree holding a single empty leaf, with the default configuration.
    pub fn new(source: &'a S) -> Self {
        let mut tree = Tree {
            source,
            config: TreeConfig::default(),
            nodes: HashMap::new(),
            root: 0,
            next_id: 0,
            leaf_assignments: Vec::new(),
        };
        tree.root = tree.add_node(0);
        tree
    }

    /// Create a tree with a validated configuration.
    pub fn with_config(source: &'a S, config: TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;
        let mut tree = Tree::new(source);
        tree.config = config;
        Ok(tree)
    }

    fn add_node(&mut self, depth: usize) -> usize {
        let num = self.next_id;
        self.next_id += 1;
        self.nodes.insert(num, Node::new(num, depth));
        num
    }

    fn get_node_mut(&mut self, num: usize) -> Result<&mut Node<S::Label>, TreeError> {
        self.nodes.get_mut(&num).ok_or(TreeError::UnknownNode(num))
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> &Node<S::Label> {
        &self.nodes[&self.root]
    }

    pub fn node(&self, num: usize) -> Option<&Node<S::Label>> {
        self.nodes.get(&num)
    }

    /// Node ids in pre-order, left subtree before right.
    pub fn node_ids(&self) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(num) = stack.pop() {
            ids.push(num);
            if let Some((left, right)) = self.nodes[&num].children() {
                stack.push(right);
                stack.push(left);
            }
        }
        ids
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> Vec<&Node<S::Label>> {
        self.node_ids().into_iter().map(|num| &self.nodes[&num]).collect()
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<&Node<S::Label>> {
        self.nodes().into_iter().filter(|n| n.is_leaf()).collect()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    pub fn depth(&self) -> usize {
        self.nodes.values().map(|n| n.depth()).max().unwrap_or(0)
    }

    /// Leaf reached by each example of the source during the last epoch, in source order.
    pub fn leaf_assignments(&self) -> &[usize] {
        &self.leaf_assignments
    }

    /// Clear the statistics of every node, the shape of the tree is kept.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
        self.leaf_assignments.clear();
    }

    /// Route a single example from the root down to a leaf, recording it
    /// in every node on the way. Returns the id of the leaf.
    ///
    /// # Panics
    ///
    /// Panics if the example has fewer features than a split on its path uses.
    pub fn route(&mut self, example: &Example<S::Label>) -> Result<usize, TreeError> {
        let mut num = self.root;
        while let Some(child) = self.get_node_mut(num)?.route(example) {
            num = child;
        }
        Ok(num)
    }

    /// Run one epoch: clear all statistics, then route every example
    /// of the source through the tree, in source order.
    ///
    /// The source is validated first, if it fails the statistics of the
    /// previous epoch are left untouched.
    pub fn run_epoch(&mut self) -> Result<(), TreeError> {
        let source = self.source;
        source.validate()?;
        self.reset();
        self.leaf_assignments.reserve(source.count());
        for i in 0..source.count() {
            let leaf = self.route(source.get(i))?;
            self.leaf_assignments.push(leaf);
        }
        Ok(())
    }

    /// Impurity of the whole tree: a leaf reports its own impurity,
    /// an internal node the average of its children's forward impurity.
    pub fn forward_impurity(&mut self) -> Result<f64, TreeError> {
        self.node_forward_impurity(self.root)
    }

    fn node_forward_impurity(&mut self, num: usize) -> Result<f64, TreeError> {
        let node = self.get_node_mut(num)?;
        let impurity = node.impurity();
        let Some((left, right)) = node.children() else {
            return Ok(impurity);
        };
        let left_impurity = self.node_forward_impurity(left)?;
        let right_impurity = self.node_forward_impurity(right)?;
        match self.config.impurity_average {
            ImpurityAverage::Mean => Ok((left_impurity + right_impurity) / 2.0),
            ImpurityAverage::Weighted => {
                let n_left = self.nodes[&left].sample_count() as f64;
                let n_right = self.nodes[&right].sample_count() as f64;
                if n_left + n_right == 0.0 {
                    Ok(EMPTY_IMPURITY)
                } else {
                    Ok((n_left * left_impurity + n_right * right_impurity) / (n_left + n_right))
                }
            }
        }
    }

    /// Split a leaf on `feature`, installing two fresh leaves as its children.
    /// Returns the ids of the left and right child.
    pub fn split(&mut self, num: usize, feature: usize, threshold: f64) -> Result<(usize, usize), TreeError> {
        let n_features = self.source.n_features();
        if feature >= n_features {
            return Err(TreeError::InvalidParameter(
                "feature".to_string(),
                format!("feature index below {}", n_features),
                feature.to_string(),
            ));
        }
        if !threshold.is_finite() {
            return Err(TreeError::InvalidParameter(
                "threshold".to_string(),
                "a finite value".to_string(),
                threshold.to_string(),
            ));
        }
        let node = self.get_node_mut(num)?;
        if !node.is_leaf() {
            return Err(TreeError::NodeAlreadySplit(num));
        }
        let depth = node.depth() + 1;
        let left_child = self.add_node(depth);
        let right_child = self.add_node(depth);
        self.get_node_mut(num)?.make_parent_node(Branch {
            split_feature: feature,
            split_value: threshold,
            left_child,
            right_child,
        })?;
        Ok((left_child, right_child))
    }

    /// Search the best split of every current leaf, and split the ones
    /// that have a split improving their impurity.
    /// Returns the number of leaves split, 0 once no leaf can be improved.
    ///
    /// The leaves' statistics must come from a completed `run_epoch`.
    pub fn grow_one_level(&mut self) -> Result<usize, TreeError> {
        let source = self.source;
        let leaves: Vec<usize> = self
            .node_ids()
            .into_iter()
            .filter(|num| self.nodes[num].is_leaf())
            .collect();

        let mut n_splits = 0;
        for num in leaves {
            let Some(split_info) = best_split(self.get_node_mut(num)?, source)? else {
                continue;
            };
            let (left, right) = self.split(num, split_info.split_feature, split_info.split_value)?;
            debug!(
                "Split node {} on feature {} at {}, impurity {:.4}, children {} ({}) and {} ({}).",
                num,
                split_info.split_feature,
                split_info.split_value,
                split_info.split_impurity,
                left,
                split_info.left_count,
                right,
                split_info.right_count
            );
            n_splits += 1;
        }
        Ok(n_splits)
    }

    /// Whether any leaf with samples has a split improving its impurity.
    /// Reads the statistics of the last epoch and changes no split.
    fn has_improving_split(&mut self) -> Result<bool, TreeError> {
        let source = self.source;
        let leaves: Vec<usize> = self
            .nodes
            .values()
            .filter(|n| n.is_leaf() && n.sample_count() > 0)
            .map(|n| n.id())
            .collect();
        for num in leaves {
            if best_split(self.get_node_mut(num)?, source)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Discard every node and start again from a single empty leaf.
    pub fn rebuild(&mut self) {
        self.nodes.clear();
        self.leaf_assignments.clear();
        self.root = self.add_node(0);
    }

    /// Grow the tree by alternating `run_epoch` and `grow_one_level` until
    /// no leaf can be split or the configured number of rounds is reached.
    /// The statistics left on the nodes are those of a final epoch over the
    /// fully grown tree.
    pub fn fit(&mut self) -> Result<FitReport, TreeError> {
        if self.source.count() == 0 {
            return Err(TreeError::EmptySource);
        }
        let round_limit = self.config.round_limit();
        let log_rounds = self.config.log_rounds;

        let mut rounds = 0;
        let stopper = loop {
            self.run_epoch()?;
            if log_rounds > 0 && rounds > 0 && rounds % log_rounds == 0 {
                info!(
                    "round {}, impurity: {:.4}, leaves: {}",
                    rounds,
                    self.forward_impurity()?,
                    self.n_leaves()
                );
            }
            if rounds >= round_limit {
                if !self.has_improving_split()? {
                    break FitStopper::FixedPoint;
                }
                warn!("Reached round limit before all leaves became unsplittable. Try to increase max_rounds.");
                break FitStopper::RoundLimit;
            }
            if self.grow_one_level()? == 0 {
                break FitStopper::FixedPoint;
            }
            rounds += 1;
        };

        let report = FitReport {
            rounds,
            stopper,
            n_nodes: self.n_nodes(),
            n_leaves: self.n_leaves(),
            depth: self.depth(),
            impurity: self.forward_impurity()?,
        };
        info!(
            "Finished growing after {} rounds ({:?}), nodes: {}, leaves: {}, depth: {}, impurity: {:.4}",
            report.rounds, report.stopper, report.n_nodes, report.n_leaves, report.depth, report.impurity
        );
        Ok(report)
    }
}

impl<'a, S: ExampleSource> Display for Tree<'a, S> {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = String::new();
        for node in self.nodes() {
            r += format!("{}{}\n", "      ".repeat(node.depth()).as_str(), node).as_str();
        }
        write!(f, "{}", r)
    }
}
