use crate::constants::EMPTY_IMPURITY;
use crate::data::{Example, Label};
use crate::errors::TreeError;
use crate::utils::gini;
use std::collections::BTreeMap;
use std::fmt;

/// State of a node's cached impurity.
///
/// Routing an example or resetting the node makes the cache `Dirty`,
/// only the impurity calculation makes it `Clean` again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpurityCache {
    Dirty,
    Clean(f64),
}

/// Split parameters and children of an internal node.
///
/// Both children are installed together, a node never has only one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub split_feature: usize,
    pub split_value: f64,
    pub left_child: usize,
    pub right_child: usize,
}

impl Branch {
    /// Get the child an example with these features goes to,
    /// `features[split_feature] >= split_value` goes right.
    ///
    /// # Panics
    ///
    /// Panics if `features` is shorter than `split_feature + 1`.
    #[inline]
    pub fn get_child_idx(&self, features: &[f64]) -> usize {
        if features[self.split_feature] >= self.split_value {
            self.right_child
        } else {
            self.left_child
        }
    }
}

/// A single unit of the tree, together with the statistics
/// of the examples routed through it during the current epoch.
#[derive(Debug, Clone)]
pub struct Node<L> {
    num: usize,
    depth: usize,
    branch: Option<Branch>,
    sample_ids: Vec<usize>,
    class_counts: BTreeMap<L, usize>,
    sample_count: usize,
    impurity: ImpurityCache,
}

impl<L: Label> Node<L> {
    /// Create a leaf with empty statistics.
    pub fn new(num: usize, depth: usize) -> Self {
        Node {
            num,
            depth,
            branch: None,
            sample_ids: Vec::new(),
            class_counts: BTreeMap::new(),
            sample_count: 0,
            impurity: ImpurityCache::Dirty,
        }
    }

    pub fn id(&self) -> usize {
        self.num
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.branch.is_none()
    }

    pub fn branch(&self) -> Option<&Branch> {
        self.branch.as_ref()
    }

    pub fn split_feature(&self) -> Option<usize> {
        self.branch.map(|b| b.split_feature)
    }

    pub fn split_value(&self) -> Option<f64> {
        self.branch.map(|b| b.split_value)
    }

    /// Left and right child ids of an internal node.
    pub fn children(&self) -> Option<(usize, usize)> {
        self.branch.map(|b| (b.left_child, b.right_child))
    }

    pub fn sample_ids(&self) -> &[usize] {
        &self.sample_ids
    }

    pub fn class_counts(&self) -> &BTreeMap<L, usize> {
        &self.class_counts
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn impurity_cache(&self) -> ImpurityCache {
        self.impurity
    }

    /// The cached impurity, if it is still valid.
    pub fn cached_impurity(&self) -> Option<f64> {
        match self.impurity {
            ImpurityCache::Clean(v) => Some(v),
            ImpurityCache::Dirty => None,
        }
    }

    /// Record an example passing through this node, and return the
    /// child it continues to, or `None` if this node is a leaf.
    ///
    /// # Panics
    ///
    /// Panics if this node is internal and the example has fewer
    /// than `split_feature + 1` features.
    pub fn route(&mut self, example: &Example<L>) -> Option<usize> {
        self.sample_count += 1;
        self.sample_ids.push(example.id);
        *self.class_counts.entry(example.label.clone()).or_insert(0) += 1;
        self.impurity = ImpurityCache::Dirty;
        self.branch.map(|b| b.get_child_idx(&example.features))
    }

    /// Gini impurity of the examples seen this epoch,
    /// recalculated only if the cache is dirty.
    /// A node that has seen no examples has an impurity of `EMPTY_IMPURITY`.
    pub fn impurity(&mut self) -> f64 {
        match self.impurity {
            ImpurityCache::Clean(v) => v,
            ImpurityCache::Dirty => {
                let v = if self.sample_count == 0 {
                    EMPTY_IMPURITY
                } else {
                    gini(self.class_counts.values().copied(), self.sample_count)
                };
                self.impurity = ImpurityCache::Clean(v);
                v
            }
        }
    }

    /// Clear the statistics of this node, the split is left as is.
    pub fn reset(&mut self) {
        self.sample_ids.clear();
        self.class_counts.clear();
        self.sample_count = 0;
        self.impurity = ImpurityCache::Dirty;
    }

    /// Turn this leaf into an internal node.
    pub fn make_parent_node(&mut self, branch: Branch) -> Result<(), TreeError> {
        if self.branch.is_some() {
            return Err(TreeError::NodeAlreadySplit(self.num));
        }
        self.branch = Some(branch);
        Ok(())
    }

    /// Most frequent label seen this epoch, the smallest label wins ties.
    pub fn majority_label(&self) -> Option<&L> {
        let mut best: Option<(&L, usize)> = None;
        for (label, count) in self.class_counts.iter() {
            match best {
                Some((_, c)) if c >= *count => (),
                _ => best = Some((label, *count)),
            }
        }
        best.map(|(label, _)| label)
    }
}

impl<L: Label> fmt::Display for Node<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.branch {
            None => {
                let impurity = gini(self.class_counts.values().copied(), self.sample_count);
                write!(f, "{}:leaf,samples={},impurity={:.4}", self.num, self.sample_count, impurity)
            }
            Some(b) => write!(
                f,
                "{}:[{} < {}] yes={},no={},samples={}",
                self.num, b.split_feature, b.split_value, b.left_child, b.right_child, self.sample_count
            ),
        }
    }
}
