use super::tree::Tree;
use crate::data::ExampleSource;
use crate::errors::TreeError;
use rayon::prelude::*;

/// Outcome of classifying a feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<L> {
    /// Id of the leaf the features end in.
    pub node: usize,
    /// Majority label of that leaf during the last epoch,
    /// `None` if the leaf saw no examples.
    pub label: Option<L>,
}

impl<'a, S: ExampleSource> Tree<'a, S> {
    /// Follow the splits from the root down to a leaf without touching
    /// any statistics.
    ///
    /// # Panics
    ///
    /// Panics if `features` is shorter than a split on the path requires.
    pub fn classify(&self, features: &[f64]) -> Classification<S::Label> {
        let mut node_idx = self.root;
        loop {
            let node = &self.nodes[&node_idx];
            match node.branch() {
                Some(branch) => node_idx = branch.get_child_idx(features),
                None => {
                    return Classification {
                        node: node.id(),
                        label: node.majority_label().cloned(),
                    }
                }
            }
        }
    }

    fn predict_single_threaded(&self, rows: &[Vec<f64>]) -> Vec<Option<S::Label>> {
        rows.iter().map(|row| self.classify(row).label).collect()
    }

    fn predict_parallel(&self, rows: &[Vec<f64>]) -> Vec<Option<S::Label>>
    where
        S: Sync,
        S::Label: Send + Sync,
    {
        rows.par_iter().map(|row| self.classify(row).label).collect()
    }

    /// Predict the label of every row, in parallel if the configuration asks for it.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<Option<S::Label>>
    where
        S: Sync,
        S::Label: Send + Sync,
    {
        if self.config().parallel_predict {
            self.predict_parallel(rows)
        } else {
            self.predict_single_threaded(rows)
        }
    }

    /// Fraction of the examples of `source` whose predicted label matches their own.
    pub fn accuracy<T>(&self, source: &T) -> Result<f64, TreeError>
    where
        T: ExampleSource<Label = S::Label>,
    {
        if source.count() == 0 {
            return Err(TreeError::EmptySource);
        }
        let correct = (0..source.count())
            .map(|i| source.get(i))
            .filter(|example| self.classify(&example.features).label.as_ref() == Some(&example.label))
            .count();
        Ok(correct as f64 / source.count() as f64)
    }
}
