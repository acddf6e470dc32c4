//! Data
//!
//! The example source contract the tree trains against, and `Dataset`, an
//! in-memory source that can also be loaded from a headerless CSV file.
use crate::errors::TreeError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::Read;
use std::path::Path;

/// Class label trait used throughout the package.
///
/// Labels are opaque tokens, they only need to be compared and hashed.
/// The ordering keeps class statistics in a fixed iteration order.
pub trait Label: Clone + Eq + Hash + Ord + Debug {}

impl<T> Label for T where T: Clone + Eq + Hash + Ord + Debug {}

/// A single labeled training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example<L> {
    /// Identifier of the example, stable across epochs and unique within a source.
    pub id: usize,
    /// Feature vector, the same length for every example of a source.
    pub features: Vec<f64>,
    /// Class label.
    pub label: L,
}

impl<L> Example<L> {
    pub fn new(id: usize, features: Vec<f64>, label: L) -> Self {
        Example { id, features, label }
    }
}

/// Ordered, indexable collection of examples.
pub trait ExampleSource {
    type Label: Label;

    /// Number of available examples.
    fn count(&self) -> usize;

    /// Get the example at a position.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    fn get(&self, index: usize) -> &Example<Self::Label>;

    /// Look an example up by its identifier.
    fn get_by_id(&self, id: usize) -> Option<&Example<Self::Label>>;

    /// Number of features of every example, taken from the first one.
    fn n_features(&self) -> usize {
        if self.count() == 0 {
            0
        } else {
            self.get(0).features.len()
        }
    }

    /// Check that every example carries `n_features` features.
    fn validate(&self) -> Result<(), TreeError> {
        let expected = self.n_features();
        for i in 0..self.count() {
            let example = self.get(i);
            if example.features.len() != expected {
                return Err(TreeError::FeatureLengthMismatch {
                    id: example.id,
                    expected,
                    found: example.features.len(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory example source.
///
/// Examples keep their insertion order, identifiers are looked up
/// through an index built as examples are added.
#[derive(Debug, Clone)]
pub struct Dataset<L> {
    examples: Vec<Example<L>>,
    by_id: HashMap<usize, usize>,
    next_id: usize,
}

impl<L: Label> Default for Dataset<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> Dataset<L> {
    pub fn new() -> Self {
        Dataset {
            examples: Vec::new(),
            by_id: HashMap::new(),
            next_id: 0,
        }
    }

    /// Build a dataset from rows of features and their labels,
    /// identifiers are assigned in row order starting at 0.
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: Vec<L>) -> Result<Self, TreeError> {
        if rows.len() != labels.len() {
            return Err(TreeError::InvalidParameter(
                "labels".to_string(),
                format!("{} labels", rows.len()),
                labels.len().to_string(),
            ));
        }
        let mut dataset = Dataset::new();
        for (features, label) in rows.into_iter().zip(labels) {
            dataset.push(features, label);
        }
        Ok(dataset)
    }

    /// Build a dataset from examples that already carry identifiers.
    pub fn from_examples(examples: Vec<Example<L>>) -> Result<Self, TreeError> {
        let mut dataset = Dataset::new();
        for example in examples {
            dataset.push_example(example)?;
        }
        Ok(dataset)
    }

    /// Append an example, allocating the next free identifier for it.
    /// Returns the identifier.
    pub fn push(&mut self, features: Vec<f64>, label: L) -> usize {
        let id = self.next_id;
        self.insert(Example::new(id, features, label));
        id
    }

    /// Append an example that carries its own identifier.
    pub fn push_example(&mut self, example: Example<L>) -> Result<(), TreeError> {
        if self.by_id.contains_key(&example.id) {
            return Err(TreeError::DuplicateExample(example.id));
        }
        self.insert(example);
        Ok(())
    }

    fn insert(&mut self, example: Example<L>) {
        self.next_id = self.next_id.max(example.id + 1);
        self.by_id.insert(example.id, self.examples.len());
        self.examples.push(example);
    }

    pub fn examples(&self) -> &[Example<L>] {
        &self.examples
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

impl Dataset<String> {
    /// Load a headerless CSV where each line holds `n_features` numeric
    /// columns followed by a label column. Extra columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R, n_features: usize) -> Result<Self, TreeError> {
        if n_features == 0 {
            return Err(TreeError::InvalidParameter(
                "n_features".to_string(),
                "at least one feature".to_string(),
                n_features.to_string(),
            ));
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut dataset = Dataset::new();
        for record in rdr.records() {
            let record = record.map_err(|e| TreeError::UnableToRead(e.to_string()))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.len() <= n_features {
                return Err(TreeError::UnableToRead(format!(
                    "line {}: expected {} features and a label, found {} columns",
                    line,
                    n_features,
                    record.len()
                )));
            }
            let features = record
                .iter()
                .take(n_features)
                .map(|cell| {
                    cell.parse::<f64>()
                        .map_err(|e| TreeError::UnableToRead(format!("line {}: {} ({})", line, e, cell)))
                })
                .collect::<Result<Vec<f64>, TreeError>>()?;
            dataset.push(features, record[n_features].to_string());
        }
        Ok(dataset)
    }

    /// Load a headerless CSV file, see `from_csv_reader`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, n_features: usize) -> Result<Self, TreeError> {
        let file = File::open(path.as_ref())
            .map_err(|e| TreeError::UnableToRead(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_csv_reader(file, n_features)
    }
}

impl<L: Label> ExampleSource for Dataset<L> {
    type Label = L;

    fn count(&self) -> usize {
        self.examples.len()
    }

    fn get(&self, index: usize) -> &Example<L> {
        &self.examples[index]
    }

    fn get_by_id(&self, id: usize) -> Option<&Example<L>> {
        self.by_id.get(&id).map(|i| &self.examples[*i])
    }
}
