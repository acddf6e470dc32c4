//! Gini Tree
//!
//! Binary classification trees induced CART-style, with a greedy search for
//! the split minimizing Gini impurity. Training runs in epochs: every example
//! of the source is routed through the current tree, then every leaf that has
//! an improving split is replaced by two fresh leaves.
mod node;

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::{ImpurityAverage, TreeConfig};
pub use data::{Dataset, Example, ExampleSource, Label};
pub use errors::TreeError;
pub use node::{Branch, ImpurityCache, Node};
pub use splitter::SplitInfo;
pub use tree::predict::Classification;
pub use tree::tree::{FitReport, FitStopper, Tree};
