//! Errors
//!
//! Custom error types used throughout the `gini_tree` crate.
use thiserror::Error;

/// Errors that can occur while growing or querying a tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A split was requested on a node that already has children.
    #[error("Node {0} already has children, only leaves can be split.")]
    NodeAlreadySplit(usize),
    /// The tree holds no node with this id.
    #[error("Node {0} does not exist in this tree.")]
    UnknownNode(usize),
    /// The example source holds no example with this id.
    #[error("Example {0} could not be found in the example source.")]
    UnknownExample(usize),
    /// An example does not have the feature count of its source.
    #[error("Example {id} has {found} features, but the source has {expected}.")]
    FeatureLengthMismatch { id: usize, expected: usize, found: usize },
    /// Two examples share the same identifier.
    #[error("Example id {0} is used more than once.")]
    DuplicateExample(usize),
    /// Training needs at least one example.
    #[error("The example source is empty.")]
    EmptySource,
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write to file or string.
    #[error("Unable to write: {0}")]
    UnableToWrite(String),
    /// Unable to read from file or string.
    #[error("Unable to read: {0}")]
    UnableToRead(String),
}
