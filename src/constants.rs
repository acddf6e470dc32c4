/// Upper bound on growth rounds a single `fit` call will run.
pub const ROUND_LIMIT: usize = 1000;
/// Impurity of a node that has seen no examples.
pub const EMPTY_IMPURITY: f64 = 0.0;
