//! Tree Configuration
//!
//! Settings of the training loop and of the tree's impurity reporting.
//! A configuration can be read from and written to JSON.
use crate::constants::ROUND_LIMIT;
use crate::errors::TreeError;
use crate::utils::{items_to_strings, validate_usize_parameter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How the forward impurity of an internal node combines its children.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug, Default)]
pub enum ImpurityAverage {
    /// Unweighted mean of the two children.
    #[default]
    Mean,
    /// Mean of the two children weighted by their sample counts.
    Weighted,
}

impl FromStr for ImpurityAverage {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mean" => Ok(ImpurityAverage::Mean),
            "Weighted" => Ok(ImpurityAverage::Weighted),
            _ => Err(TreeError::ParseString(
                s.to_string(),
                "ImpurityAverage".to_string(),
                items_to_strings(vec!["Mean", "Weighted"]),
            )),
        }
    }
}

fn default_max_rounds() -> Option<usize> {
    None
}
fn default_log_rounds() -> usize {
    0
}
fn default_impurity_average() -> ImpurityAverage {
    ImpurityAverage::Mean
}
fn default_parallel_predict() -> bool {
    true
}

/// Configuration of a `Tree`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TreeConfig {
    /// Maximum number of growth rounds `fit` runs, `None` grows until no
    /// leaf can be split (bounded by `ROUND_LIMIT`).
    #[serde(default = "default_max_rounds")]
    pub max_rounds: Option<usize>,
    /// Log progress every `log_rounds` rounds, 0 disables it.
    #[serde(default = "default_log_rounds")]
    pub log_rounds: usize,
    /// How forward impurity averages the children of internal nodes.
    #[serde(default = "default_impurity_average")]
    pub impurity_average: ImpurityAverage,
    /// Classify batches of rows in parallel.
    #[serde(default = "default_parallel_predict")]
    pub parallel_predict: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            max_rounds: default_max_rounds(),
            log_rounds: default_log_rounds(),
            impurity_average: default_impurity_average(),
            parallel_predict: default_parallel_predict(),
        }
    }
}

impl TreeConfig {
    /// Check the configuration values are within range.
    pub fn validate(&self) -> Result<(), TreeError> {
        if let Some(max_rounds) = self.max_rounds {
            validate_usize_parameter(max_rounds, 1, ROUND_LIMIT, "max_rounds")?;
        }
        Ok(())
    }

    /// Number of rounds `fit` will run at most.
    pub fn round_limit(&self) -> usize {
        self.max_rounds.unwrap_or(ROUND_LIMIT).min(ROUND_LIMIT)
    }

    /// Dump the configuration as a json object.
    pub fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load a configuration from a json string, and validate it.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    pub fn from_json(json_str: &str) -> Result<Self, TreeError> {
        let config = serde_json::from_str::<Self>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as a json object to a file.
    ///
    /// * `path` - Path to save the configuration.
    pub fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        fs::write(path, self.json_dump()?).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load a configuration from a path to a json object.
    ///
    /// * `path` - Path to load the configuration from.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, TreeError> {
        let json_str = fs::read_to_string(path).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}
