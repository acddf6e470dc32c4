use crate::constants::EMPTY_IMPURITY;
use crate::errors::TreeError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

// Validation
pub fn validate_usize_parameter(value: usize, min: usize, max: usize, parameter: &str) -> Result<(), TreeError> {
    if value < min || max < value {
        Err(TreeError::InvalidParameter(
            parameter.to_string(),
            format!("integer value within range {} and {}", min, max),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Gini impurity of a set of class counts, `1 - sum(p^2)`.
///
/// * `counts` - Number of samples per class.
/// * `total` - Total number of samples, the sum of `counts`.
///
/// An empty set has an impurity of `EMPTY_IMPURITY`.
#[inline]
pub fn gini<I>(counts: I, total: usize) -> f64
where
    I: IntoIterator<Item = usize>,
{
    if total == 0 {
        return EMPTY_IMPURITY;
    }
    let total = total as f64;
    counts
        .into_iter()
        .filter(|c| *c > 0)
        .fold(1.0, |impurity, c| {
            let p = c as f64 / total;
            impurity - p * p
        })
}

/// Impurity of a binary partition, each side weighted by its share of the samples.
#[inline]
pub fn weighted_gini(gini_left: f64, left_total: usize, gini_right: f64, right_total: usize) -> f64 {
    let total = (left_total + right_total) as f64;
    if total == 0.0 {
        return EMPTY_IMPURITY;
    }
    (left_total as f64 / total) * gini_left + (right_total as f64 / total) * gini_right
}

/// Threshold between two adjacent feature values, `lower < upper`.
///
/// The result always satisfies `lower < t <= upper`, so `>= t` separates the
/// two values. When the midpoint rounds onto `lower` or overflows, `upper` is used.
#[inline]
pub fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid.is_finite() && lower < mid && mid <= upper {
        mid
    } else {
        upper
    }
}
