use std::collections::HashSet;

use num_traits::Float;

use crate::data::ExpressionTable;
use crate::error::{ExpressionError, Result};

/// Resolve control and stress column names to sample indices.
///
/// Both lists must be non-empty, name existing columns, and be disjoint.
pub fn resolve_groups(
    table: &ExpressionTable,
    control_columns: &[String],
    stress_columns: &[String],
) -> Result<(Vec<usize>, Vec<usize>)> {
    if control_columns.is_empty() {
        return Err(ExpressionError::EmptyGroup { group: "control" });
    }
    if stress_columns.is_empty() {
        return Err(ExpressionError::EmptyGroup { group: "stress" });
    }

    let control_indices = table.column_indices(control_columns)?;
    let stress_indices = table.column_indices(stress_columns)?;

    let control_set: HashSet<usize> = control_indices.iter().copied().collect();
    if let Some(pos) = stress_indices.iter().position(|idx| control_set.contains(idx)) {
        return Err(ExpressionError::OverlappingGroups {
            column: stress_columns[pos].clone(),
        });
    }

    Ok((control_indices, stress_indices))
}

/// Round to `decimals` places, ties to even on the scaled value.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Arithmetic mean, NaN for an empty slice.
pub fn mean<T: Float>(values: &[T]) -> T {
    let n = T::from(values.len()).unwrap_or_else(T::zero);
    values.iter().fold(T::zero(), |acc, &v| acc + v) / n
}

/// Sample variance (n - 1 denominator) computed around the mean.
///
/// Returns NaN when fewer than two values are given.
pub fn sample_variance<T: Float>(values: &[T]) -> T {
    if values.len() < 2 {
        return T::nan();
    }
    let m = mean(values);
    let ss = values.iter().fold(T::zero(), |acc, &v| acc + (v - m) * (v - m));
    ss / T::from(values.len() - 1).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(1.58496, 3), 1.585);
        assert_eq!(round_half_even(-1.58496, 3), -1.585);
        assert_eq!(round_half_even(0.00004, 4), 0.0);
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(3.5, 0), 4.0);
    }

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(&values), 5.0);
        assert_abs_diff_eq!(sample_variance(&values), 32.0 / 7.0, epsilon = 1e-12);
        assert!(sample_variance(&[1.0f32]).is_nan());
        assert!(mean::<f64>(&[]).is_nan());
    }

    #[test]
    fn test_constant_values_have_zero_variance() {
        assert_eq!(sample_variance(&[0.5, 0.5, 0.5]), 0.0);
        assert_eq!(sample_variance(&[10.0f32, 10.0]), 0.0);
    }
}
