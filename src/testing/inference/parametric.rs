//! Welch's unequal-variance t-test.
//!
//! This is the engine's only hypothesis test. It compares the stress and
//! control replicates of one gene without assuming equal variances, and
//! reports an undefined p-value instead of failing when the statistic itself
//! is undefined.

use ndarray::{Array2, Axis};
use num_traits::Float;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::testing::TestResult;
use crate::testing::utils::{mean, sample_variance};

/// Perform Welch t-tests on all genes comparing stress against control.
///
/// # Arguments
///
/// * `matrix` - Dense expression matrix (genes × samples)
/// * `control_indices` - Column indices of the control replicates
/// * `stress_indices` - Column indices of the stress replicates
/// * `parallel` - Evaluate genes on the rayon thread pool
///
/// # Returns
///
/// Vector of `TestResult` objects, one per gene in row order.
pub fn t_test_matrix_groups(
    matrix: &Array2<f64>,
    control_indices: &[usize],
    stress_indices: &[usize],
    parallel: bool,
) -> anyhow::Result<Vec<TestResult>> {
    if control_indices.is_empty() || stress_indices.is_empty() {
        return Err(anyhow::anyhow!("Group indices cannot be empty"));
    }
    if let Some(&col) = control_indices
        .iter()
        .chain(stress_indices)
        .find(|&&col| col >= matrix.ncols())
    {
        return Err(anyhow::anyhow!(
            "Column index {} out of bounds for {} samples",
            col,
            matrix.ncols()
        ));
    }

    let test_row = |row: ndarray::ArrayView1<'_, f64>| {
        let control: Vec<f64> = control_indices.iter().map(|&c| row[c]).collect();
        let stress: Vec<f64> = stress_indices.iter().map(|&c| row[c]).collect();
        welch_t_test(&stress, &control)
    };

    let results: Vec<TestResult> = if parallel {
        matrix
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(test_row)
            .collect()
    } else {
        matrix.axis_iter(Axis(0)).map(test_row).collect()
    };

    Ok(results)
}

/// Perform Welch's t-test of `x` against `y`.
///
/// The statistic is `(mean(x) - mean(y)) / sqrt(var(x)/nx + var(y)/ny)`.
/// Groups with fewer than two values have no sample variance, so the result
/// is undefined.
pub fn welch_t_test<T>(x: &[T], y: &[T]) -> TestResult
where
    T: Float,
{
    if x.len() < 2 || y.len() < 2 {
        return TestResult::undefined();
    }

    let to_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);
    t_test_from_moments(
        to_f64(mean(x)),
        to_f64(sample_variance(x)),
        x.len() as f64,
        to_f64(mean(y)),
        to_f64(sample_variance(y)),
        y.len() as f64,
    )
}

/// Perform Welch's t-test from per-group mean, sample variance and size.
///
/// Degenerate cases:
/// * both variances zero and equal means: `0/0`, p-value undefined
/// * both variances zero and different means: infinite statistic, p-value 0
pub fn t_test_from_moments(
    mean1: f64,
    var1: f64,
    n1: f64,
    mean2: f64,
    var2: f64,
    n2: f64,
) -> TestResult {
    if n1 < 2.0 || n2 < 2.0 || !var1.is_finite() || !var2.is_finite() {
        return TestResult::undefined();
    }

    let term1 = var1 / n1;
    let term2 = var2 / n2;
    let combined_var = term1 + term2;
    let std_err = combined_var.sqrt();
    let t_stat = (mean1 - mean2) / std_err;

    // Welch-Satterthwaite equation for degrees of freedom. It is 0/0 when both
    // variances vanish; any positive value works then because the statistic
    // is either infinite or undefined.
    let df = combined_var * combined_var / (term1 * term1 / (n1 - 1.0) + term2 * term2 / (n2 - 1.0));
    let df = if df.is_nan() { 1.0 } else { df };

    TestResult::new(t_stat, t_test_p_value(t_stat, df))
        .with_degrees_of_freedom(df)
        .with_standard_error(std_err)
}

/// Two-sided p-value of a t statistic.
fn t_test_p_value(t_stat: f64, df: f64) -> Option<f64> {
    if t_stat.is_nan() {
        return None;
    }
    if t_stat.is_infinite() {
        return Some(0.0);
    }

    let t_dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * t_dist.sf(t_stat.abs())).min(1.0))
}
