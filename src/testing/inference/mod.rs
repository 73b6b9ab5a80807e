use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::testing::effect::calculate_log2_fold_change;
use crate::testing::TestResult;

pub mod parametric;

/// Per-gene statistics over a genes × samples matrix.
pub trait MatrixStatTests {
    /// Welch t-test of the stress columns against the control columns, per row.
    fn t_test(
        &self,
        control_indices: &[usize],
        stress_indices: &[usize],
        parallel: bool,
    ) -> anyhow::Result<Vec<TestResult>>;

    /// Unrounded log2 fold change of stress over control, per row.
    fn log2_fold_changes(
        &self,
        control_indices: &[usize],
        stress_indices: &[usize],
        parallel: bool,
    ) -> anyhow::Result<Vec<f64>>;
}

impl MatrixStatTests for Array2<f64> {
    fn t_test(
        &self,
        control_indices: &[usize],
        stress_indices: &[usize],
        parallel: bool,
    ) -> anyhow::Result<Vec<TestResult>> {
        parametric::t_test_matrix_groups(self, control_indices, stress_indices, parallel)
    }

    fn log2_fold_changes(
        &self,
        control_indices: &[usize],
        stress_indices: &[usize],
        parallel: bool,
    ) -> anyhow::Result<Vec<f64>> {
        let fold_change = |row: ndarray::ArrayView1<'_, f64>| {
            let control: Vec<f64> = control_indices.iter().map(|&c| row[c]).collect();
            let stress: Vec<f64> = stress_indices.iter().map(|&c| row[c]).collect();
            calculate_log2_fold_change(&control, &stress)
        };

        if parallel {
            self.axis_iter(Axis(0))
                .into_par_iter()
                .map(fold_change)
                .collect()
        } else {
            self.axis_iter(Axis(0)).map(fold_change).collect()
        }
    }
}
