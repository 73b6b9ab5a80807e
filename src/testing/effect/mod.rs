use num_traits::Float;

use crate::testing::utils::mean;

/// Pseudo-count added to both group means before taking logarithms.
///
/// Keeps `log2(0)` out of the computation and damps fold changes of genes
/// that are barely expressed in either condition.
pub const PSEUDO_COUNT: f64 = 1.0;

/// Calculate log2 fold change of the stress group over the control group
///
/// `log2(mean(stress) + 1) - log2(mean(control) + 1)`
///
/// A group mean at or below `-1` has no logarithm; the fold change is then NaN.
pub fn calculate_log2_fold_change<T>(control: &[T], stress: &[T]) -> anyhow::Result<f64>
where
    T: Float,
{
    if control.is_empty() || stress.is_empty() {
        return Err(anyhow::anyhow!("Group values cannot be empty"));
    }

    let mean_control = mean(control)
        .to_f64()
        .ok_or_else(|| anyhow::anyhow!("Control mean is not representable as f64"))?;
    let mean_stress = mean(stress)
        .to_f64()
        .ok_or_else(|| anyhow::anyhow!("Stress mean is not representable as f64"))?;

    let fc = (mean_stress + PSEUDO_COUNT).log2() - (mean_control + PSEUDO_COUNT).log2();
    Ok(if fc.is_finite() { fc } else { f64::NAN })
}
